//! Text returned when no OCR stage produced usable output.

/// Leading tag that marks placeholder output. Real OCR text never starts with it.
pub const PLACEHOLDER_TAG: &str = "[OCR-PLATZHALTER]";

const PLACEHOLDER_BODY: &str = "\
Die Texterkennung konnte dieses Bild nicht lesen.

Was du tun kannst:
1. Ein schärferes Bild mit gutem Licht hochladen
2. Das Blatt gerade und vollständig fotografieren
3. Die Hausaufgaben manuell mit .ai eingeben

Hinweis für den Betreiber: OCR_API_KEY in der Umgebung setzen.";

/// The fixed placeholder block, starting with [`PLACEHOLDER_TAG`].
pub fn placeholder_text() -> String {
    format!("{PLACEHOLDER_TAG}\n{PLACEHOLDER_BODY}")
}

/// Whether `text` is placeholder output rather than recognized text.
pub fn is_placeholder(text: &str) -> bool {
    text.trim_start().starts_with(PLACEHOLDER_TAG)
}
