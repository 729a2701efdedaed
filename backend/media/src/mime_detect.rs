//! MIME type detection for stored documents and chat attachments.
//!
//! Used to label outbound files and to strip extensions before name matching.

/// Extensions a stored document may carry. Anything else is not a lookup candidate.
const DOCUMENT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "pdf"];

/// Extensions accepted for homework photos posted in chat.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

fn extension(name: &str) -> Option<(&str, String)> {
    let (stem, ext) = name.rsplit_once('.')?;
    Some((stem, ext.to_lowercase()))
}

/// Detect MIME type by file extension.
pub fn detect_mime_type(name: &str) -> &'static str {
    let ext = extension(name).map(|(_, e)| e).unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "webp"         => "image/webp",
        "gif"          => "image/gif",
        "pdf"          => "application/pdf",
        "txt"          => "text/plain",
        _              => "application/octet-stream",
    }
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Whether a filename has one of the accepted photo extensions.
pub fn is_image_name(name: &str) -> bool {
    extension(name).is_some_and(|(_, e)| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Return the name without its extension when the extension is a known
/// document type (`.jpg .jpeg .png .webp .pdf`, any case), else `None`.
pub fn strip_known_extension(name: &str) -> Option<&str> {
    let (stem, ext) = extension(name)?;
    DOCUMENT_EXTENSIONS.contains(&ext.as_str()).then_some(stem)
}
