//! Byte-level image validation, run before any network OCR call.

use studybot_core::ValidationError;

/// Upper bound (exclusive) on accepted image size.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Lower bound (inclusive) on accepted image size.
pub const MIN_IMAGE_BYTES: usize = 1024;

/// Image container detected from the magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Webp,
}

impl ImageKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Webp => "image/webp",
        }
    }

    /// Sniff the container from the leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageKind::Webp)
        } else {
            None
        }
    }
}

/// Check size bounds and signature. Pure, no I/O.
pub fn validate_image(bytes: &[u8]) -> Result<ImageKind, ValidationError> {
    let size = bytes.len();
    if size >= MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge { size });
    }
    if size < MIN_IMAGE_BYTES {
        return Err(ValidationError::TooSmall { size });
    }
    ImageKind::sniff(bytes).ok_or(ValidationError::UnsupportedFormat)
}
