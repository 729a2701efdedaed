//! Image handling for the OCR pipeline: byte-level validation, MIME helpers,
//! pre-processing and attachment download.

pub mod fetch;
pub mod preprocess;
pub mod mime_detect;
pub mod validate;

pub use fetch::fetch_image;
pub use preprocess::{optimize_for_ocr, optimize_for_ocr_blocking, MAX_OCR_DIMENSION};
pub use mime_detect::{detect_mime_type, is_image, is_image_name, strip_known_extension};
pub use validate::{validate_image, ImageKind, MAX_IMAGE_BYTES, MIN_IMAGE_BYTES};
