//! OCR pre-processing: bound the size, drop colour, stretch contrast and
//! sharpen before an image is sent to a text recognizer.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageResult};
use tracing::{debug, warn};

/// Longest edge sent to OCR. Larger images are shrunk, smaller ones are left alone.
pub const MAX_OCR_DIMENSION: u32 = 2000;
const JPEG_QUALITY: u8 = 90;
const UNSHARP_SIGMA: f32 = 1.0;
const UNSHARP_THRESHOLD: i32 = 2;

/// Synchronous pipeline. Output is always a greyscale JPEG.
pub fn optimize_for_ocr_blocking(bytes: &[u8]) -> ImageResult<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let img = if img.width() > MAX_OCR_DIMENSION || img.height() > MAX_OCR_DIMENSION {
        img.resize(MAX_OCR_DIMENSION, MAX_OCR_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    let mut gray = img.to_luma8();
    stretch_contrast(&mut gray);
    let sharpened = imageops::unsharpen(&gray, UNSHARP_SIGMA, UNSHARP_THRESHOLD);

    let mut out = Vec::new();
    DynamicImage::ImageLuma8(sharpened)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
    Ok(out)
}

/// Run the pipeline on the blocking pool. Falls back to the original bytes
/// when the image cannot be decoded or encoded.
pub async fn optimize_for_ocr(bytes: Bytes) -> Bytes {
    let original = bytes.clone();
    match tokio::task::spawn_blocking(move || optimize_for_ocr_blocking(&bytes)).await {
        Ok(Ok(out)) => {
            debug!(before = original.len(), after = out.len(), "Image optimized for OCR");
            Bytes::from(out)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Image optimization failed, using original");
            original
        }
        Err(e) => {
            warn!(error = %e, "Image optimization task failed, using original");
            original
        }
    }
}

/// Linear stretch of the luma histogram to the full 0..=255 range.
fn stretch_contrast(img: &mut GrayImage) {
    let (min, max) = img
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
    if max <= min {
        return;
    }
    let range = u32::from(max - min);
    for p in img.pixels_mut() {
        let v = u32::from(p.0[0] - min);
        p.0[0] = ((v * 255) / range) as u8;
    }
}
