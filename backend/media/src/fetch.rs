//! Download a chat attachment and validate it as an OCR input.

use std::time::Duration;

use bytes::Bytes;
use studybot_core::{BotError, ValidationError};
use tracing::{info, warn};

use crate::validate::{validate_image, ImageKind, MAX_IMAGE_BYTES};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "studybot/0.1";

fn download_error(e: reqwest::Error) -> BotError {
    BotError::provider("attachment download", e.without_url().to_string())
}

/// Reject a body before reading it when the server already says it is too big.
fn check_declared_length(content_length: Option<u64>) -> Result<(), ValidationError> {
    match content_length {
        Some(len) if len >= MAX_IMAGE_BYTES as u64 => {
            Err(ValidationError::TooLarge { size: usize::try_from(len).unwrap_or(usize::MAX) })
        }
        _ => Ok(()),
    }
}

/// Append a chunk, failing as soon as the running size reaches the cap.
fn push_capped(buf: &mut Vec<u8>, chunk: &[u8]) -> Result<(), ValidationError> {
    let size = buf.len() + chunk.len();
    if size >= MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge { size });
    }
    buf.extend_from_slice(chunk);
    Ok(())
}

/// Fetch `url` and check the bytes with [`validate_image`]. Oversized bodies
/// are cut off while streaming, never buffered whole.
pub async fn fetch_image(client: &reqwest::Client, url: &str) -> Result<(Bytes, ImageKind), BotError> {
    let mut resp = client
        .get(url)
        .timeout(DOWNLOAD_TIMEOUT)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .map_err(download_error)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(BotError::provider("attachment download", format!("HTTP {status}")));
    }

    if let Err(e) = check_declared_length(resp.content_length()) {
        warn!(error = %e, "Attachment rejected by Content-Length");
        return Err(e.into());
    }

    let mut buf = Vec::new();
    while let Some(chunk) = resp.chunk().await.map_err(download_error)? {
        push_capped(&mut buf, &chunk)?;
    }
    info!(size_kb = buf.len() / 1024, "Downloaded image");

    let bytes = Bytes::from(buf);
    let kind = validate_image(&bytes)?;
    Ok((bytes, kind))
}
