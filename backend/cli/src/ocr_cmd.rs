//! `studybot ocr <file>`: run the production OCR chain on a local image.

use std::path::Path;

use anyhow::{Context, Result};

use studybot_config::BotConfig;
use studybot_media::{optimize_for_ocr, validate_image};

use crate::app;
use crate::terminal_output::{note_info, note_success, note_warn};

pub async fn run(config: &BotConfig, file: &Path, attempts: u32) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let kind = validate_image(&bytes)?;
    note_info(&format!("{} ({}, {} KB)", file.display(), kind.mime_type(), bytes.len() / 1024));

    let resolver = app::ocr_resolver(config, &reqwest::Client::new());
    let image = optimize_for_ocr(bytes.into()).await;
    let result = resolver.resolve_with_retry(&image, attempts).await;

    if result.is_placeholder() {
        note_warn("Every OCR stage failed");
    } else {
        note_success(&format!("Recognized via {}", result.source));
    }
    println!("\n{}", result.text);
    Ok(())
}
