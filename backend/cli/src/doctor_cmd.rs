//! CLI Doctor Command
//!
//! Checks configuration and the document store before going live.

use anyhow::Result;

use studybot_config::{validate, BotConfig};

use crate::app;

pub async fn run(config: &BotConfig) -> Result<()> {
    println!("\n🔍 Running studybot doctor...\n");

    let report = validate(config);
    println!("Configuration:");
    for finding in &report.errors {
        println!("  🔴 {finding}");
    }
    for finding in &report.warnings {
        println!("  🟡 {finding}");
    }
    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("  🟢 All variables look good");
    }

    println!("\nOCR chain:");
    let resolver = app::ocr_resolver(config, &reqwest::Client::new());
    for (i, stage) in resolver.chain().describe().iter().enumerate() {
        println!("  {}. {stage}", i + 1);
    }

    println!("\nDocument store:");
    let http = reqwest::Client::new();
    let store_ok = match app::StorageBackend::from_config(config) {
        None => {
            println!("  🟡 Neither MEGA_EMAIL/MEGA_PASSWORD nor STORAGE_DIR set, book commands are disabled");
            true
        }
        Some(backend) => {
            println!("  Backend: {}", backend.describe());
            match backend.locator(&http).list_files().await {
                Ok(files) => {
                    println!("  🟢 {} files available", files.len());
                    true
                }
                Err(e) => {
                    println!("  🔴 {e}");
                    false
                }
            }
        }
    };

    println!();
    if report.is_valid() && store_ok {
        println!("✅ All checks passed! studybot is ready.");
    } else {
        println!("❌ Some checks failed! Please fix the errors above.");
    }

    Ok(())
}
