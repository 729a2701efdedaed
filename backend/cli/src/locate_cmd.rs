//! `studybot locate <subject> <page>`: preview what a book command would send.

use anyhow::{bail, Result};

use studybot_config::BotConfig;
use studybot_core::{BotError, StoredDocument};

use crate::app;
use crate::terminal_output::{note_error, render_table, Column};

pub async fn run(config: &BotConfig, subject: &str, page: &str, all: bool) -> Result<()> {
    let Some(locator) = app::locator(config, &reqwest::Client::new()) else {
        bail!("no document store configured, set MEGA_EMAIL/MEGA_PASSWORD or STORAGE_DIR");
    };

    let found = if all {
        locator.locate_all(subject, page).await
    } else {
        locator.locate(subject, page).await.map(|doc| vec![doc])
    };

    match found {
        Ok(docs) => print!("{}", document_table(&docs)),
        Err(e @ BotError::NotFound { .. }) => note_error(&e.user_message()),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn document_table(docs: &[StoredDocument]) -> String {
    let rows: Vec<Vec<String>> = docs
        .iter()
        .map(|d| vec![d.name.clone(), (d.size_bytes / 1024).to_string()])
        .collect();
    render_table(&[Column::left("Datei"), Column::right("KB")], &rows)
}
