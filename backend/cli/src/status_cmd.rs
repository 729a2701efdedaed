//! CLI Status Command
//!
//! Reads a running bot's health endpoint.

use anyhow::Result;

use studybot_gateway::HealthReport;

use crate::terminal_output::{note_error, note_success, note_warn, render_table, Column};

pub async fn run(port: u16) -> Result<()> {
    let url = format!("http://localhost:{port}/");
    let response = match reqwest::Client::new().get(&url).send().await {
        Ok(resp) => resp,
        Err(_) => {
            note_error(&format!("studybot is not running on port {port}"));
            return Ok(());
        }
    };
    let report: HealthReport = response.error_for_status()?.json().await?;

    if report.bot_status == "Connected" {
        note_success(&report.status);
    } else {
        note_warn(&format!("{} ({})", report.status, report.bot_status));
    }

    let rows = vec![
        vec!["Discord".to_string(), report.bot_status.clone()],
        vec!["Uptime".to_string(), format_uptime(report.uptime_seconds)],
        vec!["Processed messages".to_string(), report.processed_messages.to_string()],
        vec!["Active commands".to_string(), report.active_commands.to_string()],
        vec!["Checked at".to_string(), report.timestamp.to_rfc3339()],
    ];
    print!("{}", render_table(&[Column::left("Field"), Column::left("Value")], &rows));
    Ok(())
}

fn format_uptime(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}
