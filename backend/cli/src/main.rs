mod app;
mod doctor_cmd;
mod locate_cmd;
mod ocr_cmd;
mod status_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use studybot_channels::{ChannelAdapter, DiscordAdapter};
use studybot_commands::{build_default_dispatcher, CommandGate};
use studybot_config::BotConfig;
use studybot_core::ConnectionStatus;
use studybot_gateway::{start_server, GatewayState};
use studybot_logging::{init_logger, redact_sensitive_data};

#[derive(Parser)]
#[command(name = "studybot")]
#[command(about = "Discord homework helper: book pages, solutions and OCR for German school subjects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and start the health server
    Serve {
        /// Port for the health server
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Query a running bot's health endpoint
    Status {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the OCR fallback chain on a local image
    Ocr {
        file: PathBuf,
        /// Passes over the chain before giving up
        #[arg(short, long, default_value_t = 2)]
        attempts: u32,
    },
    /// Look up a book page in the document store
    Locate {
        subject: String,
        page: String,
        /// List every material sheet for the page instead
        #[arg(long)]
        all: bool,
    },
    /// Check configuration and storage
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = BotConfig::from_env()?;
    init_logger(&config.logging.level, config.logging.dir.as_deref());
    install_panic_hook();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::Status { port } => {
            status_cmd::run(port.unwrap_or(config.server.port)).await?;
        }
        Commands::Ocr { file, attempts } => ocr_cmd::run(&config, &file, attempts).await?,
        Commands::Locate { subject, page, all } => locate_cmd::run(&config, &subject, &page, all).await?,
        Commands::Doctor => doctor_cmd::run(&config).await?,
    }

    Ok(())
}

/// Log panics through tracing before the default hook prints them.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(panic = %info, "Unhandled panic");
        default_hook(info);
    }));
}

async fn run_server(config: BotConfig) -> Result<()> {
    let token = config.require_discord_token()?.to_string();
    let addr = config.socket_addr()?;

    info!(config = %config.redacted(), "Starting studybot");
    for finding in config.warnings() {
        warn!(var = finding.var, "{}", finding.message);
    }

    let gate = Arc::new(CommandGate::new(app::gate_policy(&config.gate)));
    let sweeper = gate.spawn_sweeper();

    let services = Arc::new(app::build_services(&config, reqwest::Client::new()));
    info!(chain = ?services.ocr.chain().describe(), "OCR chain ready");

    let dispatcher = Arc::new(build_default_dispatcher(
        services,
        Arc::clone(&gate),
        config.discord.allowed_channel_id.clone(),
    ));
    let status = Arc::new(ConnectionStatus::new());

    let state = GatewayState::new(Arc::clone(&status), Arc::clone(&gate));
    tokio::spawn(async move {
        if let Err(e) = start_server(addr, state).await {
            error!(error = %e, "Health server failed");
        }
    });

    let adapter = DiscordAdapter::new(token, dispatcher, status);
    let result = tokio::select! {
        result = adapter.start() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    };
    sweeper.abort();

    if let Err(e) = result {
        let message = redact_sensitive_data(&e.to_string());
        error!(adapter = adapter.name(), error = %message, "Channel adapter stopped");
        anyhow::bail!(message);
    }
    Ok(())
}
