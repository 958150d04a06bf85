use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use scanner_bot::api::AnalysisClient;
use scanner_bot::config::{BotConfig, FileConfig};
use scanner_bot::handler::RequestHandler;
use scanner_bot::telegram::TelegramClient;
use scanner_core::StepCatalog;

/// Backoff after a failed getUpdates call.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Parser)]
#[command(name = "scanner-bot", about = "Telegram bot for progressive token analysis")]
struct Cli {
    /// Optional TOML config file overriding environment variables.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let file = cli.config.as_deref().map(FileConfig::load).transpose()?;
    let config = BotConfig::resolve(file)?;

    info!(api_url = %config.api_url, "Scanner bot starting");

    let transport = Arc::new(TelegramClient::new(&config.bot_token));
    let analysis = Arc::new(AnalysisClient::new(&config.api_url, config.fetch_timeout));
    let catalog = Arc::new(StepCatalog::default());
    let handler = Arc::new(RequestHandler::new(
        transport.clone(),
        analysis,
        catalog,
        config.pacing,
    ));

    let mut offset = 0i64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            polled = transport.get_updates(offset, config.poll_timeout) => {
                let updates = match polled {
                    Ok(updates) => updates,
                    Err(err) => {
                        warn!(%err, "Polling failed, backing off");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let Some(message) = update.message else { continue };
                    let Some(text) = message.text else { continue };

                    // Each request runs on its own task; requests share
                    // nothing but the clients.
                    let handler = Arc::clone(&handler);
                    let chat_id = message.chat.id;
                    tokio::spawn(async move {
                        handler.handle_text(chat_id, &text).await;
                    });
                }
            }
        }
    }

    Ok(())
}
