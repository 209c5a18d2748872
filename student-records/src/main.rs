// Student records - record keeping and PDF reports
// Entry point: logging setup, startup and the request loop

use anyhow::Context;
use std::path::PathBuf;
use student_records::app::AppState;
use student_records::commands::{handle_request, Request, Response};
use student_records::config::DATA_DIR_ENV;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// First CLI argument, then the environment, then `./data`
fn resolve_data_dir() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout is reserved for responses
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "student_records=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting student records v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = resolve_data_dir();
    let state = AppState::initialize(data_dir.clone())
        .await
        .with_context(|| format!("failed to initialize data directory {}", data_dir.display()))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<Request>(&line) {
            Ok(req) => handle_request(&state, req).await,
            Err(e) => {
                tracing::warn!("Malformed request: {}", e);
                Response::err("", "bad_json", e.to_string())
            }
        };

        let mut out = serde_json::to_string(&resp)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}
