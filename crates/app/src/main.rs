//! ClubHub client - Main Entry Point
//!
//! Loads configuration, restores any persisted session, and runs a
//! line-oriented shell on stdin until `quit` or end of input.

mod shell;

use std::io::Write;
use std::sync::Arc;

use clubhub_application::SessionController;
use clubhub_infrastructure::{
    ClientConfig, FileTokenStore, ReqwestAuthApi, SystemClock, TokioFileSystem,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::shell::{Command, Reply, Shell};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with shell output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        token_path = %config.token_path.display(),
        "starting ClubHub client v{}",
        env!("CARGO_PKG_VERSION")
    );

    let api = ReqwestAuthApi::new(config.api_url.clone(), config.timeout)?;
    let store = FileTokenStore::new(TokioFileSystem::new(), SystemClock::new(), config.token_path);
    let session = SessionController::new(api, store, Arc::new(SystemClock::new()));

    let mut shell = Shell::new(session);
    println!("{}", shell.start().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", shell.prompt());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match Command::parse(&line) {
            Ok(command) => shell.execute(command).await,
            Err(usage) => Reply::Text(usage),
        };
        match reply {
            Reply::Text(text) => println!("{text}"),
            Reply::Quit => break,
        }
    }

    Ok(())
}
