//! Audio Probe CLI Entry Point
//!
//! Manual integration-test probe for the backend's audio streaming endpoint.
//! Connects, starts the stream, counts chunks for the listen window, stops
//! the stream, and prints a summary.

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use ws_audio_probe::{AudioProbe, ProbeConfig};

#[derive(Parser)]
#[command(name = "ws-audio-probe")]
#[command(version, about = "Probe the backend audio streaming WebSocket endpoint")]
struct Cli {
    /// WebSocket endpoint to probe
    #[arg(long, default_value = "ws://localhost:4000/ws")]
    url: String,

    /// How long to listen for audio chunks, in seconds
    #[arg(long, default_value_t = 5)]
    listen_secs: u64,

    /// Upper bound on a single receive attempt, in milliseconds
    #[arg(long, default_value_t = 100)]
    recv_timeout_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ProbeConfig {
        url: cli.url,
        listen_window: Duration::from_secs(cli.listen_secs),
        recv_timeout: Duration::from_millis(cli.recv_timeout_ms),
        ..ProbeConfig::default()
    };

    let probe = AudioProbe::new(config);
    match probe.run().await {
        Ok(report) => {
            println!("\n{}", report);
        }
        Err(e) => {
            // Console output is the only artifact; a failed probe still
            // exits cleanly
            error!(error = %e, "Connection error");
        }
    }

    Ok(())
}
