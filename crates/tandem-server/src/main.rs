//! Tandem server binary.
//!
//! # Usage
//!
//! ```bash
//! tandem-server --bind 0.0.0.0:8080
//! RUST_LOG=tandem_core=debug tandem-server
//! ```

use clap::Parser;
use tandem_server::{Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Tandem anonymous chat server
#[derive(Parser, Debug)]
#[command(name = "tandem-server")]
#[command(about = "Anonymous two-party chat matchmaking server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("tandem server starting");

    let config = ServerConfig { bind_address: args.bind };
    let server = Server::bind(&config).await?;

    server.run().await?;

    Ok(())
}
