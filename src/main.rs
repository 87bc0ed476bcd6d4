use anyhow::Result;
use clap::Parser;
use github_upload_relay::models::Config;
use github_upload_relay::server;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "github-upload-relay")]
#[command(about = "Relay file uploads into GitHub repositories")]
struct CliArgs {
    /// Port to listen on; overrides PORT.
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "github_upload_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting github-upload-relay");

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    if let Err(e) = server::serve(config).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
