//! docclassd — docclass upload server.
//!
//! Loads the classifier once and serves it over HTTP, so many uploads share
//! one model instance.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use docclass::server;
use docclass::{Config, DocclassError, DocumentClassifier};

/// docclass upload server
#[derive(Parser)]
#[command(name = "docclassd")]
#[command(version = docclass::PKG_VERSION)]
#[command(about = "HTTP server classifying uploaded PDF documents")]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overriding the configured one
    #[arg(short, long, env = "DOCCLASS_ADDRESS")]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let secrets = config.load_secrets()?;

    let classifier = DocumentClassifier::from_config(&config, &secrets)?;

    let address = args.address.as_deref().unwrap_or(&config.server.address);
    let addr: SocketAddr = address
        .parse()
        .map_err(|e| DocclassError::Configuration(format!("Invalid address {address}: {e}")))?;

    info!(
        version = docclass::version_string(),
        %addr,
        provider = classifier.provider_name(),
        "docclassd starting"
    );

    let max_upload_bytes = config.server.max_upload_bytes();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::serve(listener, server::router(classifier, max_upload_bytes)).await?;

    Ok(())
}
