use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

use memebot::cloudinary::{expired_public_ids, format_stock_choices, CloudinaryClient, ImageHost};
use memebot::config::Config;
use memebot::constants::{DEFAULT_MAX_UPLOAD_AGE_DAYS, PRUNE_PAGE_SIZE};

/// Memebot - caption images over a chat webhook
#[derive(Parser, Debug)]
#[command(name = "memebot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook server (default)
    Serve {
        /// Keep sessions in process instead of the configured store
        #[arg(long)]
        memory_sessions: bool,
    },
    /// Load and validate the configuration, then exit
    CheckConfig,
    /// Print the stock images users can choose from
    ListStock,
    /// Dump every stored image as JSON
    ListImages,
    /// Delete user uploads older than the given age
    PruneUploads {
        /// Maximum age in days
        #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_AGE_DAYS)]
        max_age_days: f64,

        /// Only report what would be deleted
        #[arg(long)]
        dry_run: bool,
    },
}

fn load_config(path: &Path) -> Result<Config> {
    let config = Config::from_file(path)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    memebot::logging::init_or_warn(&config.logging);

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        session_backend = ?config.session.backend,
        cloud_name = %config.cloudinary.cloud_name,
        "Configuration loaded successfully"
    );

    match args.command.unwrap_or(Commands::Serve {
        memory_sessions: false,
    }) {
        Commands::Serve { memory_sessions } => serve(&config, memory_sessions).await,
        Commands::CheckConfig => {
            println!("Configuration OK");
            Ok(())
        }
        Commands::ListStock => list_stock(&config).await,
        Commands::ListImages => list_images(&config).await,
        Commands::PruneUploads {
            max_age_days,
            dry_run,
        } => prune_uploads(&config, max_age_days, dry_run).await,
    }
}

async fn serve(config: &Config, memory_sessions: bool) -> Result<()> {
    let state = memebot::server::build_state(config, memory_sessions)
        .await
        .context("Failed to initialize bot")?;

    let listen_addr = config.server.listen_addr();
    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;

    tracing::info!(address = %listen_addr, "Starting Memebot");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    };
    memebot::server::serve(listener, Arc::new(state), shutdown).await?;
    Ok(())
}

fn client(config: &Config) -> Result<CloudinaryClient> {
    CloudinaryClient::new(config.cloudinary.clone()).context("Failed to create image host client")
}

async fn list_stock(config: &Config) -> Result<()> {
    let ids = client(config)?.stock_images().await?;
    println!("{}", format_stock_choices(&ids));
    Ok(())
}

async fn list_images(config: &Config) -> Result<()> {
    let client = client(config)?;
    let mut cursor: Option<String> = None;
    loop {
        let page = client.list_all(cursor.as_deref()).await?;
        for resource in &page.resources {
            println!("{}", serde_json::to_string_pretty(resource)?);
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(())
}

async fn prune_uploads(config: &Config, max_age_days: f64, dry_run: bool) -> Result<()> {
    if max_age_days.is_nan() || max_age_days < 0.0 {
        bail!("--max-age-days must be a non-negative number");
    }

    let client = client(config)?;
    let tag = config.cloudinary.upload_tag.as_str();
    let mut cursor: Option<String> = None;
    let mut deleted = 0usize;

    loop {
        let page = client
            .list_by_tag(tag, PRUNE_PAGE_SIZE, cursor.as_deref())
            .await?;
        let now = chrono::Utc::now();
        let expired = expired_public_ids(&page.resources, now, max_age_days);

        for public_id in &expired {
            println!("{}", public_id);
        }

        if !expired.is_empty() && !dry_run {
            client.delete_resources(&expired).await?;
            deleted += expired.len();
        }

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    tracing::info!(deleted, tag = %tag, max_age_days, dry_run, "Prune finished");
    Ok(())
}
