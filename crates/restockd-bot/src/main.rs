use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use restockd_bot::{
    console,
    monitor::{self, MonitorContext},
    sink::ChannelSink,
};
use restockd_core::{Catalog, StatusStore};
use restockd_lookup::StockClient;

#[derive(Debug, Parser)]
#[command(name = "restockd")]
#[command(about = "Retail restock monitoring bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// One-shot stock lookup, printed as JSON.
    Check { sku: String, zip_code: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Check { sku, zip_code }) => run_check(&sku, &zip_code).await,
        None => run_bot().await,
    }
}

async fn run_check(sku: &str, zip_code: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let client = StockClient::new(
        restockd_core::DEFAULT_LOOKUP_TIMEOUT_SECS,
        restockd_core::DEFAULT_LOOKUP_USER_AGENT,
    )?;
    let record = client.check_stock(sku, zip_code).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn run_bot() -> anyhow::Result<()> {
    let config = Arc::new(restockd_core::load_app_config_from_env()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = load_catalog_or_empty(&config.products_path);
    log_catalog_summary(&catalog);

    let client = StockClient::new(config.lookup_timeout_secs, &config.lookup_user_agent)?;
    let sink = ChannelSink::new(&config.bot_token, config.channel_id, config.operator_id)?;

    let ctx = MonitorContext::new(
        Arc::new(RwLock::new(catalog)),
        Arc::new(RwLock::new(StatusStore::default())),
        client,
        sink,
        config.max_concurrent_checks,
    );

    monitor::run_monitor_cycle(&ctx).await;
    let _scheduler = monitor::build_scheduler(ctx.clone(), config.check_interval_secs).await?;
    let console = tokio::spawn(console::run_console(ctx));

    shutdown_signal().await;
    console.abort();
    Ok(())
}

/// A missing or broken products file starts the bot with an empty catalog
/// instead of aborting; products can still be added over the console.
fn load_catalog_or_empty(path: &Path) -> Catalog {
    match restockd_core::load_catalog(path) {
        Ok(catalog) => catalog,
        Err(error) => {
            tracing::error!(
                path = %path.display(),
                error = %error,
                "could not load product catalog; starting with an empty one"
            );
            Catalog::default()
        }
    }
}

fn log_catalog_summary(catalog: &Catalog) {
    let counts = catalog.priority_counts();
    tracing::info!(
        products = catalog.len(),
        top = counts[0].1,
        high = counts[1].1,
        medium = counts[2].1,
        low = counts[3].1,
        "loaded product catalog"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
