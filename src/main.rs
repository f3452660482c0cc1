//! FlexiMart catalog runner.
//!
//! Connects to the catalog database, executes the five fixed operations
//! in order, and renders the results.

mod cli;
mod config;
mod db;
mod error;
mod ops;
mod output;
mod runner;

use cli::Cli;
use config::{Config, ConnectionConfig};
use db::{sample_catalog, CatalogStore, MemoryStore};
use error::{FleximartError, Result};
use runner::{RunPlan, Runner};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();
    let format = cli.parse_output_format().map_err(FleximartError::config)?;
    let plan = RunPlan::fleximart()?;

    let store: Box<dyn CatalogStore> = if cli.mock {
        info!("Running against the in-memory sample catalog");
        Box::new(MemoryStore::with_products(sample_catalog()))
    } else {
        // Load configuration file
        let config_path = cli.config_path();
        info!("Loading config from: {}", config_path.display());
        let config = Config::load_from_file(&config_path)?;

        let Some(conn) = resolve_connection(&cli, &config)? else {
            return Err(FleximartError::config(
                "No database connection configured. \
                 Pass a mongodb:// connection string or set MONGODB_URI; see --help.",
            ));
        };

        info!("Connection: {}", conn.display_string());
        db::connect(&conn).await?
    };

    // Run the five operations, then release the session either way.
    let outcome = Runner::new(store.as_ref()).run(&plan).await;
    let closed = store.close().await;
    let report = outcome?;
    closed?;

    println!("{}", output::render(&report, format)?);
    Ok(())
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
///
/// Precedence:
/// 1. CLI arguments (highest)
/// 2. Named connection from config
/// 3. Default connection from config
/// 4. Environment variables
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    // Start with CLI connection config if provided
    let mut connection = cli.to_connection_config()?;

    // If no CLI connection, try named connection from config
    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            connection = config.get_connection(Some(name)).cloned();
            if connection.is_none() {
                return Err(FleximartError::config(format!(
                    "Connection '{}' not found in config file",
                    name
                )));
            }
        }
    }

    // If still no connection, try default from config
    if connection.is_none() {
        connection = config.get_connection(None).cloned();
    }

    // A full URI in the environment beats field-wise env defaults
    if connection.is_none() {
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            connection = Some(ConnectionConfig::from_connection_string(&uri)?);
        }
    }

    // Apply environment variable defaults
    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
    }

    Ok(connection)
}
