// CrimeWatch store maintenance CLI
// Opens the local database and runs one maintenance command against it

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crimewatch_store::config::{StoreConfig, DEFAULT_AUDIT_PAGE};
use crimewatch_store::DataStore;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Maintenance tool for the CrimeWatch local data store
#[derive(Parser)]
#[command(name = "crimewatch-store", version)]
struct Cli {
    /// Store configuration file (JSON). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path, overriding the configuration
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database, default settings and the first analytics snapshot
    Init,

    /// Write every collection as JSON
    Export {
        /// Output file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Restore collections from an export file
    Import {
        file: PathBuf,
    },

    /// Check complaint owners and id uniqueness
    Validate,

    /// Recompute, store and print the analytics snapshot
    Analytics,

    /// Print the most recent audit entries
    Audit {
        #[arg(long, default_value_t = DEFAULT_AUDIT_PAGE)]
        limit: usize,
    },

    /// Drop every cache entry
    ClearCache,

    /// Remove all stored data
    Clear,
}

async fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StoreConfig::default().with_env_overrides(),
    };

    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crimewatch_store=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).await?;

    let store = DataStore::open(&config)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    match cli.command {
        Commands::Init => {
            store.initialize().await;
            println!("Initialized store at {}", config.database_path.display());
        }
        Commands::Export { output } => {
            let json = store.export_data().await;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Import { file } => {
            let json = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            if !store.import_data(&json).await {
                bail!("{} is not a valid export document", file.display());
            }
            println!("Imported {}", file.display());
        }
        Commands::Validate => {
            let report = store.validate_data_integrity().await;
            if report.is_valid {
                println!("Data integrity OK");
            } else {
                for error in &report.errors {
                    println!("{}", error);
                }
                bail!("{} integrity problems found", report.errors.len());
            }
        }
        Commands::Analytics => {
            if !store.analytics.refresh().await {
                bail!("Failed to store analytics snapshot");
            }
            let analytics = store
                .analytics
                .get()
                .await
                .context("Analytics snapshot missing after refresh")?;
            println!("{}", serde_json::to_string_pretty(&analytics)?);
        }
        Commands::Audit { limit } => {
            for entry in store.audit.list(limit).await {
                println!(
                    "{} {} {} {} {}",
                    entry.timestamp.to_rfc3339(),
                    entry.user_name,
                    entry.action,
                    entry.resource,
                    entry.resource_id.unwrap_or_default()
                );
            }
        }
        Commands::ClearCache => {
            if !store.cache.clear().await {
                bail!("Failed to clear cache");
            }
            println!("Cache cleared");
        }
        Commands::Clear => {
            if !store.clear_all_data().await {
                bail!("Failed to clear all data");
            }
            println!("All data cleared");
        }
    }

    Ok(())
}
