//! Souq CLI - manage marketplace listings from the command line
//!
//! Stands in for the mobile UI: every mutating command writes to the local
//! store first and then fires the same immediate-sync hook the app screens
//! use, so listings converge to the remote store whenever connectivity
//! allows.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use souq_core::connectivity::SharedConnectivity;
use souq_core::db::{Database, ProductRepository, SqliteProductRepository};
use souq_core::remote::{HttpRemoteStore, MemoryRemoteStore, RemoteStore};
use souq_core::{Product, ProductChange, ProductDraft, ProductId, ProductStatus, SyncConfig, SyncOrchestrator};

#[derive(Parser)]
#[command(name = "souq")]
#[command(about = "Manage marketplace listings from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the local database file
    #[arg(long, value_name = "PATH", default_value = "souq.db")]
    db_path: PathBuf,

    /// Remote document store base URL (e.g. https://souq.example.com)
    #[arg(long, value_name = "URL")]
    remote_url: Option<String>,

    /// Treat the network as unreachable (all sync operations no-op)
    #[arg(long)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new listing
    Add {
        /// Listing title
        title: String,
        /// Asking price
        #[arg(long)]
        price: f64,
        /// Owner identifier
        #[arg(long, value_name = "ID")]
        owner: String,
        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,
        /// Category name
        #[arg(long, default_value = "")]
        category: String,
        /// Item condition
        #[arg(long, default_value = "")]
        condition: String,
        /// Location text
        #[arg(long, default_value = "")]
        location: String,
    },
    /// List all listings, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single listing
    Show {
        /// Listing ID
        id: i64,
    },
    /// Change a listing's lifecycle status
    SetStatus {
        /// Listing ID
        id: i64,
        /// New status
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Delete a listing locally and remove its remote document
    Delete {
        /// Listing ID
        id: i64,
    },
    /// Upload every listing with unconfirmed local changes
    Push,
    /// Fetch the remote collection and merge it into the local store
    Refresh,
    /// Show how many listings are awaiting upload
    Pending,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum StatusArg {
    Available,
    Sold,
    Paused,
}

impl From<StatusArg> for ProductStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Available => Self::Available,
            StatusArg::Sold => Self::Sold,
            StatusArg::Paused => Self::Paused,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] souq_core::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No remote store configured. Pass --remote-url to enable sync.")]
    RemoteNotConfigured,
}

struct App {
    repo: Arc<SqliteProductRepository>,
    orchestrator: Arc<SyncOrchestrator>,
    remote_configured: bool,
}

impl App {
    fn open(cli: &Cli) -> Result<Self, CliError> {
        let config = cli
            .remote_url
            .clone()
            .map_or_else(SyncConfig::default, SyncConfig::new);

        let db = Arc::new(Database::open(&cli.db_path)?);
        let repo = Arc::new(SqliteProductRepository::new(db));

        let remote_configured = config.is_remote_configured();
        let remote: Arc<dyn RemoteStore> = if remote_configured {
            let base_url = config.remote_base_url.clone().unwrap_or_default();
            Arc::new(HttpRemoteStore::new(base_url, config.request_timeout)?)
        } else {
            Arc::new(MemoryRemoteStore::new())
        };

        let connectivity = SharedConnectivity::new(remote_configured && !cli.offline);
        let orchestrator = Arc::new(SyncOrchestrator::new(
            repo.clone(),
            remote,
            Arc::new(connectivity),
            &config,
        ));

        Ok(Self {
            repo,
            orchestrator,
            remote_configured,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let app = App::open(cli)?;

    match &cli.command {
        Commands::Add {
            title,
            price,
            owner,
            description,
            category,
            condition,
            location,
        } => {
            let draft = ProductDraft {
                title: title.clone(),
                description: description.clone(),
                price: *price,
                owner_id: owner.clone(),
                category: category.clone(),
                condition: condition.clone(),
                location: location.clone(),
                ..ProductDraft::default()
            };
            let product = app.repo.create(&draft)?;
            app.orchestrator
                .immediate_sync(ProductChange::Written(product.id))
                .await?;
            println!("Created listing {}", product.id);
        }
        Commands::List { json } => {
            let products = app.repo.list()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&products)?);
            } else {
                for product in &products {
                    print_row(product);
                }
            }
        }
        Commands::Show { id } => {
            let id = ProductId(*id);
            let product = app
                .repo
                .get(id)?
                .ok_or(souq_core::Error::NotFound(id.as_i64()))?;
            println!("{}", serde_json::to_string_pretty(&product)?);
        }
        Commands::SetStatus { id, status } => {
            let id = ProductId(*id);
            let product = app.repo.set_status(id, (*status).into())?;
            app.orchestrator
                .immediate_sync(ProductChange::Written(id))
                .await?;
            println!("Listing {} is now {}", product.id, product.status);
        }
        Commands::Delete { id } => {
            let id = ProductId(*id);
            app.repo.delete(id)?;
            app.orchestrator
                .immediate_sync(ProductChange::Deleted(id))
                .await?;
            println!("Deleted listing {id}");
        }
        Commands::Push => {
            if !app.remote_configured {
                return Err(CliError::RemoteNotConfigured);
            }
            let stats = app.orchestrator.sync_all_unsynced().await?;
            println!("Pushed {} listing(s), {} failed", stats.pushed, stats.failed);
        }
        Commands::Refresh => {
            if !app.remote_configured {
                return Err(CliError::RemoteNotConfigured);
            }
            let stats = app.orchestrator.full_refresh().await?;
            println!(
                "Added {}, updated {}, skipped {}",
                stats.added, stats.updated, stats.skipped
            );
        }
        Commands::Pending => {
            println!("{}", app.orchestrator.pending_sync_count()?);
        }
    }

    app.orchestrator.shutdown().await;
    Ok(())
}

fn print_row(product: &Product) {
    let pending = if product.sync_state.is_dirty() {
        " (pending sync)"
    } else {
        ""
    };
    println!(
        "{:>4}  {:<30}  {:>10.2}  {:<9}{pending}",
        product.id, product.title, product.price, product.status
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_status_arg_maps_to_core_status() {
        assert_eq!(
            ProductStatus::from(StatusArg::Sold),
            ProductStatus::Sold
        );
        assert_eq!(
            ProductStatus::from(StatusArg::Paused),
            ProductStatus::Paused
        );
    }
}
