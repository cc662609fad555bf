use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use solar_core::ProjectStore;
use solar_core::db::{MemoryStorageFactory, StorageConfig, StorageRegistry};
use solar_data::{DemoProjectLoader, builtin_records};
use solar_db_sqlite::SqliteStorageFactory;
use tracing_subscriber::EnvFilter;

/// Load demo solar projects into the project store.
///
/// The CSV file should have the following columns:
/// - project_name, address, location
/// - goal_amount: funding goal in dollars
/// - roof_size: roof area in square feet
/// - system_size: system capacity in kW
/// - roi: investor return in percent per year
/// - monthly_savings: homeowner savings per month
/// - annual_co2_saved: tons of CO₂ avoided per year
///
/// Without `--file` the three bundled demo projects are loaded.
#[derive(Parser, Debug)]
#[command(name = "solar-demo-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a CSV file of demo projects
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Storage backend ("sqlite" or "memory")
    #[arg(short, long, default_value = "sqlite")]
    backend: String,

    /// Connection string for the backend (a file path or `:memory:` for SQLite)
    #[arg(short, long, default_value = "octosolar.db")]
    database: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut registry = StorageRegistry::new();
    registry.register(Box::new(SqliteStorageFactory));
    registry.register(Box::new(MemoryStorageFactory));

    let config = StorageConfig::new(&args.backend, &args.database);
    let backend = registry
        .create(&config)
        .await
        .with_context(|| format!("Failed to open {} storage: {}", args.backend, args.database))?;
    let store = ProjectStore::open(backend).await;
    println!("Store holds {} existing projects", store.projects().len());

    let records = match &args.file {
        Some(path) => {
            println!("Loading demo projects from: {}", path.display());
            let file =
                File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
            DemoProjectLoader::parse(file)
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?
        }
        None => {
            println!("Loading bundled demo projects");
            builtin_records().context("Failed to parse bundled demo projects")?
        }
    };

    println!("Parsed {} records", records.len());

    let added = DemoProjectLoader::load(&store, &records)
        .await
        .context("Failed to add demo projects to the store")?;

    println!("Successfully added {} demo projects.", added);

    Ok(())
}
