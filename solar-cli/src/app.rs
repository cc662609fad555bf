use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{debug, info};

use solar_core::calculations::{
    InvestorPortfolio, MarketplaceSummary, ProjectFilter, calculate_co2_savings, calculate_roi,
    estimate_system_size, funding_timeline,
};
use solar_core::db::{MemoryStorageFactory, StorageConfig, StorageRegistry};
use solar_core::{ProjectListing, ProjectStore, StoreError};
use solar_data::{DemoProjectLoader, builtin_records};
use solar_db_sqlite::SqliteStorageFactory;

use crate::cli::Command;
use crate::render::{
    EstimateView, InvestmentReceipt, ListingReceipt, PortfolioView, ProjectDetail, ProjectTable,
    SummaryView, TimelineView,
};

/// Build a registry containing every compiled-in storage backend.
pub fn build_registry() -> StorageRegistry {
    let mut registry = StorageRegistry::new();
    registry.register(Box::new(SqliteStorageFactory));
    registry.register(Box::new(MemoryStorageFactory));
    registry
}

/// Open the configured backend and load the saved projects.
pub async fn open_store(config: &StorageConfig) -> Result<ProjectStore> {
    debug!(backend = %config.backend, "opening storage");
    let backend = build_registry()
        .create(config)
        .await
        .with_context(|| {
            format!(
                "failed to open {} storage at '{}'",
                config.backend, config.connection_string
            )
        })?;

    let store = ProjectStore::open(backend).await;
    info!(projects = store.projects().len(), "store ready");
    Ok(store)
}

/// Execute one command against `store` and return the text to print.
pub async fn run(
    store: &ProjectStore,
    command: Command,
) -> Result<String> {
    match command {
        Command::List { status, search } => {
            let projects = store.projects();
            let filter = ProjectFilter::new(status, search);
            let empty_message = if projects.is_empty() {
                "No projects yet. Run `octosolar demo` to add sample projects."
            } else {
                "No projects match."
            };
            Ok(ProjectTable {
                projects: filter.apply(&projects),
                empty_message,
            }
            .to_string())
        }

        Command::Show { id } => {
            let project = store.project(id).ok_or(StoreError::ProjectNotFound(id))?;
            Ok(ProjectDetail(&project).to_string())
        }

        Command::Add {
            name,
            address,
            location,
            roof_size,
            goal,
        } => {
            let listing = ProjectListing {
                project_name: name,
                address,
                location,
                roof_size,
                goal_amount: goal,
            };
            let new_project = listing
                .into_new_project(Utc::now())
                .context("listing rejected")?;
            let project = store.add_project(new_project).await?;
            Ok(ListingReceipt(&project).to_string())
        }

        Command::Invest {
            id,
            amount,
            investor,
        } => {
            let investment = store
                .invest_in_project(id, amount, &investor)
                .await
                .context("investment rejected")?;
            let project = store.project(id).ok_or(StoreError::ProjectNotFound(id))?;
            Ok(InvestmentReceipt {
                project: &project,
                investor: &investment.name,
                amount: investment.amount,
            }
            .to_string())
        }

        Command::Portfolio { investor } => {
            let portfolio = InvestorPortfolio::for_investor(investor.trim(), &store.projects());
            Ok(PortfolioView(&portfolio).to_string())
        }

        Command::Stats => {
            let summary = MarketplaceSummary::from_projects(&store.projects())?;
            Ok(SummaryView(&summary).to_string())
        }

        Command::Timeline => {
            let points = funding_timeline(&store.projects());
            Ok(TimelineView(&points).to_string())
        }

        Command::Estimate { goal, system_size } => {
            let system_size = system_size.unwrap_or_else(|| estimate_system_size(goal));
            let roi = calculate_roi(goal, system_size)?;
            Ok(EstimateView {
                goal_amount: goal,
                system_size,
                roi,
                co2: calculate_co2_savings(system_size)?,
            }
            .to_string())
        }

        Command::Demo { file } => {
            let records = match file {
                Some(path) => parse_demo_file(&path)?,
                None => builtin_records().context("bundled demo data is invalid")?,
            };
            let added = DemoProjectLoader::load(store, &records).await?;
            Ok(format!("Added {added} demo project(s)."))
        }

        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all project data without --yes");
            }
            let removed = store.clear_all_data().await?;
            Ok(format!("Removed {removed} project(s). All saved data deleted."))
        }
    }
}

fn parse_demo_file(path: &Path) -> Result<Vec<solar_data::DemoProjectRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    DemoProjectLoader::parse(file).with_context(|| format!("failed to parse {}", path.display()))
}
