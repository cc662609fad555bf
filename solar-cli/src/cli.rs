use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use solar_core::calculations::StatusFilter;

use crate::config::ConfigOverrides;
use crate::utils::parse_money;

/// Community solar funding marketplace.
///
/// Homeowners list rooftop projects with a funding goal; investors pledge
/// money toward them and track projected returns and CO₂ impact.
#[derive(Debug, Parser)]
#[command(name = "octosolar", version, about)]
pub struct Cli {
    /// Config file (defaults to `octosolar.toml` in the working directory
    /// when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend ("sqlite" or "memory").
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Storage connection string.
    /// For SQLite this is a file path (e.g. `octosolar.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log level or EnvFilter directive (e.g. `debug`, `solar_core=trace`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Hide log output on the console. File logging is unaffected.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend: self.backend.clone(),
            connection_string: self.db.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Browse listed projects.
    List {
        /// Only show projects in this state: all, funding or funded.
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// Case-insensitive match against project name or location.
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Show one project with its investors and impact.
    Show { id: i64 },

    /// List a new rooftop project for funding.
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        address: String,

        /// City and state, e.g. "Chicago, IL".
        #[arg(long)]
        location: String,

        /// Usable roof area in square feet (at least 400).
        #[arg(long, value_parser = parse_money)]
        roof_size: Decimal,

        /// Funding goal in dollars (5,000 to 50,000).
        #[arg(long, value_parser = parse_money)]
        goal: Decimal,
    },

    /// Pledge money toward a project.
    Invest {
        id: i64,

        #[arg(long, value_parser = parse_money, allow_negative_numbers = true)]
        amount: Decimal,

        #[arg(long)]
        investor: String,
    },

    /// Show an investor's holdings and projected returns.
    Portfolio {
        #[arg(long)]
        investor: String,
    },

    /// Marketplace totals and environmental impact.
    Stats,

    /// Every investment in date order with the running total.
    Timeline,

    /// Estimate system size, returns and CO₂ savings for a funding goal.
    Estimate {
        #[arg(long, value_parser = parse_money)]
        goal: Decimal,

        /// Override the system size (kW) derived from the goal.
        #[arg(long)]
        system_size: Option<Decimal>,
    },

    /// Add the sample projects (or the projects in a CSV file).
    Demo {
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete every project and investment. Cannot be undone.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}
