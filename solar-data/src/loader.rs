use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use solar_core::{NewProject, ProjectStore, StoreError};
use thiserror::Error;
use tracing::{debug, info};

const BUILTIN_CSV: &str = include_str!("../data/demo_projects.csv");

/// Errors that can occur when loading demo project data.
#[derive(Debug, Error)]
pub enum DemoDataError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Row {row}: {field} must be positive, got {value}")]
    NonPositive {
        row: usize,
        field: &'static str,
        value: Decimal,
    },

    #[error("Row {row}: {field} is required")]
    MissingField { row: usize, field: &'static str },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<csv::Error> for DemoDataError {
    fn from(err: csv::Error) -> Self {
        DemoDataError::CsvParse(err.to_string())
    }
}

/// A single row from a demo projects CSV file.
///
/// Columns:
/// - `project_name`, `address`, `location`: descriptive text
/// - `goal_amount`: funding goal in dollars
/// - `roof_size`: roof area in square feet
/// - `system_size`: system capacity in kW
/// - `roi`: investor return, percent per year
/// - `monthly_savings`: homeowner savings in dollars per month
/// - `annual_co2_saved`: tons of CO₂ avoided per year
///
/// The derived columns are taken as given rather than recomputed, so a
/// file can carry hand-tuned showcase figures.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DemoProjectRecord {
    pub project_name: String,
    pub address: String,
    pub location: String,
    pub goal_amount: Decimal,
    pub roof_size: Decimal,
    pub system_size: Decimal,
    pub roi: Decimal,
    pub monthly_savings: Decimal,
    pub annual_co2_saved: Decimal,
}

impl DemoProjectRecord {
    fn validate(
        &self,
        row: usize,
    ) -> Result<(), DemoDataError> {
        for (field, value) in [
            ("project_name", &self.project_name),
            ("address", &self.address),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(DemoDataError::MissingField { row, field });
            }
        }
        for (field, value) in [
            ("goal_amount", self.goal_amount),
            ("roof_size", self.roof_size),
            ("system_size", self.system_size),
        ] {
            if value <= Decimal::ZERO {
                return Err(DemoDataError::NonPositive { row, field, value });
            }
        }
        Ok(())
    }
}

impl From<&DemoProjectRecord> for NewProject {
    fn from(record: &DemoProjectRecord) -> Self {
        NewProject {
            project_name: record.project_name.trim().to_string(),
            location: record.location.trim().to_string(),
            address: record.address.trim().to_string(),
            roof_size: record.roof_size,
            goal_amount: record.goal_amount,
            system_size: record.system_size,
            roi: record.roi,
            monthly_savings: record.monthly_savings,
            annual_co2_saved: record.annual_co2_saved,
            submitted_at: None,
        }
    }
}

/// The three showcase projects shipped with the crate.
pub fn builtin_records() -> Result<Vec<DemoProjectRecord>, DemoDataError> {
    DemoProjectLoader::parse(BUILTIN_CSV.as_bytes())
}

/// Loader for demo project data.
///
/// Works against any [`ProjectStore`], whatever backend it persists to.
pub struct DemoProjectLoader;

impl DemoProjectLoader {
    /// Parse demo project records from a CSV reader.
    ///
    /// Every row is validated before anything is returned, so a bad file
    /// never results in a partial load. Row numbers in errors are 1-based
    /// and exclude the header.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<DemoProjectRecord>, DemoDataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let record: DemoProjectRecord = result?;
            record.validate(index + 1)?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed demo project records");
        Ok(records)
    }

    /// List every record as a new project in `store`.
    ///
    /// Records are appended; loading the same file twice lists the projects
    /// twice. Returns the number of projects added.
    pub async fn load(
        store: &ProjectStore,
        records: &[DemoProjectRecord],
    ) -> Result<usize, DemoDataError> {
        let mut added = 0;
        for record in records {
            store.add_project(NewProject::from(record)).await?;
            added += 1;
        }

        info!(added, "demo projects loaded");
        Ok(added)
    }
}
