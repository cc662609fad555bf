use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::{EstimatorError, calculate_co2_savings, calculate_roi, estimate_system_size};
use crate::models::NewProject;

/// Smallest roof that fits a useful array, in square feet.
pub const MIN_ROOF_SIZE: Decimal = dec!(400);
pub const MIN_GOAL_AMOUNT: Decimal = dec!(5000);
pub const MAX_GOAL_AMOUNT: Decimal = dec!(50000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("roof size must be at least {min} sq ft, got {0}", min = MIN_ROOF_SIZE)]
    RoofTooSmall(Decimal),

    #[error(
        "funding goal must be between ${min} and ${max}, got ${0}",
        min = MIN_GOAL_AMOUNT,
        max = MAX_GOAL_AMOUNT
    )]
    GoalOutOfRange(Decimal),

    #[error("estimate failed: {0}")]
    Estimate(#[from] EstimatorError),
}

/// Raw homeowner input for listing a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectListing {
    pub project_name: String,
    pub address: String,
    pub location: String,
    pub roof_size: Decimal,
    pub goal_amount: Decimal,
}

impl ProjectListing {
    /// Checks the listing against the marketplace rules, reporting the first
    /// violation.
    pub fn validate(&self) -> Result<(), ListingError> {
        for (field, value) in [
            ("project name", &self.project_name),
            ("street address", &self.address),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(ListingError::MissingField(field));
            }
        }

        if self.roof_size < MIN_ROOF_SIZE {
            return Err(ListingError::RoofTooSmall(self.roof_size));
        }

        if self.goal_amount < MIN_GOAL_AMOUNT || self.goal_amount > MAX_GOAL_AMOUNT {
            return Err(ListingError::GoalOutOfRange(self.goal_amount));
        }

        Ok(())
    }

    /// Validates the listing and fills in the estimator-derived fields.
    pub fn into_new_project(
        self,
        submitted_at: DateTime<Utc>,
    ) -> Result<NewProject, ListingError> {
        self.validate()?;

        let system_size = estimate_system_size(self.goal_amount);
        let roi = calculate_roi(self.goal_amount, system_size)?;
        let co2 = calculate_co2_savings(system_size)?;

        Ok(NewProject {
            project_name: self.project_name.trim().to_string(),
            location: self.location.trim().to_string(),
            address: self.address.trim().to_string(),
            roof_size: self.roof_size,
            goal_amount: self.goal_amount,
            system_size,
            roi: roi.roi,
            monthly_savings: roi.monthly_savings,
            annual_co2_saved: co2.annual,
            submitted_at: Some(submitted_at),
        })
    }
}
