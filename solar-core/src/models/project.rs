use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::max;
use crate::models::Investment;

/// A homeowner's solar installation funding campaign.
///
/// Everything except `current_funding` and `investors` is fixed at creation.
/// `current_funding` is only ever increased together with an append to
/// `investors`, so it always equals the sum of the recorded amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,

    // Homeowner-provided values
    pub project_name: String,
    pub location: String,
    pub address: String,
    pub roof_size: Decimal,
    pub goal_amount: Decimal,

    // Estimator-derived values
    pub system_size: Decimal,
    pub roi: Decimal,
    pub monthly_savings: Decimal,
    #[serde(rename = "annualCO2Saved")]
    pub annual_co2_saved: Decimal,

    // Funding state
    pub current_funding: Decimal,
    pub investors: Vec<Investment>,

    pub created_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}

/// For creating new projects (no id, funding state or creation timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub project_name: String,
    pub location: String,
    pub address: String,
    pub roof_size: Decimal,
    pub goal_amount: Decimal,
    pub system_size: Decimal,
    pub roi: Decimal,
    pub monthly_savings: Decimal,
    #[serde(rename = "annualCO2Saved")]
    pub annual_co2_saved: Decimal,
    /// When the homeowner submitted the listing. Defaults to the creation time.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Funding progress classification used by the dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingStatus {
    Funding,
    Funded,
}

impl FundingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Funding => "funding",
            Self::Funded => "funded",
        }
    }
}

impl Project {
    /// Builds the stored record for `new` with empty funding state.
    pub fn from_new(
        id: i64,
        new: NewProject,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project_name: new.project_name,
            location: new.location,
            address: new.address,
            roof_size: new.roof_size,
            goal_amount: new.goal_amount,
            system_size: new.system_size,
            roi: new.roi,
            monthly_savings: new.monthly_savings,
            annual_co2_saved: new.annual_co2_saved,
            current_funding: Decimal::ZERO,
            investors: Vec::new(),
            created_at,
            submitted_at: new.submitted_at.unwrap_or(created_at),
        }
    }

    /// `current_funding / goal_amount * 100`, or zero for a zero goal.
    pub fn funding_percent(&self) -> Decimal {
        if self.goal_amount.is_zero() {
            return Decimal::ZERO;
        }
        self.current_funding / self.goal_amount * Decimal::ONE_HUNDRED
    }

    /// Amount still needed to reach the goal, never negative.
    pub fn remaining_funding(&self) -> Decimal {
        max(self.goal_amount - self.current_funding, Decimal::ZERO)
    }

    pub fn funding_status(&self) -> FundingStatus {
        if self.current_funding >= self.goal_amount {
            FundingStatus::Funded
        } else {
            FundingStatus::Funding
        }
    }

    pub fn is_funded(&self) -> bool {
        self.funding_status() == FundingStatus::Funded
    }

    /// Sum of every recorded investment amount.
    pub fn invested_total(&self) -> Decimal {
        self.investors.iter().map(|inv| inv.amount).sum()
    }

    /// Investments recorded under `name` (exact match).
    pub fn investments_by<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Investment> + 'a {
        self.investors.iter().filter(move |inv| inv.name == name)
    }
}
