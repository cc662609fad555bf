//! Financial and environmental estimates for solar projects, plus the
//! read-only analytics the dashboards derive from the project collection.

pub mod common;
pub mod marketplace;
pub mod portfolio;
pub mod solar;

pub use marketplace::{FundingPoint, MarketplaceSummary, ProjectFilter, StatusFilter, funding_timeline};
pub use portfolio::{InvestorPortfolio, PortfolioHolding};
pub use solar::{
    Co2Savings, EstimatorError, RoiEstimate, calculate_co2_savings, calculate_roi,
    estimate_system_size,
};
