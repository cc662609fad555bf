//! Solar system sizing, return-on-investment and CO₂ estimates.
//!
//! All figures derive from a handful of fixed domain assumptions for a
//! Chicago-area rooftop installation:
//!
//! | Constant               | Value | Meaning                                   |
//! |------------------------|-------|-------------------------------------------|
//! | `COST_PER_WATT`        | 3     | Installed cost, USD per watt              |
//! | `KWH_PER_WATT_YEAR`    | 1.5   | Annual generation per installed watt      |
//! | `ELECTRICITY_RATE`     | 0.15  | Grid price, USD per kWh                   |
//! | `INVESTOR_SHARE`       | 0.6   | Share of savings paid out to investors    |
//! | `CO2_TONS_PER_KW_YEAR` | 1.5   | CO₂ avoided per installed kW per year     |
//! | `TREES_PER_TON`        | 50    | Trees absorbing one ton of CO₂ per year   |
//! | `LIFETIME_YEARS`       | 25    | Panel lifetime used for lifetime figures  |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use solar_core::calculations::{calculate_co2_savings, calculate_roi, estimate_system_size};
//!
//! let system_size = estimate_system_size(dec!(18000));
//! assert_eq!(system_size, dec!(6.0));
//!
//! let roi = calculate_roi(dec!(18000), system_size).unwrap();
//! assert_eq!(roi.roi, dec!(4.5));
//! assert_eq!(roi.monthly_savings, dec!(113));
//!
//! let co2 = calculate_co2_savings(system_size).unwrap();
//! assert_eq!(co2.trees_equivalent, dec!(450));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::round_dp;

pub const COST_PER_WATT: Decimal = dec!(3);
pub const KWH_PER_WATT_YEAR: Decimal = dec!(1.5);
pub const ELECTRICITY_RATE: Decimal = dec!(0.15);
pub const INVESTOR_SHARE: Decimal = dec!(0.6);
pub const CO2_TONS_PER_KW_YEAR: Decimal = dec!(1.5);
pub const TREES_PER_TON: Decimal = dec!(50);
pub const LIFETIME_YEARS: Decimal = dec!(25);

const WATTS_PER_KW: Decimal = dec!(1000);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Errors for inputs the estimator cannot produce a finite figure for.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimatorError {
    /// The funding goal is zero or negative.
    #[error("funding goal must be positive, got {0}")]
    NonPositiveGoal(Decimal),

    /// The system size is zero or negative, so no return is generated.
    #[error("system size must be positive, got {0} kW")]
    NonPositiveSystemSize(Decimal),

    /// An intermediate figure does not fit in a `Decimal`.
    #[error("estimate is too large to represent")]
    Overflow,
}

fn mul(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, EstimatorError> {
    a.checked_mul(b).ok_or(EstimatorError::Overflow)
}

fn div(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, EstimatorError> {
    a.checked_div(b).ok_or(EstimatorError::Overflow)
}

/// Projected investor return for a project.
///
/// Percentages and ratios carry one decimal place, currency none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiEstimate {
    /// Annual investor return as a percentage of the goal.
    pub roi: Decimal,

    /// Investor share of the annual savings, USD.
    pub annual_return: Decimal,

    /// Homeowner electricity savings per year, USD.
    pub annual_savings: Decimal,

    /// Homeowner electricity savings per month, USD.
    pub monthly_savings: Decimal,

    /// Years of investor returns needed to repay the goal.
    pub payback_years: Decimal,
}

/// CO₂ avoided by an installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Co2Savings {
    /// Tons per year, one decimal place.
    pub annual: Decimal,

    /// Tons over the panel lifetime, whole tons.
    pub lifetime_25_years: Decimal,

    /// Trees needed to absorb the annual figure, whole trees.
    pub trees_equivalent: Decimal,
}

/// Installed capacity in kW that `goal_amount` buys, rounded to one decimal
/// place.
pub fn estimate_system_size(goal_amount: Decimal) -> Decimal {
    let watts = goal_amount / COST_PER_WATT;
    round_dp(watts / WATTS_PER_KW, 1)
}

/// Projects the investor return for a project of `system_size_kw` funded by
/// `goal_amount`.
///
/// # Errors
///
/// * [`EstimatorError::NonPositiveGoal`] when `goal_amount <= 0`
/// * [`EstimatorError::NonPositiveSystemSize`] when `system_size_kw <= 0`
/// * [`EstimatorError::Overflow`] when a figure exceeds the `Decimal` range
pub fn calculate_roi(
    goal_amount: Decimal,
    system_size_kw: Decimal,
) -> Result<RoiEstimate, EstimatorError> {
    if goal_amount <= Decimal::ZERO {
        return Err(EstimatorError::NonPositiveGoal(goal_amount));
    }
    if system_size_kw <= Decimal::ZERO {
        return Err(EstimatorError::NonPositiveSystemSize(system_size_kw));
    }

    let annual_kwh = mul(mul(system_size_kw, WATTS_PER_KW)?, KWH_PER_WATT_YEAR)?;
    let annual_savings = mul(annual_kwh, ELECTRICITY_RATE)?;
    let investor_annual_return = mul(annual_savings, INVESTOR_SHARE)?;
    let roi = mul(div(investor_annual_return, goal_amount)?, Decimal::ONE_HUNDRED)?;

    Ok(RoiEstimate {
        roi: round_dp(roi, 1),
        annual_return: round_dp(investor_annual_return, 0),
        annual_savings: round_dp(annual_savings, 0),
        monthly_savings: round_dp(div(annual_savings, MONTHS_PER_YEAR)?, 0),
        payback_years: round_dp(div(goal_amount, investor_annual_return)?, 1),
    })
}

/// CO₂ avoided by `system_size_kw` of installed capacity.
///
/// # Errors
///
/// * [`EstimatorError::Overflow`] when the lifetime or tree figure exceeds
///   the `Decimal` range
pub fn calculate_co2_savings(system_size_kw: Decimal) -> Result<Co2Savings, EstimatorError> {
    let annual_tons = mul(system_size_kw, CO2_TONS_PER_KW_YEAR)?;

    Ok(Co2Savings {
        annual: round_dp(annual_tons, 1),
        lifetime_25_years: round_dp(mul(annual_tons, LIFETIME_YEARS)?, 0),
        trees_equivalent: trees_for_tons(annual_tons)?,
    })
}

/// Whole trees needed to absorb `tons` of CO₂ per year.
pub fn trees_for_tons(tons: Decimal) -> Result<Decimal, EstimatorError> {
    Ok(round_dp(mul(tons, TREES_PER_TON)?, 0))
}
