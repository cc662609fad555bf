//! Per-investor holdings and projected returns.
//!
//! Investors are matched by the exact name recorded on each investment.
//! Two people typing the same name share a portfolio.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::models::Project;

/// An investor's position in a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioHolding {
    pub project_id: i64,
    pub project_name: String,
    pub location: String,
    pub roi: Decimal,
    /// Sum of this investor's contributions to the project.
    pub invested: Decimal,
    /// `invested * roi / 100`, rounded to cents.
    pub annual_return: Decimal,
    pub transactions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorPortfolio {
    pub investor: String,
    pub holdings: Vec<PortfolioHolding>,
    pub total_invested: Decimal,
    pub projected_annual_return: Decimal,
}

impl InvestorPortfolio {
    /// Collects every project `investor` has put money into, in collection
    /// order.
    pub fn for_investor(
        investor: &str,
        projects: &[Project],
    ) -> Self {
        let holdings: Vec<PortfolioHolding> = projects
            .iter()
            .filter_map(|project| holding_for(investor, project))
            .collect();

        let total_invested = holdings.iter().map(|h| h.invested).sum();
        let projected_annual_return = holdings.iter().map(|h| h.annual_return).sum();

        Self {
            investor: investor.to_string(),
            holdings,
            total_invested,
            projected_annual_return,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn project_count(&self) -> usize {
        self.holdings.len()
    }
}

fn holding_for(
    investor: &str,
    project: &Project,
) -> Option<PortfolioHolding> {
    let (invested, transactions) = project
        .investments_by(investor)
        .fold((Decimal::ZERO, 0), |(sum, n), inv| (sum + inv.amount, n + 1));

    if transactions == 0 {
        return None;
    }

    Some(PortfolioHolding {
        project_id: project.id,
        project_name: project.project_name.clone(),
        location: project.location.clone(),
        roi: project.roi,
        invested,
        annual_return: round_half_up(invested * project.roi / Decimal::ONE_HUNDRED),
        transactions,
    })
}
