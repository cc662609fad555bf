//! Marketplace-wide views over the project collection: search and status
//! filtering, headline statistics, and the cumulative funding timeline.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_dp;
use crate::calculations::solar::{EstimatorError, trees_for_tons};
use crate::models::{FundingStatus, Project};

/// Which funding states a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Funding,
    Funded,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Funding => "funding",
            Self::Funded => "funded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "funding" => Some(Self::Funding),
            "funded" => Some(Self::Funded),
            _ => None,
        }
    }

    pub fn accepts(&self, status: FundingStatus) -> bool {
        match self {
            Self::All => true,
            Self::Funding => status == FundingStatus::Funding,
            Self::Funded => status == FundingStatus::Funded,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown status '{s}' (expected all, funding or funded)"))
    }
}

/// Search term plus status restriction, as offered on the investor dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectFilter {
    pub status: StatusFilter,
    /// Case-insensitive substring matched against name and location.
    /// Empty matches everything.
    pub search: String,
}

impl ProjectFilter {
    pub fn new(
        status: StatusFilter,
        search: impl Into<String>,
    ) -> Self {
        Self {
            status,
            search: search.into(),
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || project.project_name.to_lowercase().contains(&needle)
            || project.location.to_lowercase().contains(&needle);

        matches_search && self.status.accepts(project.funding_status())
    }

    /// Projects that pass the filter, in collection order.
    pub fn apply<'a>(
        &self,
        projects: &'a [Project],
    ) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Headline numbers for the home page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarketplaceSummary {
    pub project_count: usize,
    pub funding_count: usize,
    pub funded_count: usize,
    pub total_funding: Decimal,
    pub total_goal: Decimal,
    /// Distinct investor names across all projects.
    pub unique_investors: usize,
    /// Sum of every project's annual CO₂ savings, one decimal place.
    pub total_co2_saved: Decimal,
    pub trees_equivalent: Decimal,
}

impl MarketplaceSummary {
    /// # Errors
    ///
    /// [`EstimatorError::Overflow`] when a total exceeds the `Decimal` range.
    pub fn from_projects(projects: &[Project]) -> Result<Self, EstimatorError> {
        let funded_count = projects.iter().filter(|p| p.is_funded()).count();
        let investor_names: HashSet<&str> = projects
            .iter()
            .flat_map(|p| p.investors.iter().map(|inv| inv.name.as_str()))
            .collect();
        let total_co2 = checked_total(projects.iter().map(|p| p.annual_co2_saved))?;

        Ok(Self {
            project_count: projects.len(),
            funding_count: projects.len() - funded_count,
            funded_count,
            total_funding: checked_total(projects.iter().map(|p| p.current_funding))?,
            total_goal: checked_total(projects.iter().map(|p| p.goal_amount))?,
            unique_investors: investor_names.len(),
            total_co2_saved: round_dp(total_co2, 1),
            trees_equivalent: trees_for_tons(total_co2)?,
        })
    }

    /// Overall funding progress across the marketplace, as a percentage.
    pub fn funding_percent(&self) -> Decimal {
        if self.total_goal.is_zero() {
            return Decimal::ZERO;
        }
        self.total_funding / self.total_goal * Decimal::ONE_HUNDRED
    }
}

fn checked_total(mut values: impl Iterator<Item = Decimal>) -> Result<Decimal, EstimatorError> {
    values.try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or(EstimatorError::Overflow)
    })
}

/// One investment on the cumulative funding chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingPoint {
    pub date: DateTime<Utc>,
    pub project_name: String,
    pub investment: Decimal,
    /// Running total including this investment.
    pub cumulative: Decimal,
}

/// Every recorded investment, oldest first, with a running total.
///
/// Investments sharing a timestamp keep collection order.
pub fn funding_timeline(projects: &[Project]) -> Vec<FundingPoint> {
    let mut investments: Vec<_> = projects
        .iter()
        .flat_map(|p| p.investors.iter().map(move |inv| (p, inv)))
        .collect();
    investments.sort_by_key(|(_, inv)| inv.date);

    let mut cumulative = Decimal::ZERO;
    investments
        .into_iter()
        .map(|(project, inv)| {
            cumulative += inv.amount;
            FundingPoint {
                date: inv.date,
                project_name: project.project_name.clone(),
                investment: inv.amount,
                cumulative,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Investment, NewProject};

    fn project(
        id: i64,
        name: &str,
        location: &str,
        goal: Decimal,
    ) -> Project {
        Project::from_new(
            id,
            NewProject {
                project_name: name.to_string(),
                location: location.to_string(),
                address: "1 Main St".to_string(),
                roof_size: dec!(1000),
                goal_amount: goal,
                system_size: dec!(5.0),
                roi: dec!(4.5),
                monthly_savings: dec!(94),
                annual_co2_saved: dec!(7.5),
                submitted_at: None,
            },
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn invest(
        project: &mut Project,
        name: &str,
        amount: Decimal,
        date: DateTime<Utc>,
    ) {
        project.investors.push(Investment {
            name: name.to_string(),
            amount,
            date,
        });
        project.current_funding += amount;
    }

    fn sample() -> Vec<Project> {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mut lincoln = project(1, "Lincoln Park Solar Initiative", "Chicago, IL", dec!(18000));
        let mut suburban = project(2, "Suburban Green Energy", "Evanston, IL", dec!(22000));
        let south = project(3, "South Side Solar", "Chicago, IL", dec!(15000));

        invest(&mut lincoln, "Alice", dec!(18000), base + Duration::days(2));
        invest(&mut suburban, "Bob", dec!(1000), base);
        invest(&mut suburban, "Alice", dec!(500), base + Duration::days(1));

        vec![lincoln, suburban, south]
    }

    // =========================================================================
    // StatusFilter tests
    // =========================================================================

    #[test]
    fn status_filter_parses_case_insensitively() {
        assert_eq!(StatusFilter::parse("Funded"), Some(StatusFilter::Funded));
        assert_eq!(StatusFilter::parse(" all "), Some(StatusFilter::All));
        assert_eq!(StatusFilter::parse("paused"), None);
        assert!("paused".parse::<StatusFilter>().is_err());
    }

    // =========================================================================
    // ProjectFilter tests
    // =========================================================================

    #[test]
    fn default_filter_matches_everything() {
        let projects = sample();

        assert_eq!(ProjectFilter::default().apply(&projects).len(), 3);
    }

    #[test]
    fn search_matches_name_or_location_ignoring_case() {
        let projects = sample();

        let by_location = ProjectFilter::new(StatusFilter::All, "evanston").apply(&projects);
        let by_name = ProjectFilter::new(StatusFilter::All, "SOUTH SIDE").apply(&projects);

        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].id, 2);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, 3);
    }

    #[test]
    fn status_filter_splits_funding_and_funded() {
        let projects = sample();

        let funded = ProjectFilter::new(StatusFilter::Funded, "").apply(&projects);
        let funding = ProjectFilter::new(StatusFilter::Funding, "").apply(&projects);

        assert_eq!(funded.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(funding.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn search_and_status_combine() {
        let projects = sample();

        let result = ProjectFilter::new(StatusFilter::Funding, "chicago").apply(&projects);

        assert_eq!(result.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3]);
    }

    // =========================================================================
    // MarketplaceSummary tests
    // =========================================================================

    #[test]
    fn summary_aggregates_projects() {
        let summary = MarketplaceSummary::from_projects(&sample()).unwrap();

        assert_eq!(
            summary,
            MarketplaceSummary {
                project_count: 3,
                funding_count: 2,
                funded_count: 1,
                total_funding: dec!(19500),
                total_goal: dec!(55000),
                unique_investors: 2,
                total_co2_saved: dec!(22.5),
                trees_equivalent: dec!(1125),
            }
        );
    }

    #[test]
    fn summary_of_empty_marketplace_is_zero() {
        let summary = MarketplaceSummary::from_projects(&[]).unwrap();

        assert_eq!(summary, MarketplaceSummary::default());
        assert_eq!(summary.funding_percent(), Decimal::ZERO);
    }

    #[test]
    fn summary_reports_overflow_instead_of_panicking() {
        let mut projects = sample();
        projects[0].annual_co2_saved = Decimal::MAX;
        projects[1].annual_co2_saved = Decimal::MAX;

        assert_eq!(
            MarketplaceSummary::from_projects(&projects),
            Err(EstimatorError::Overflow)
        );
    }

    #[test]
    fn summary_reports_tree_overflow() {
        let mut projects = sample();
        projects.truncate(1);
        projects[0].annual_co2_saved = Decimal::MAX;

        assert_eq!(
            MarketplaceSummary::from_projects(&projects),
            Err(EstimatorError::Overflow)
        );
    }

    // =========================================================================
    // funding_timeline tests
    // =========================================================================

    #[test]
    fn timeline_is_sorted_and_cumulative() {
        let timeline = funding_timeline(&sample());

        let amounts: Vec<_> = timeline.iter().map(|p| (p.investment, p.cumulative)).collect();
        assert_eq!(
            amounts,
            vec![
                (dec!(1000), dec!(1000)),
                (dec!(500), dec!(1500)),
                (dec!(18000), dec!(19500)),
            ]
        );
        assert_eq!(timeline[0].project_name, "Suburban Green Energy");
        assert_eq!(timeline[2].project_name, "Lincoln Park Solar Initiative");
    }

    #[test]
    fn timeline_is_empty_without_investments() {
        let projects = vec![project(1, "Quiet Roof", "Chicago, IL", dec!(9000))];

        assert!(funding_timeline(&projects).is_empty());
    }
}
