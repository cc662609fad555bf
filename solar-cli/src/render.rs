//! Plain-text views of store data, one `Display` type per command.

use std::fmt;

use chrono::Local;
use rust_decimal::Decimal;
use solar_core::Project;
use solar_core::calculations::{
    Co2Savings, FundingPoint, InvestorPortfolio, MarketplaceSummary, RoiEstimate,
    calculate_co2_savings,
};

use crate::utils::{format_percent, format_usd};

const NAME_WIDTH: usize = 32;
const LOCATION_WIDTH: usize = 16;

fn truncate(
    text: &str,
    width: usize,
) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// The investor dashboard listing.
pub struct ProjectTable<'a> {
    pub projects: Vec<&'a Project>,
    /// Shown in place of the table when `projects` is empty.
    pub empty_message: &'static str,
}

impl fmt::Display for ProjectTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.projects.is_empty() {
            return writeln!(f, "{}", self.empty_message);
        }

        writeln!(
            f,
            "{:<15} {:<NAME_WIDTH$} {:<LOCATION_WIDTH$} {:>10} {:>10} {:>7} {:>6}  STATUS",
            "ID", "PROJECT", "LOCATION", "FUNDED", "GOAL", "PROG", "ROI"
        )?;
        for p in &self.projects {
            writeln!(
                f,
                "{:<15} {:<NAME_WIDTH$} {:<LOCATION_WIDTH$} {:>10} {:>10} {:>7} {:>6}  {}",
                p.id,
                truncate(&p.project_name, NAME_WIDTH),
                truncate(&p.location, LOCATION_WIDTH),
                format_usd(p.current_funding),
                format_usd(p.goal_amount),
                format_percent(p.funding_percent()),
                format_percent(p.roi),
                p.funding_status().as_str(),
            )?;
        }
        write!(f, "{} project(s)", self.projects.len())
    }
}

/// Everything known about one project.
pub struct ProjectDetail<'a>(pub &'a Project);

impl fmt::Display for ProjectDetail<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let p = self.0;

        writeln!(f, "{} (#{})", p.project_name, p.id)?;
        writeln!(f, "  {}, {}", p.address, p.location)?;
        writeln!(
            f,
            "  Listed {}",
            p.submitted_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "  Funding   {} of {} ({}), {} remaining [{}]",
            format_usd(p.current_funding),
            format_usd(p.goal_amount),
            format_percent(p.funding_percent()),
            format_usd(p.remaining_funding()),
            p.funding_status().as_str(),
        )?;
        writeln!(f, "  System    {} kW on {} sq ft", p.system_size, p.roof_size)?;
        writeln!(f, "  ROI       {} per year", format_percent(p.roi))?;
        writeln!(f, "  Savings   {}/month for the homeowner", format_usd(p.monthly_savings))?;
        match calculate_co2_savings(p.system_size) {
            Ok(co2) => writeln!(
                f,
                "  CO₂       {} t/year, {} t over 25 years, {} trees",
                p.annual_co2_saved, co2.lifetime_25_years, co2.trees_equivalent
            )?,
            Err(_) => writeln!(f, "  CO₂       {} t/year", p.annual_co2_saved)?,
        }

        if p.investors.is_empty() {
            return write!(f, "\n  No investors yet.");
        }
        writeln!(f, "\n  Investors ({}):", p.investors.len())?;
        for inv in &p.investors {
            writeln!(
                f,
                "    {}  {:<24} {:>10}",
                inv.date.with_timezone(&Local).format("%Y-%m-%d"),
                truncate(&inv.name, 24),
                format_usd(inv.amount)
            )?;
        }
        Ok(())
    }
}

/// Confirmation after a new listing.
pub struct ListingReceipt<'a>(pub &'a Project);

impl fmt::Display for ListingReceipt<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let p = self.0;
        writeln!(f, "Listed \"{}\" as project #{}.", p.project_name, p.id)?;
        write!(
            f,
            "Estimated {} kW system, {} ROI, {}/month savings, {} t CO₂/year.",
            p.system_size,
            format_percent(p.roi),
            format_usd(p.monthly_savings),
            p.annual_co2_saved
        )
    }
}

/// Confirmation after an investment.
pub struct InvestmentReceipt<'a> {
    pub project: &'a Project,
    pub investor: &'a str,
    pub amount: Decimal,
}

impl fmt::Display for InvestmentReceipt<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let p = self.project;
        writeln!(
            f,
            "{} invested {} in \"{}\".",
            self.investor,
            format_usd(self.amount),
            p.project_name
        )?;
        if p.is_funded() {
            write!(f, "The project is now fully funded at {}.", format_usd(p.current_funding))
        } else {
            write!(
                f,
                "Funding is at {} of {} ({}); {} still needed.",
                format_usd(p.current_funding),
                format_usd(p.goal_amount),
                format_percent(p.funding_percent()),
                format_usd(p.remaining_funding())
            )
        }
    }
}

pub struct PortfolioView<'a>(pub &'a InvestorPortfolio);

impl fmt::Display for PortfolioView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let portfolio = self.0;
        if portfolio.is_empty() {
            return write!(f, "{} has no investments yet.", portfolio.investor);
        }

        writeln!(f, "Portfolio for {}", portfolio.investor)?;
        writeln!(
            f,
            "  {:<NAME_WIDTH$} {:>10} {:>6} {:>12}",
            "PROJECT", "INVESTED", "ROI", "PER YEAR"
        )?;
        for h in &portfolio.holdings {
            writeln!(
                f,
                "  {:<NAME_WIDTH$} {:>10} {:>6} {:>12}",
                truncate(&h.project_name, NAME_WIDTH),
                format_usd(h.invested),
                format_percent(h.roi),
                format_usd(h.annual_return)
            )?;
        }
        write!(
            f,
            "{} invested across {} project(s), projected {} per year.",
            format_usd(portfolio.total_invested),
            portfolio.project_count(),
            format_usd(portfolio.projected_annual_return)
        )
    }
}

pub struct SummaryView<'a>(pub &'a MarketplaceSummary);

impl fmt::Display for SummaryView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = self.0;
        writeln!(
            f,
            "Projects        {} ({} funding, {} funded)",
            s.project_count, s.funding_count, s.funded_count
        )?;
        writeln!(
            f,
            "Funding raised  {} of {} ({})",
            format_usd(s.total_funding),
            format_usd(s.total_goal),
            format_percent(s.funding_percent())
        )?;
        writeln!(f, "Investors       {}", s.unique_investors)?;
        write!(
            f,
            "CO₂ avoided     {} t/year, like {} trees",
            s.total_co2_saved, s.trees_equivalent
        )
    }
}

pub struct TimelineView<'a>(pub &'a [FundingPoint]);

impl fmt::Display for TimelineView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No investments yet.");
        }

        writeln!(
            f,
            "{:<16} {:<NAME_WIDTH$} {:>10} {:>12}",
            "DATE", "PROJECT", "AMOUNT", "CUMULATIVE"
        )?;
        for point in self.0 {
            writeln!(
                f,
                "{:<16} {:<NAME_WIDTH$} {:>10} {:>12}",
                point.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                truncate(&point.project_name, NAME_WIDTH),
                format_usd(point.investment),
                format_usd(point.cumulative)
            )?;
        }
        Ok(())
    }
}

/// Output of `estimate`.
pub struct EstimateView {
    pub goal_amount: Decimal,
    pub system_size: Decimal,
    pub roi: RoiEstimate,
    pub co2: Co2Savings,
}

impl fmt::Display for EstimateView {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Funding goal     {}", format_usd(self.goal_amount))?;
        writeln!(f, "System size      {} kW", self.system_size)?;
        writeln!(f, "Investor ROI     {} per year", format_percent(self.roi.roi))?;
        writeln!(f, "Investor return  {} per year", format_usd(self.roi.annual_return))?;
        writeln!(
            f,
            "Homeowner saves  {} per year ({}/month)",
            format_usd(self.roi.annual_savings),
            format_usd(self.roi.monthly_savings)
        )?;
        writeln!(f, "Payback          {} years", self.roi.payback_years)?;
        write!(
            f,
            "CO₂ avoided      {} t/year, {} t over 25 years, {} trees",
            self.co2.annual, self.co2.lifetime_25_years, self.co2.trees_equivalent
        )
    }
}
