//! Growth reports: contributions from the ledger valued over a fetched NAV series.

use super::config::FundConfig;
use super::error::ValuationError;
use super::ledger::{Contribution, ContributionLedger, ContributionRecord};
use super::nav::{PricePoint, PriceSeriesSource, SeriesRequest};
use super::valuation::{self, DailyResult};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

/// Projection of a valuation run for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct GrowthReport {
    pub fund_id: u32,
    pub product_name: String,
    pub total_principal: Decimal,
    pub contributions: Vec<ContributionRecord>,
    pub rows: Vec<DailyResult>,
}

impl GrowthReport {
    pub fn latest(&self) -> Option<&DailyResult> {
        self.rows.last()
    }
}

/// Where a run reads its inputs from.
pub struct GrowthContext<'a> {
    pub ledger: &'a dyn ContributionLedger,
    pub source: &'a dyn PriceSeriesSource,
    pub funds: &'a [FundConfig],
    pub account: &'a str,
}

impl GrowthContext<'_> {
    pub fn fund(&self, fund_id: u32) -> Result<&FundConfig, ValuationError> {
        self.funds
            .iter()
            .find(|fund| fund.id == fund_id)
            .ok_or_else(|| ValuationError::invalid(format!("mutual fund {fund_id} is not configured")))
    }

    /// Fetches the series from one day before `first_date` so that a baseline
    /// price precedes the first contribution.
    async fn fetch_points(
        &self,
        fund: &FundConfig,
        first_date: NaiveDate,
        end: NaiveDate,
    ) -> Result<(String, Vec<PricePoint>), ValuationError> {
        let start = first_date - Duration::days(1);
        let request = SeriesRequest::new(fund.pid, start, end);
        request.validate()?;

        let series = self.source.fetch_series(&request).await?;
        if series.points.is_empty() {
            return Err(ValuationError::NoDataInRange { start, end });
        }

        let points = series.parse_points();
        debug!(
            "Parsed {} of {} NAV rows for {}",
            points.len(),
            series.points.len(),
            series.product_name
        );
        Ok((series.product_name, points))
    }

    /// Values one contribution on its own up to `end`.
    pub async fn contribution_growth(
        &self,
        id: u64,
        end: NaiveDate,
    ) -> Result<GrowthReport, ValuationError> {
        let record = self
            .ledger
            .get(self.account, id)
            .await?
            .ok_or(ValuationError::ContributionNotFound(id))?;
        let fund = self.fund(record.fund_id)?;
        info!("Valuing contribution {} in {}", id, fund.name);

        let (product_name, points) = self.fetch_points(fund, record.date, end).await?;
        let rows = valuation::value_single(record.amount, &points);

        Ok(GrowthReport {
            fund_id: fund.id,
            product_name,
            total_principal: record.amount,
            contributions: vec![record],
            rows,
        })
    }

    /// Values every active contribution of the account in one fund up to `end`.
    pub async fn fund_growth(
        &self,
        fund_id: u32,
        end: NaiveDate,
    ) -> Result<GrowthReport, ValuationError> {
        let fund = self.fund(fund_id)?;
        let records = self.ledger.list_active(self.account, fund_id).await?;
        let Some(first) = records.first() else {
            return Err(ValuationError::invalid(format!(
                "no contributions recorded for {}",
                fund.name
            )));
        };
        info!("Valuing {} contributions in {}", records.len(), fund.name);

        let (product_name, points) = self.fetch_points(fund, first.date, end).await?;
        let contributions: Vec<Contribution> =
            records.iter().map(ContributionRecord::contribution).collect();
        let rows = valuation::aggregate(&contributions, &points);
        let total_principal: Decimal = contributions.iter().map(|c| c.amount).sum();

        Ok(GrowthReport {
            fund_id,
            product_name,
            total_principal,
            contributions: records,
            rows,
        })
    }
}
