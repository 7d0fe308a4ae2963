//! NAV series abstractions and core types

use super::error::ValuationError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Period mode understood by the price source. `Custom` honours the explicit
/// start and end dates of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PeriodMode {
    #[default]
    Custom,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    ThreeYears,
    FiveYears,
}

impl Display for PeriodMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PeriodMode::Custom => "custom",
                PeriodMode::OneMonth => "1m",
                PeriodMode::ThreeMonths => "3m",
                PeriodMode::SixMonths => "6m",
                PeriodMode::OneYear => "1y",
                PeriodMode::ThreeYears => "3y",
                PeriodMode::FiveYears => "5y",
            }
        )
    }
}

impl FromStr for PeriodMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "custom" => Ok(PeriodMode::Custom),
            "1m" => Ok(PeriodMode::OneMonth),
            "3m" => Ok(PeriodMode::ThreeMonths),
            "6m" => Ok(PeriodMode::SixMonths),
            "1y" => Ok(PeriodMode::OneYear),
            "3y" => Ok(PeriodMode::ThreeYears),
            "5y" => Ok(PeriodMode::FiveYears),
            _ => Err(anyhow::anyhow!("Invalid period mode: {}", s)),
        }
    }
}

/// One published price of a fund unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        Self { date, price }
    }
}

/// A price row exactly as the source published it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawNav {
    pub date: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    pub product_name: String,
    pub points: Vec<RawNav>,
}

impl PriceSeries {
    /// Parses the raw rows into an ascending series.
    ///
    /// Rows with an unparsable date or price are dropped, never zero-filled.
    /// When a date repeats, the first row published for it wins.
    pub fn parse_points(&self) -> Vec<PricePoint> {
        let mut points: Vec<PricePoint> = self
            .points
            .iter()
            .filter_map(|raw| {
                let date = NaiveDate::parse_from_str(raw.date.trim(), DATE_FORMAT);
                let price = raw.value.trim().parse::<Decimal>();
                match (date, price) {
                    (Ok(date), Ok(price)) => Some(PricePoint::new(date, price)),
                    _ => {
                        debug!(
                            "Skipping unparsable NAV row for {}: date='{}' value='{}'",
                            self.product_name, raw.date, raw.value
                        );
                        None
                    }
                }
            })
            .collect();

        points.sort_by_key(|point| point.date);
        points.dedup_by_key(|point| point.date);
        points
    }
}

/// Parameters of one price series fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub pid: u32,
    pub period: PeriodMode,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeriesRequest {
    pub fn new(pid: u32, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            pid,
            period: PeriodMode::Custom,
            start,
            end,
        }
    }

    pub fn with_period(mut self, period: PeriodMode) -> Self {
        self.period = period;
        self
    }

    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.pid == 0 {
            return Err(ValuationError::invalid("fund identifier must be non-zero"));
        }
        if self.start > self.end {
            return Err(ValuationError::invalid(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

#[async_trait]
pub trait PriceSeriesSource: Send + Sync {
    async fn fetch_series(&self, request: &SeriesRequest) -> Result<PriceSeries, ValuationError>;
}
