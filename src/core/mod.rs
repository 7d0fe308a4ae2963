//! Core business logic: the valuation engine and the interfaces it reads from

pub mod config;
pub mod error;
pub mod growth;
pub mod ledger;
pub mod log;
pub mod nav;
pub mod valuation;

// Re-export main types for cleaner imports
pub use error::ValuationError;
pub use growth::{GrowthContext, GrowthReport};
pub use ledger::{Contribution, ContributionLedger, ContributionRecord};
pub use nav::{PeriodMode, PricePoint, PriceSeries, PriceSeriesSource, SeriesRequest};
pub use valuation::DailyResult;
