//! Contribution records and the ledger abstraction that stores them

use super::error::ValuationError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A capital injection as seen by the valuation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contribution {
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl Contribution {
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self { date, amount }
    }
}

/// A stored contribution of one account into one fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    pub id: u64,
    pub account: String,
    pub fund_id: u32,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ContributionRecord {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn contribution(&self) -> Contribution {
        Contribution::new(self.date, self.amount)
    }
}

#[derive(Debug, Clone)]
pub struct NewContribution {
    pub fund_id: u32,
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct ContributionUpdate {
    pub fund_id: Option<u32>,
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
}

fn ensure_positive(amount: Decimal) -> Result<(), ValuationError> {
    if amount <= Decimal::ZERO {
        return Err(ValuationError::invalid(format!(
            "contribution amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

/// Storage of contribution records.
///
/// Backends implement the three storage primitives; the record operations are
/// shared. Deletion is soft: removed records stay in storage with `deleted_at`
/// set and are hidden from every listing.
#[async_trait]
pub trait ContributionLedger: Send + Sync {
    /// All records of an account, deleted ones included.
    async fn load(&self, account: &str) -> Result<Vec<ContributionRecord>>;

    /// Inserts or replaces a record by id.
    async fn save(&self, record: &ContributionRecord) -> Result<()>;

    async fn next_id(&self) -> Result<u64>;

    async fn get(&self, account: &str, id: u64) -> Result<Option<ContributionRecord>, ValuationError> {
        Ok(self
            .load(account)
            .await?
            .into_iter()
            .find(|record| record.id == id && record.is_active()))
    }

    /// Active records across all funds, most recent date first.
    async fn list(&self, account: &str) -> Result<Vec<ContributionRecord>, ValuationError> {
        let mut records: Vec<_> = self
            .load(account)
            .await?
            .into_iter()
            .filter(ContributionRecord::is_active)
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Active records of one fund, oldest date first.
    async fn list_active(
        &self,
        account: &str,
        fund_id: u32,
    ) -> Result<Vec<ContributionRecord>, ValuationError> {
        let mut records: Vec<_> = self
            .load(account)
            .await?
            .into_iter()
            .filter(|record| record.fund_id == fund_id && record.is_active())
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn add(
        &self,
        account: &str,
        new: NewContribution,
    ) -> Result<ContributionRecord, ValuationError> {
        ensure_positive(new.amount)?;

        let now = Utc::now();
        let record = ContributionRecord {
            id: self.next_id().await?,
            account: account.to_string(),
            fund_id: new.fund_id,
            date: new.date,
            amount: new.amount,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.save(&record).await?;
        debug!(
            "Added contribution {} of {} on {} to fund {}",
            record.id, record.amount, record.date, record.fund_id
        );
        Ok(record)
    }

    async fn update(
        &self,
        account: &str,
        id: u64,
        update: ContributionUpdate,
    ) -> Result<ContributionRecord, ValuationError> {
        let mut record = self
            .get(account, id)
            .await?
            .ok_or(ValuationError::ContributionNotFound(id))?;

        if let Some(amount) = update.amount {
            ensure_positive(amount)?;
            record.amount = amount;
        }
        if let Some(date) = update.date {
            record.date = date;
        }
        if let Some(fund_id) = update.fund_id {
            record.fund_id = fund_id;
        }
        record.updated_at = Utc::now();

        self.save(&record).await?;
        debug!("Updated contribution {}", id);
        Ok(record)
    }

    async fn remove(&self, account: &str, id: u64) -> Result<(), ValuationError> {
        let mut record = self
            .get(account, id)
            .await?
            .ok_or(ValuationError::ContributionNotFound(id))?;

        let now = Utc::now();
        record.deleted_at = Some(now);
        record.updated_at = now;
        self.save(&record).await?;
        debug!("Removed contribution {}", id);
        Ok(())
    }
}
