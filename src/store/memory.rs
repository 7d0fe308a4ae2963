use crate::core::ledger::{ContributionLedger, ContributionRecord};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory ledger; contents live as long as the value.
#[derive(Default)]
pub struct MemoryLedger {
    records: Arc<Mutex<BTreeMap<u64, ContributionRecord>>>,
    last_id: AtomicU64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContributionLedger for MemoryLedger {
    async fn load(&self, account: &str) -> Result<Vec<ContributionRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .values()
            .filter(|record| record.account == account)
            .cloned()
            .collect())
    }

    async fn save(&self, record: &ContributionRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        debug!("Ledger PUT for contribution: {}", record.id);
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn next_id(&self) -> Result<u64> {
        Ok(self.last_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
