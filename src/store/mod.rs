pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::ledger::ContributionLedger;
use anyhow::Result;
use disk::DiskLedger;
use std::sync::Arc;

/// Opens the persistent ledger under the configured data path.
pub fn open_ledger(config: &AppConfig) -> Result<Arc<dyn ContributionLedger>> {
    let path = config.data_path()?.join("ledger");
    Ok(Arc::new(DiskLedger::open(&path)?))
}
