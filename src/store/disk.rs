use crate::core::ledger::{ContributionLedger, ContributionRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

const NEXT_ID_KEY: &[u8] = b"next_id";

/// Ledger persisted in a fjall keyspace.
///
/// Records are stored as JSON under their big-endian id in the `contributions`
/// partition; the id sequence lives in the `meta` partition.
pub struct DiskLedger {
    keyspace: Keyspace,
    records: PartitionHandle,
    meta: PartitionHandle,
    id_lock: Mutex<()>,
}

impl DiskLedger {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create ledger directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open ledger at {}", path.display()))?;
        let records = keyspace.open_partition("contributions", PartitionCreateOptions::default())?;
        let meta = keyspace.open_partition("meta", PartitionCreateOptions::default())?;
        debug!("Opened ledger at {}", path.display());

        Ok(Self {
            keyspace,
            records,
            meta,
            id_lock: Mutex::new(()),
        })
    }

    fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist ledger")
    }
}

#[async_trait]
impl ContributionLedger for DiskLedger {
    async fn load(&self, account: &str) -> Result<Vec<ContributionRecord>> {
        let mut records = Vec::new();
        for item in self.records.iter() {
            let (_, value) = item?;
            let record: ContributionRecord =
                serde_json::from_slice(&value).context("Corrupt contribution record")?;
            if record.account == account {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn save(&self, record: &ContributionRecord) -> Result<()> {
        self.records
            .insert(record.id.to_be_bytes().as_slice(), serde_json::to_vec(record)?)?;
        self.persist()?;
        debug!("Ledger PUT for contribution: {}", record.id);
        Ok(())
    }

    async fn next_id(&self) -> Result<u64> {
        let _guard = self
            .id_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Ledger id lock poisoned"))?;

        let last = match self.meta.get(NEXT_ID_KEY)? {
            Some(bytes) => {
                let bytes = <[u8; 8]>::try_from(&bytes[..]).context("Corrupt id sequence")?;
                u64::from_be_bytes(bytes)
            }
            None => 0,
        };
        let id = last + 1;
        self.meta.insert(NEXT_ID_KEY, id.to_be_bytes().as_slice())?;
        self.persist()?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::NewContribution;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn new_contribution(date: &str) -> NewContribution {
        NewContribution {
            fund_id: 1,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount: dec!(1000.50),
        }
    }

    #[tokio::test]
    async fn test_disk_ledger_add_and_list() {
        let dir = tempdir().unwrap();
        let ledger = DiskLedger::open(dir.path()).unwrap();

        let first = ledger
            .add("alice", new_contribution("2024-01-02"))
            .await
            .unwrap();
        let second = ledger
            .add("alice", new_contribution("2024-01-01"))
            .await
            .unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        let listed = ledger.list_active("alice", 1).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, 2);
        assert_eq!(listed[0].amount, dec!(1000.50));
        assert!(ledger.list("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disk_ledger_survives_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let ledger = DiskLedger::open(dir.path()).unwrap();
            let record = ledger
                .add("alice", new_contribution("2024-01-02"))
                .await
                .unwrap();
            ledger.remove("alice", record.id).await.unwrap();
            ledger
                .add("alice", new_contribution("2024-01-03"))
                .await
                .unwrap()
                .id
        };

        let ledger = DiskLedger::open(dir.path()).unwrap();
        let listed = ledger.list("alice").await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(ledger.load("alice").await.unwrap().len(), 2);
        assert_eq!(ledger.next_id().await.unwrap(), id + 1);
    }
}
