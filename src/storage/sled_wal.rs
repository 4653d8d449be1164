use std::ops::RangeInclusive;
use std::path::Path;

use prost::Message;
use sled::Batch;
use sled::IVec;
use tracing::error;
use tracing::info;

use super::Wal;
use super::WalEntry;
use crate::core::LogId;
use crate::core::TermId;
use crate::Result;
use crate::StorageError;

const WAL_TREE: &str = "_raftex_wal";

/// Sled-backed wal adapter.
///
/// Keys are big-endian log ids so sled's byte order matches log order and
/// range scans walk entries in id order. Values are prost-encoded
/// [`WalEntry`] records.
#[derive(Debug)]
pub struct SledWal {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledWal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path).map_err(StorageError::Sled)?;
        let tree = db.open_tree(WAL_TREE).map_err(StorageError::Sled)?;
        Ok(Self { db, tree })
    }

    pub fn append(&self, entry: &WalEntry) -> Result<()> {
        self.tree
            .insert(entry.log_id.to_be_bytes(), entry.encode_to_vec())
            .map_err(StorageError::Sled)?;
        Ok(())
    }

    pub fn append_batch(&self, entries: &[WalEntry]) -> Result<()> {
        let mut batch = Batch::default();
        for entry in entries {
            batch.insert(entry.log_id.to_be_bytes().to_vec(), entry.encode_to_vec());
        }
        self.tree.apply_batch(batch).map_err(StorageError::Sled)?;
        Ok(())
    }

    /// Removes every entry below `log_id`. Used after snapshotting.
    pub fn purge_before(&self, log_id: LogId) -> Result<()> {
        let mut batch = Batch::default();
        for item in self.tree.range(..log_id.to_be_bytes().to_vec()) {
            let (key, _) = item.map_err(StorageError::Sled)?;
            batch.remove(key);
        }
        self.tree.apply_batch(batch).map_err(StorageError::Sled)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.tree.flush().map_err(StorageError::Sled)?;
        Ok(())
    }

    fn decode(log_id: LogId, value: &IVec) -> std::result::Result<WalEntry, StorageError> {
        WalEntry::decode(value.as_ref()).map_err(|e| StorageError::Corrupt {
            log_id,
            reason: e.to_string(),
        })
    }

    fn boundary_log_id(item: Option<(IVec, IVec)>) -> LogId {
        item.map(|(key, _)| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(key.as_ref());
            u64::from_be_bytes(raw)
        })
        .unwrap_or_default()
    }
}

impl Drop for SledWal {
    fn drop(&mut self) {
        match self.db.flush() {
            Ok(_) => info!("wal flushed on drop"),
            Err(e) => error!(?e, "failed to flush wal on drop"),
        }
    }
}

impl Wal for SledWal {
    fn first_log_id(&self) -> LogId {
        Self::boundary_log_id(self.tree.first().ok().flatten())
    }

    fn last_log_id(&self) -> LogId {
        Self::boundary_log_id(self.tree.last().ok().flatten())
    }

    fn entry_term(&self, log_id: LogId) -> Option<TermId> {
        let value = self.tree.get(log_id.to_be_bytes()).ok().flatten()?;
        Self::decode(log_id, &value).ok().map(|e| e.term)
    }

    fn entries_between(&self, range: RangeInclusive<LogId>) -> Vec<WalEntry> {
        let from = range.start().to_be_bytes().to_vec();
        let to = range.end().to_be_bytes().to_vec();
        self.tree
            .range(from..=to)
            .filter_map(|res| {
                res.ok().and_then(|(key, value)| {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(key.as_ref());
                    match Self::decode(u64::from_be_bytes(raw), &value) {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            error!(?e, "skipping undecodable wal entry");
                            None
                        }
                    }
                })
            })
            .collect()
    }
}
