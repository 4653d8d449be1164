use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use parking_lot::RwLock;

use super::Wal;
use super::WalEntry;
use crate::core::LogId;
use crate::core::TermId;

/// In-memory wal keyed by log id.
///
/// Backs unit tests and embedded single-process setups; production partitions
/// use [`super::SledWal`].
#[derive(Debug, Default)]
pub struct MemoryWal {
    entries: RwLock<BTreeMap<LogId, WalEntry>>,
}

impl MemoryWal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entry: WalEntry) {
        self.entries.write().insert(entry.log_id, entry);
    }

    pub fn append_batch(&self, batch: Vec<WalEntry>) {
        let mut entries = self.entries.write();
        for entry in batch {
            entries.insert(entry.log_id, entry);
        }
    }

    /// Drops every entry below `log_id`, simulating log compaction.
    pub fn purge_before(&self, log_id: LogId) {
        self.entries.write().retain(|id, _| *id >= log_id);
    }
}

impl Wal for MemoryWal {
    fn first_log_id(&self) -> LogId {
        self.entries
            .read()
            .keys()
            .next()
            .copied()
            .unwrap_or_default()
    }

    fn last_log_id(&self) -> LogId {
        self.entries
            .read()
            .keys()
            .next_back()
            .copied()
            .unwrap_or_default()
    }

    fn entry_term(&self, log_id: LogId) -> Option<TermId> {
        self.entries.read().get(&log_id).map(|e| e.term)
    }

    fn entries_between(&self, range: RangeInclusive<LogId>) -> Vec<WalEntry> {
        self.entries.read().range(range).map(|(_, e)| e.clone()).collect()
    }
}
