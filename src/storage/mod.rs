//! Core model: the write-ahead log the channel replicates from.
//!
//! The channel is a pure consumer: it reads inclusive log-id ranges while
//! holding its own lock, so implementations must serve `entries_between`
//! without blocking on I/O longer than a local read.
mod mem_wal;
mod sled_wal;

pub use mem_wal::*;
pub use sled_wal::*;


use std::ops::RangeInclusive;

#[cfg(test)]
use mockall::automock;

use crate::core::LogId;
use crate::core::TermId;

/// One record in the leader's wal.
///
/// Doubles as the on-disk representation for the sled adapter, hence the
/// prost derive.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WalEntry {
    #[prost(uint64, tag = "1")]
    pub log_id: u64,
    #[prost(uint64, tag = "2")]
    pub term: u64,
    /// Origin cluster of the record, carried opaquely to followers.
    #[prost(uint64, tag = "3")]
    pub cluster: u64,
    #[prost(bytes = "bytes", tag = "4")]
    pub payload: ::prost::bytes::Bytes,
}

#[cfg_attr(test, automock)]
pub trait Wal: Send + Sync + 'static {
    /// Oldest log id still retained, or 0 on an empty wal.
    fn first_log_id(&self) -> LogId;

    /// Newest log id, or 0 on an empty wal.
    fn last_log_id(&self) -> LogId;

    /// Term of the entry at `log_id`, if retained.
    fn entry_term(&self, log_id: LogId) -> Option<TermId>;

    /// All retained entries within the inclusive range, in log-id order.
    /// Ids outside the retained window are silently absent; an empty result
    /// over a non-empty request range means the range was compacted away.
    fn entries_between(&self, range: RangeInclusive<LogId>) -> Vec<WalEntry>;
}
