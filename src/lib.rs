//! # raftex
//!
//! The leader-side per-follower replication pipeline of a partitioned,
//! Raft-style replicated log: one long-lived channel per `(partition, peer)`
//! that turns bursts of leader submissions into a bounded stream of
//! `AppendLog` RPCs.
//!
//! ## Features
//! - **Coalescing**: submissions arriving while an RPC is in flight collapse
//!   into a single follow-up request; all of them share its outcome
//! - **Gap catch-up**: a follower reporting `E_LOG_GAP` is re-fed from its
//!   actual tail without bothering the submitter
//! - **Bounded batches**: per-RPC entry caps and a single term per batch
//! - **Backpressure**: waiter counts are bounded, excess submissions are
//!   rejected synchronously
//! - **Clean teardown**: `pause`/`resume` on leadership changes, `stop` +
//!   `wait_for_stop` for shutdown
//!
//! ## Quick Start
//! ```no_run
//! use std::sync::Arc;
//!
//! use raftex::FollowerChannel;
//! use raftex::GrpcTransport;
//! use raftex::NodeAddr;
//! use raftex::PartitionContext;
//! use raftex::RaftexConfig;
//! use raftex::RaftexTypeConfig;
//! use raftex::SledWal;
//!
//! #[tokio::main]
//! async fn main() -> raftex::Result<()> {
//!     let config = RaftexConfig::new()?;
//!     let wal = Arc::new(SledWal::open("/tmp/part-7-wal")?);
//!     let transport = Arc::new(GrpcTransport::new(config.network.clone()));
//!
//!     let ctx = PartitionContext::<RaftexTypeConfig>::new(
//!         1,
//!         7,
//!         NodeAddr::new("10.0.0.1", 9779),
//!         wal,
//!         transport,
//!         config.replication.clone(),
//!     );
//!     let channel = FollowerChannel::new(ctx, NodeAddr::new("10.0.0.2", 9780), false);
//!
//!     let resp = channel.append_logs(2, 7, 5, 2, 5)?.await?;
//!     println!("follower acked up to {}", resp.last_log_id);
//!
//!     channel.stop();
//!     channel.wait_for_stop().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod proto;

mod core;
mod errors;
mod network;
mod storage;
mod type_config;

pub use config::*;
pub use core::*;
pub use errors::*;
pub use network::*;
pub use storage::*;
pub use type_config::*;

//-----------------------------------------------------------
// Test utils
#[cfg(test)]
#[doc(hidden)]
pub mod test_utils;

//-----------------------------------------------------------
// Autometrics
/// autometrics: https://docs.autometrics.dev/rust/adding-alerts-and-slos
use autometrics::objectives::Objective;
use autometrics::objectives::ObjectiveLatency;
use autometrics::objectives::ObjectivePercentile;

#[doc(hidden)]
const API_SLO: Objective = Objective::new("api")
    .success_rate(ObjectivePercentile::P99_9)
    .latency(ObjectiveLatency::Ms10, ObjectivePercentile::P99);
