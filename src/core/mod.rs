//! Leader-side replication core: one [`FollowerChannel`] per remote peer.
mod follower_channel;
mod partition;
mod promise;

pub use follower_channel::*;
pub use partition::*;
pub use promise::*;


/// Monotonically increasing log entry identifier.
pub type LogId = u64;

/// Election term a log entry was created under.
pub type TermId = u64;
