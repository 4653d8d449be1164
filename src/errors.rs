//! Error hierarchy for the replication channel and its collaborators,
//! categorized by protocol layer and operational concerns.

use std::time::Duration;

use config::ConfigError;

use crate::core::LogId;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (network, storage)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Raft consensus protocol violations and failures
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    /// Log replication failures (Section 5.3 Raft paper)
    #[error(transparent)]
    Replication(#[from] ReplicationError),
}

#[derive(Debug, thiserror::Error)]
pub enum ReplicationError {
    /// The wal no longer holds the range the follower must receive next.
    /// Recovery requires a snapshot transfer, which this crate does not
    /// implement; the owning partition decides how to escalate.
    #[error("no wal entries in range [{from}, {to}]; follower needs a snapshot transfer")]
    SnapshotRequired { from: LogId, to: LogId },

    /// The channel was torn down before the submission resolved.
    #[error("append promise dropped before resolution")]
    ChannelDropped,
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Peer communication timeout
    #[error("rpc to {peer} timed out after {duration:?}")]
    Timeout { peer: String, duration: Duration },

    /// Persistent connection failures
    #[error("Socket connect failed error: {0}")]
    ConnectError(String),

    /// Malformed node addresses
    #[error("Invalid URI format: {0}")]
    InvalidUri(String),

    /// gRPC status returned by the peer's server stack
    #[error("rpc failed: {0}")]
    Rpc(#[from] tonic::Status),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Sled(#[from] sled::Error),

    /// A wal record that cannot be decoded back into an entry
    #[error("corrupt wal entry at log id {log_id}: {reason}")]
    Corrupt { log_id: LogId, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<NetworkError> for Error {
    fn from(err: NetworkError) -> Self {
        Error::System(SystemError::Network(err))
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::System(SystemError::Storage(err))
    }
}

impl From<ReplicationError> for Error {
    fn from(err: ReplicationError) -> Self {
        Error::Consensus(ConsensusError::Replication(err))
    }
}
