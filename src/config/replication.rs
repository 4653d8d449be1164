use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Tunables for the per-follower replication channel.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReplicationConfig {
    /// Max number of log entries in each AppendLog request batch.
    /// Default: 128
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,

    /// Max number of submitters allowed to wait on one coalesced request
    /// before new submissions are rejected with E_TOO_MANY_REQUESTS.
    /// Default: 1024
    #[serde(default = "default_max_outstanding")]
    pub max_outstanding: usize,

    /// Per-RPC deadline in milliseconds; expiry surfaces as a transport
    /// exception. Default: 500ms
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_ms: u64,
}

impl ReplicationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_batch == 0 {
            return Err(ConfigError::Message("replication.max_batch must be > 0".into()).into());
        }

        if self.max_outstanding == 0 {
            return Err(
                ConfigError::Message("replication.max_outstanding must be > 0".into()).into(),
            );
        }

        if self.rpc_timeout_ms == 0 {
            return Err(
                ConfigError::Message("replication.rpc_timeout_ms must be > 0".into()).into(),
            );
        }

        Ok(())
    }
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            max_batch: default_max_batch(),
            max_outstanding: default_max_outstanding(),
            rpc_timeout_ms: default_rpc_timeout(),
        }
    }
}

fn default_max_batch() -> usize {
    128
}

fn default_max_outstanding() -> usize {
    1024
}

// in ms
fn default_rpc_timeout() -> u64 {
    500
}
