//! Configuration for the replication channel and its transport.
//!
//! Hierarchical loading with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`RAFTEX__` prefix, highest priority)
//! - Component-wise validation
mod network;
mod replication;

pub use network::*;
pub use replication::*;


use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RaftexConfig {
    /// Channel batching, backpressure, and RPC deadline parameters
    pub replication: ReplicationConfig,
    /// gRPC/HTTP2 connection parameters
    pub network: NetworkConfig,
}

impl RaftexConfig {
    /// Loads configuration with hierarchical override support.
    ///
    /// Sources are merged in order, later ones overriding earlier ones:
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file named by the `CONFIG_PATH` environment variable
    /// 3. Environment variables with `RAFTEX__` prefix (highest priority)
    ///
    /// # Example
    /// ```ignore
    /// std::env::set_var("RAFTEX__REPLICATION__MAX_BATCH", "64");
    /// let cfg = RaftexConfig::new()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("RAFTEX")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all subsystem configurations.
    pub fn validate(&self) -> Result<()> {
        self.replication.validate()?;
        self.network.validate()?;
        Ok(())
    }
}
