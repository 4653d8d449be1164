use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Network communication configuration for gRPC/HTTP2 transport
///
/// Provides fine-grained control over low-level network parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkConfig {
    /// Timeout for establishing TCP connections in milliseconds
    /// Default: 50ms (suitable for LAN environments)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_in_ms: u64,

    /// Enable TCP_NODELAY to disable Nagle's algorithm
    /// Default: true (recommended for low-latency scenarios)
    #[serde(default = "default_tcp_nodelay")]
    pub tcp_nodelay: bool,

    /// TCP keepalive duration in seconds
    /// Default: 3600s (1 hour, OS may enforce minimum values)
    #[serde(default = "default_tcp_keepalive")]
    pub tcp_keepalive_in_secs: u64,

    /// HTTP2 keepalive ping interval in seconds
    /// Default: 300s (5 minutes)
    #[serde(default = "default_h2_keepalive_interval")]
    pub http2_keep_alive_interval_in_secs: u64,

    /// HTTP2 keepalive timeout in seconds
    /// Default: 20s (must be < interval)
    #[serde(default = "default_h2_keepalive_timeout")]
    pub http2_keep_alive_timeout_in_secs: u64,

    /// Initial connection-level flow control window in bytes
    /// Default: 12MB (12582912 bytes)
    #[serde(default = "default_conn_window_size")]
    pub initial_connection_window_size: u32,

    /// Initial per-stream flow control window in bytes
    /// Default: 2MB (2097152 bytes)
    #[serde(default = "default_stream_window_size")]
    pub initial_stream_window_size: u32,
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_in_ms == 0 {
            return Err(
                ConfigError::Message("network.connect_timeout_in_ms must be > 0".into()).into(),
            );
        }

        if self.http2_keep_alive_timeout_in_secs >= self.http2_keep_alive_interval_in_secs {
            return Err(ConfigError::Message(format!(
                "h2 keepalive timeout {}s should be less than interval {}s",
                self.http2_keep_alive_timeout_in_secs, self.http2_keep_alive_interval_in_secs
            ))
            .into());
        }

        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_in_ms: default_connect_timeout(),
            tcp_nodelay: default_tcp_nodelay(),
            tcp_keepalive_in_secs: default_tcp_keepalive(),
            http2_keep_alive_interval_in_secs: default_h2_keepalive_interval(),
            http2_keep_alive_timeout_in_secs: default_h2_keepalive_timeout(),
            initial_connection_window_size: default_conn_window_size(),
            initial_stream_window_size: default_stream_window_size(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    50
}

fn default_tcp_nodelay() -> bool {
    true
}

fn default_tcp_keepalive() -> u64 {
    3600
}

fn default_h2_keepalive_interval() -> u64 {
    300
}

fn default_h2_keepalive_timeout() -> u64 {
    20
}

fn default_conn_window_size() -> u32 {
    12582912
}

fn default_stream_window_size() -> u32 {
    2097152
}
