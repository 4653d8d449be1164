use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;
use tonic::transport::Channel;
use tonic::transport::Endpoint;
use tracing::debug;
use tracing::trace;

use super::NodeAddr;
use crate::NetworkConfig;
use crate::NetworkError;
use crate::Result;

/// Cached gRPC channel with metadata
#[derive(Clone)]
pub(crate) struct CachedChannel {
    pub(crate) channel: Channel,
    pub(crate) last_used: Instant,
}

/// Thread-safe connection cache shared by every follower channel of a node.
#[derive(Clone)]
pub(crate) struct ConnectionCache {
    cache: DashMap<NodeAddr, CachedChannel>,
    config: NetworkConfig,
}

impl ConnectionCache {
    pub(crate) fn new(config: NetworkConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Get or create a channel with caching and reconnection logic
    pub(crate) async fn get_channel(&self, addr: &NodeAddr) -> Result<Channel> {
        // Fast path: reuse the live channel
        if let Some(mut entry) = self.cache.get_mut(addr) {
            let cached = entry.value_mut();
            cached.last_used = Instant::now();
            return Ok(cached.channel.clone());
        }

        // Slow path: create new channel and update cache
        debug!(peer = %addr, "Establishing new gRPC connection");
        let channel = self.create_channel(addr).await?;

        trace!(peer = %addr, "Cache updated");
        self.cache.insert(
            addr.clone(),
            CachedChannel {
                channel: channel.clone(),
                last_used: Instant::now(),
            },
        );

        Ok(channel)
    }

    /// Drops the cached channel so the next call reconnects. Called by the
    /// transport after an RPC failure.
    pub(crate) fn evict(&self, addr: &NodeAddr) {
        self.cache.remove(addr);
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, addr: &NodeAddr) -> bool {
        self.cache.contains_key(addr)
    }

    /// Create pre-configured endpoint
    async fn create_channel(&self, addr: &NodeAddr) -> Result<Channel> {
        let params = &self.config;

        Endpoint::try_from(addr.uri())
            .map_err(|e| NetworkError::InvalidUri(e.to_string()))?
            .connect_timeout(Duration::from_millis(params.connect_timeout_in_ms))
            .tcp_nodelay(params.tcp_nodelay)
            .tcp_keepalive(Some(Duration::from_secs(params.tcp_keepalive_in_secs)))
            .http2_keep_alive_interval(Duration::from_secs(
                params.http2_keep_alive_interval_in_secs,
            ))
            .keep_alive_timeout(Duration::from_secs(params.http2_keep_alive_timeout_in_secs))
            .initial_connection_window_size(params.initial_connection_window_size)
            .initial_stream_window_size(params.initial_stream_window_size)
            .connect()
            .await
            .map_err(|e| NetworkError::ConnectError(e.to_string()).into())
    }
}
