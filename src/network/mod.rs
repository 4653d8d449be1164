//! Network abstraction for the channel's RPC surface.
//!
//! The channel drives [`Transport`] and never touches connections directly;
//! the gRPC implementation lives in [`grpc_transport`] on top of a shared
//! [`connection_cache`].
mod connection_cache;
mod grpc_transport;

pub(crate) use connection_cache::*;
pub use grpc_transport::*;

#[cfg(test)]
mod grpc_transport_test;

use std::fmt;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tonic::async_trait;

use crate::proto::AppendLogRequest;
use crate::proto::AppendLogResponse;
use crate::proto::AskForVoteRequest;
use crate::proto::AskForVoteResponse;
use crate::Result;

/// Address of one raftex peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddr {
    pub ip: String,
    pub port: u16,
}

impl NodeAddr {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self { ip: ip.into(), port }
    }

    /// http endpoint form accepted by tonic. Accepts either a raw IPv4
    /// address or a resolvable host name.
    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.ip, self.port)
    }
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Peer-to-peer RPC operations the channel depends on.
///
/// Implementations must be safe to share across every channel of a node;
/// per-call deadlines are passed in rather than configured per connection so
/// each channel can apply its own RPC timeout.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends one AppendLog batch and returns the follower's response.
    ///
    /// Timeouts and connection failures surface as `Err`; protocol-level
    /// refusals come back as `Ok` with a non-success `error_code`.
    async fn append_log(
        &self,
        addr: &NodeAddr,
        req: AppendLogRequest,
        timeout: Duration,
    ) -> Result<AppendLogResponse>;

    /// Solicits a vote from the peer.
    async fn ask_for_vote(
        &self,
        addr: &NodeAddr,
        req: AskForVoteRequest,
        timeout: Duration,
    ) -> Result<AskForVoteResponse>;
}
