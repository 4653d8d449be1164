//! Timeout-aware gRPC implementation of [`Transport`].

use std::time::Duration;

use tokio::time::timeout;
use tonic::async_trait;
use tonic::codec::CompressionEncoding;
use tonic::transport::Channel;
use tracing::warn;

use super::ConnectionCache;
use super::NodeAddr;
use super::Transport;
use crate::proto::raftex_service_client::RaftexServiceClient;
use crate::proto::AppendLogRequest;
use crate::proto::AppendLogResponse;
use crate::proto::AskForVoteRequest;
use crate::proto::AskForVoteResponse;
use crate::NetworkConfig;
use crate::NetworkError;
use crate::Result;

pub struct GrpcTransport {
    cache: ConnectionCache,
}

impl GrpcTransport {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            cache: ConnectionCache::new(config),
        }
    }

    fn client(channel: Channel) -> RaftexServiceClient<Channel> {
        RaftexServiceClient::new(channel)
            .send_compressed(CompressionEncoding::Gzip)
            .accept_compressed(CompressionEncoding::Gzip)
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn append_log(
        &self,
        addr: &NodeAddr,
        req: AppendLogRequest,
        deadline: Duration,
    ) -> Result<AppendLogResponse> {
        let channel = self.cache.get_channel(addr).await?;
        let mut client = Self::client(channel);

        let mut request = tonic::Request::new(req);
        request.set_timeout(deadline);

        match timeout(deadline, client.append_log(request)).await {
            Ok(Ok(resp)) => Ok(resp.into_inner()),
            Ok(Err(status)) => {
                warn!(peer = %addr, %status, "append_log rpc failed");
                self.cache.evict(addr);
                Err(NetworkError::Rpc(status).into())
            }
            Err(_) => {
                warn!(peer = %addr, ?deadline, "append_log rpc timed out");
                self.cache.evict(addr);
                Err(NetworkError::Timeout {
                    peer: addr.to_string(),
                    duration: deadline,
                }
                .into())
            }
        }
    }

    async fn ask_for_vote(
        &self,
        addr: &NodeAddr,
        req: AskForVoteRequest,
        deadline: Duration,
    ) -> Result<AskForVoteResponse> {
        let channel = self.cache.get_channel(addr).await?;
        let mut client = Self::client(channel);

        let mut request = tonic::Request::new(req);
        request.set_timeout(deadline);

        match timeout(deadline, client.ask_for_vote(request)).await {
            Ok(Ok(resp)) => Ok(resp.into_inner()),
            Ok(Err(status)) => {
                warn!(peer = %addr, %status, "ask_for_vote rpc failed");
                self.cache.evict(addr);
                Err(NetworkError::Rpc(status).into())
            }
            Err(_) => {
                warn!(peer = %addr, ?deadline, "ask_for_vote rpc timed out");
                self.cache.evict(addr);
                Err(NetworkError::Timeout {
                    peer: addr.to_string(),
                    duration: deadline,
                }
                .into())
            }
        }
    }
}
