//! Protocol Buffer definitions and generated code for the raftex RPC surface.
//!
//! The message and client code below follows the `tonic-build` output shape
//! and is checked in so builds do not require a local `protoc`. Regenerate
//! against `proto/raftex.proto` when the wire contract changes.

/// A single replicated log record. `cluster` identifies the origin cluster
/// for cross-cluster sync; the payload is opaque to the channel.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LogEntry {
    #[prost(uint64, tag = "1")]
    pub cluster: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}

/// One AppendLog batch from a partition leader to a follower. Every entry in
/// `log_str_list` was created under `log_term`; a range spanning several
/// terms is delivered as several requests.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppendLogRequest {
    #[prost(uint32, tag = "1")]
    pub space: u32,
    #[prost(uint32, tag = "2")]
    pub part: u32,
    #[prost(uint64, tag = "3")]
    pub current_term: u64,
    /// The last log id the leader wants the follower to hold after this
    /// submission is fully delivered.
    #[prost(uint64, tag = "4")]
    pub last_log_id: u64,
    #[prost(string, tag = "5")]
    pub leader_ip: ::prost::alloc::string::String,
    #[prost(uint32, tag = "6")]
    pub leader_port: u32,
    #[prost(uint64, tag = "7")]
    pub committed_log_id: u64,
    /// Term at `last_log_id_sent`, for the follower's continuity check.
    #[prost(uint64, tag = "8")]
    pub last_log_term_sent: u64,
    /// Last log id the leader believes is already on the follower; the batch
    /// starts at the next id.
    #[prost(uint64, tag = "9")]
    pub last_log_id_sent: u64,
    #[prost(uint64, tag = "10")]
    pub log_term: u64,
    #[prost(message, repeated, tag = "11")]
    pub log_str_list: ::prost::alloc::vec::Vec<LogEntry>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppendLogResponse {
    #[prost(enumeration = "ErrorCode", tag = "1")]
    pub error_code: i32,
    #[prost(uint64, tag = "2")]
    pub current_term: u64,
    /// Highest log id actually on the follower after handling the request.
    #[prost(uint64, tag = "3")]
    pub last_log_id: u64,
    #[prost(uint64, tag = "4")]
    pub last_log_term: u64,
    #[prost(uint64, tag = "5")]
    pub committed_log_id: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AskForVoteRequest {
    #[prost(uint32, tag = "1")]
    pub space: u32,
    #[prost(uint32, tag = "2")]
    pub part: u32,
    #[prost(string, tag = "3")]
    pub candidate_ip: ::prost::alloc::string::String,
    #[prost(uint32, tag = "4")]
    pub candidate_port: u32,
    #[prost(uint64, tag = "5")]
    pub term: u64,
    #[prost(uint64, tag = "6")]
    pub last_log_id: u64,
    #[prost(uint64, tag = "7")]
    pub last_log_term: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AskForVoteResponse {
    #[prost(enumeration = "ErrorCode", tag = "1")]
    pub error_code: i32,
    #[prost(uint64, tag = "2")]
    pub current_term: u64,
}

/// Result codes shared by every raftex RPC. Codes the follower produces are
/// forwarded to submitters verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ErrorCode {
    Succeeded = 0,
    /// The follower's log tail is older than the leader assumed.
    ELogGap = 1,
    /// The follower already holds logs newer than the request.
    ELogStale = 2,
    ETermOutOfDate = 3,
    EWalFail = 4,
    EHostStopped = 5,
    ENotALeader = 6,
    ETooManyRequests = 7,
    EBadState = 8,
    EException = 9,
}

impl ErrorCode {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ErrorCode::Succeeded => "SUCCEEDED",
            ErrorCode::ELogGap => "E_LOG_GAP",
            ErrorCode::ELogStale => "E_LOG_STALE",
            ErrorCode::ETermOutOfDate => "E_TERM_OUT_OF_DATE",
            ErrorCode::EWalFail => "E_WAL_FAIL",
            ErrorCode::EHostStopped => "E_HOST_STOPPED",
            ErrorCode::ENotALeader => "E_NOT_A_LEADER",
            ErrorCode::ETooManyRequests => "E_TOO_MANY_REQUESTS",
            ErrorCode::EBadState => "E_BAD_STATE",
            ErrorCode::EException => "E_EXCEPTION",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "SUCCEEDED" => Some(Self::Succeeded),
            "E_LOG_GAP" => Some(Self::ELogGap),
            "E_LOG_STALE" => Some(Self::ELogStale),
            "E_TERM_OUT_OF_DATE" => Some(Self::ETermOutOfDate),
            "E_WAL_FAIL" => Some(Self::EWalFail),
            "E_HOST_STOPPED" => Some(Self::EHostStopped),
            "E_NOT_A_LEADER" => Some(Self::ENotALeader),
            "E_TOO_MANY_REQUESTS" => Some(Self::ETooManyRequests),
            "E_BAD_STATE" => Some(Self::EBadState),
            "E_EXCEPTION" => Some(Self::EException),
            _ => None,
        }
    }
}

/// Generated client implementations.
pub mod raftex_service_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::wildcard_imports)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;
    /// Replication and vote RPCs a partition leader drives against one peer.
    #[derive(Debug, Clone)]
    pub struct RaftexServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl RaftexServiceClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> RaftexServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        pub async fn append_log(
            &mut self,
            request: impl tonic::IntoRequest<super::AppendLogRequest>,
        ) -> std::result::Result<tonic::Response<super::AppendLogResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/raftex.RaftexService/AppendLog");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("raftex.RaftexService", "AppendLog"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn ask_for_vote(
            &mut self,
            request: impl tonic::IntoRequest<super::AskForVoteRequest>,
        ) -> std::result::Result<tonic::Response<super::AskForVoteResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/raftex.RaftexService/AskForVote");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("raftex.RaftexService", "AskForVote"));
            self.inner.unary(req, path, codec).await
        }
    }
}
