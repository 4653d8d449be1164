//! Shared fixtures for unit tests: scripted collaborators, type-config
//! wiring, and wal/response builders.
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tonic::async_trait;

use crate::core::LogId;
use crate::core::TermId;
use crate::proto::AppendLogRequest;
use crate::proto::AppendLogResponse;
use crate::proto::AskForVoteRequest;
use crate::proto::AskForVoteResponse;
use crate::proto::ErrorCode;
use crate::MemoryWal;
use crate::MockTransport;
use crate::MockWal;
use crate::NodeAddr;
use crate::PartitionContext;
use crate::ReplicationConfig;
use crate::Result;
use crate::Transport;
use crate::TypeConfig;
use crate::WalEntry;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub(crate) struct MockTypeConfig;

impl TypeConfig for MockTypeConfig {
    type W = MockWal;

    type TR = MockTransport;
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub(crate) struct ScriptedTypeConfig;

impl TypeConfig for ScriptedTypeConfig {
    type W = MemoryWal;

    type TR = ScriptedTransport;
}

/// Transport double with queued responses and request capture.
///
/// A gated instance parks every `append_log` call until the test calls
/// [`release`](Self::release), which is how tests hold an RPC "in flight"
/// while they poke the channel from the outside.
pub(crate) struct ScriptedTransport {
    gated: bool,
    gate: Semaphore,
    append_responses: Mutex<VecDeque<Result<AppendLogResponse>>>,
    vote_responses: Mutex<VecDeque<Result<AskForVoteResponse>>>,
    requests: Mutex<Vec<AppendLogRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            gated: false,
            gate: Semaphore::new(0),
            append_responses: Mutex::new(VecDeque::new()),
            vote_responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn gated() -> Arc<Self> {
        Arc::new(Self {
            gated: true,
            gate: Semaphore::new(0),
            append_responses: Mutex::new(VecDeque::new()),
            vote_responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Lets one parked `append_log` call proceed.
    pub(crate) fn release(&self) {
        self.gate.add_permits(1);
    }

    pub(crate) fn push_append(&self, resp: Result<AppendLogResponse>) {
        self.append_responses.lock().push_back(resp);
    }

    pub(crate) fn push_vote(&self, resp: Result<AskForVoteResponse>) {
        self.vote_responses.lock().push_back(resp);
    }

    pub(crate) fn append_calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn captured_requests(&self) -> Vec<AppendLogRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn append_log(
        &self,
        _addr: &NodeAddr,
        req: AppendLogRequest,
        _timeout: Duration,
    ) -> Result<AppendLogResponse> {
        self.requests.lock().push(req);
        if self.gated {
            let permit = self.gate.acquire().await.expect("gate closed");
            permit.forget();
        }
        self.append_responses
            .lock()
            .pop_front()
            .expect("scripted append response available")
    }

    async fn ask_for_vote(
        &self,
        _addr: &NodeAddr,
        _req: AskForVoteRequest,
        _timeout: Duration,
    ) -> Result<AskForVoteResponse> {
        self.vote_responses
            .lock()
            .pop_front()
            .expect("scripted vote response available")
    }
}

pub(crate) fn follower_addr() -> NodeAddr {
    NodeAddr::new("127.0.0.1", 9780)
}

pub(crate) fn leader_addr() -> NodeAddr {
    NodeAddr::new("127.0.0.1", 9779)
}

pub(crate) fn scripted_context(
    wal: Arc<MemoryWal>,
    transport: Arc<ScriptedTransport>,
    config: ReplicationConfig,
) -> Arc<PartitionContext<ScriptedTypeConfig>> {
    PartitionContext::new(1, 7, leader_addr(), wal, transport, config)
}

pub(crate) fn mock_context(
    wal: Arc<MockWal>,
    transport: Arc<MockTransport>,
    config: ReplicationConfig,
) -> Arc<PartitionContext<MockTypeConfig>> {
    PartitionContext::new(1, 7, leader_addr(), wal, transport, config)
}

/// Seeds `[from, to]` with one entry per log id, all under `term`.
pub(crate) fn seed_wal(wal: &MemoryWal, from: LogId, to: LogId, term: TermId) {
    wal.append_batch(
        (from..=to)
            .map(|log_id| WalEntry {
                log_id,
                term,
                cluster: 0,
                payload: Bytes::from(format!("cmd-{log_id}")),
            })
            .collect(),
    );
}

pub(crate) fn success_response(last_log_id: LogId, last_log_term: TermId) -> AppendLogResponse {
    AppendLogResponse {
        error_code: ErrorCode::Succeeded as i32,
        last_log_id,
        last_log_term,
        ..Default::default()
    }
}

pub(crate) fn gap_response(last_log_id: LogId, last_log_term: TermId) -> AppendLogResponse {
    AppendLogResponse {
        error_code: ErrorCode::ELogGap as i32,
        last_log_id,
        last_log_term,
        ..Default::default()
    }
}

pub(crate) fn code_response(code: ErrorCode) -> AppendLogResponse {
    AppendLogResponse {
        error_code: code as i32,
        ..Default::default()
    }
}

/// Polls `cond` until it holds, failing the test after five seconds.
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not met within 5s");
}
