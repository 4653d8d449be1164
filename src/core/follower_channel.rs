//! Per-follower replication pipeline.
//!
//! One [`FollowerChannel`] serializes every AppendLog RPC a partition leader
//! drives against one peer: it coalesces bursts of submissions into a single
//! in-flight request, tracks the follower's log-match position, renegotiates
//! divergent tails reported as `E_LOG_GAP`, and resolves submitters' futures
//! in submission order. At most one RPC per channel is on the wire at any
//! time; a follow-up is chained only from the completion of its predecessor.

use std::mem;
use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;

use autometrics::autometrics;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::promise::SharedPromise;
use super::AppendFuture;
use super::LogId;
use super::PartitionContext;
use super::TermId;
use crate::proto::AppendLogRequest;
use crate::proto::AppendLogResponse;
use crate::proto::AskForVoteRequest;
use crate::proto::AskForVoteResponse;
use crate::proto::ErrorCode;
use crate::proto::LogEntry;
use crate::NodeAddr;
use crate::ReplicationError;
use crate::Result;
use crate::Transport;
use crate::TypeConfig;
use crate::Wal;
use crate::API_SLO;

/// A coalesced submission waiting for the in-flight request to finish.
/// Later submissions overwrite earlier ones: log ids grow monotonically, so
/// the newest target subsumes everything before it.
#[derive(Debug, Clone, Copy)]
struct PendingSubmission {
    term: TermId,
    log_id: LogId,
    committed_log_id: LogId,
    prev_log_term: TermId,
    prev_log_id: LogId,
}

/// Replication position and scheduling state, all guarded by one mutex.
#[derive(Default)]
struct ProgressState {
    /// Term of the batch currently being or about to be sent.
    log_term_to_send: TermId,
    /// Highest log id the leader wants this follower to hold.
    log_id_to_send: LogId,
    /// Term at `last_log_id_sent`.
    last_log_term_sent: TermId,
    /// Last log id known to be on the follower.
    last_log_id_sent: LogId,
    /// Commit index the leader is advertising.
    committed_log_id: LogId,
    pending_req: Option<PendingSubmission>,
    /// True while an RPC is outstanding or a chained follow-up is queued.
    request_on_going: bool,
    /// Set while the owning partition is not the leader.
    paused: bool,
    /// Terminal; never cleared.
    stopped: bool,
    /// Resolved by the RPC currently in flight.
    live_promise: SharedPromise,
    /// Collects submitters coalesced into `pending_req`; becomes the live
    /// promise on rotation.
    caching_promise: SharedPromise,
}

impl ProgressState {
    /// Terminates the current submission cycle: both promise slots resolve
    /// with `resp` and the channel quiesces.
    fn set_response(&mut self, resp: &AppendLogResponse) {
        self.live_promise.resolve(resp);
        self.caching_promise.resolve(resp);
        self.pending_req = None;
        self.request_on_going = false;
    }

    /// The caching promise becomes live; a fresh caching promise takes its
    /// place for the next coalescence class.
    fn rotate_promises(&mut self) {
        self.live_promise = mem::replace(&mut self.caching_promise, SharedPromise::new());
    }
}

/// Read-only copy of the channel's progress counters and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub log_term_to_send: TermId,
    pub log_id_to_send: LogId,
    pub last_log_term_sent: TermId,
    pub last_log_id_sent: LogId,
    pub committed_log_id: LogId,
    pub request_on_going: bool,
    pub paused: bool,
    pub stopped: bool,
}

/// The leader-side channel to one follower (or learner) of a partition.
///
/// Held by the owning partition behind an `Arc`: each spawned RPC driver
/// keeps a transient strong handle so a completion arriving after the
/// partition let go still finds the channel alive.
pub struct FollowerChannel<T>
where
    T: TypeConfig,
{
    /// Self-handle the RPC driver upgrades into the strong reference it
    /// carries for the duration of each exchange.
    me: Weak<FollowerChannel<T>>,
    ctx: Arc<PartitionContext<T>>,
    addr: NodeAddr,
    is_learner: bool,
    progress: Mutex<ProgressState>,
    /// Signalled by every terminal path of the RPC driver so
    /// [`wait_for_stop`](Self::wait_for_stop) can observe quiescence.
    quiescent: Notify,
}

impl<T> FollowerChannel<T>
where
    T: TypeConfig,
{
    pub fn new(ctx: Arc<PartitionContext<T>>, addr: NodeAddr, is_learner: bool) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            ctx,
            addr,
            is_learner,
            progress: Mutex::new(ProgressState::default()),
            quiescent: Notify::new(),
        })
    }

    pub fn addr(&self) -> &NodeAddr {
        &self.addr
    }

    /// Learners do not vote but replicate identically from the channel's
    /// perspective.
    pub fn is_learner(&self) -> bool {
        self.is_learner
    }

    pub fn progress(&self) -> ProgressSnapshot {
        let st = self.progress.lock();
        ProgressSnapshot {
            log_term_to_send: st.log_term_to_send,
            log_id_to_send: st.log_id_to_send,
            last_log_term_sent: st.last_log_term_sent,
            last_log_id_sent: st.last_log_id_sent,
            committed_log_id: st.committed_log_id,
            request_on_going: st.request_on_going,
            paused: st.paused,
            stopped: st.stopped,
        }
    }

    /// Submits one replication target to the follower.
    ///
    /// Returns a future resolving with the follower's eventual response for
    /// this submission. Refusals (`E_HOST_STOPPED`, `E_NOT_A_LEADER`,
    /// `E_TOO_MANY_REQUESTS`) and short-circuits for stale or re-sent
    /// targets resolve immediately without wire traffic. While a request is
    /// in flight, newer targets are coalesced: all their futures share the
    /// outcome of the single follow-up RPC.
    ///
    /// `Err` is returned only when the wal no longer holds the range the
    /// follower needs ([`ReplicationError::SnapshotRequired`]); the owning
    /// partition decides how to escalate.
    ///
    /// # Panics
    ///
    /// Panics if `prev_log_term`/`prev_log_id` regress behind the position
    /// the follower already acknowledged; the leader's submit loop must keep
    /// submissions monotonic.
    #[autometrics(objective = API_SLO)]
    pub fn append_logs(
        &self,
        term: TermId,
        log_id: LogId,
        committed_log_id: LogId,
        prev_log_term: TermId,
        prev_log_id: LogId,
    ) -> Result<AppendFuture> {
        debug!(
            peer = %self.addr,
            term,
            log_id,
            committed_log_id,
            prev_log_term,
            prev_log_id,
            "append logs to the follower"
        );

        let (req, fut) = {
            let mut st = self.progress.lock();

            let status = Self::check_status(&st);
            if status != ErrorCode::Succeeded {
                debug!(peer = %self.addr, code = status.as_str_name(), "refusing submission");
                return Ok(AppendFuture::ready(error_response(status)));
            }

            if log_id == st.log_id_to_send && st.request_on_going {
                // Re-send or heartbeat for the target already on the wire.
                info!(peer = %self.addr, log_id, "another request is on-going, ignore the re-send");
                return Ok(AppendFuture::ready(error_response(ErrorCode::Succeeded)));
            }

            if log_id < st.log_id_to_send {
                info!(
                    peer = %self.addr,
                    log_id,
                    log_id_to_send = st.log_id_to_send,
                    "submission already covered"
                );
                return Ok(AppendFuture::ready(error_response(ErrorCode::Succeeded)));
            }

            if st.request_on_going {
                if st.caching_promise.subscriber_count() <= self.ctx.config.max_outstanding {
                    st.pending_req = Some(PendingSubmission {
                        term,
                        log_id,
                        committed_log_id,
                        prev_log_term,
                        prev_log_id,
                    });
                    return Ok(st.caching_promise.subscribe());
                }
                info!(
                    peer = %self.addr,
                    waiters = st.caching_promise.subscriber_count(),
                    "too many submissions are waiting, reject"
                );
                return Ok(AppendFuture::ready(error_response(
                    ErrorCode::ETooManyRequests,
                )));
            }

            // No request is on-going; this submission becomes the live one.
            assert!(
                prev_log_term >= st.last_log_term_sent,
                "submission term regressed: prev_log_term {} < last_log_term_sent {}",
                prev_log_term,
                st.last_log_term_sent
            );
            assert!(
                prev_log_id >= st.last_log_id_sent,
                "submission position regressed: prev_log_id {} < last_log_id_sent {}",
                prev_log_id,
                st.last_log_id_sent
            );

            let req =
                self.build_request(term, log_id, committed_log_id, prev_log_term, prev_log_id)?;

            st.log_term_to_send = term;
            st.log_id_to_send = log_id;
            st.last_log_term_sent = prev_log_term;
            st.last_log_id_sent = prev_log_id;
            st.committed_log_id = committed_log_id;
            st.pending_req = None;
            st.rotate_promises();
            let fut = st.live_promise.subscribe();
            st.request_on_going = true;

            (req, fut)
        };

        self.dispatch(req);

        Ok(fut)
    }

    /// Forwards a vote solicitation to the peer.
    ///
    /// Votes bypass the replication pipeline entirely: they touch no
    /// progress counters, consume no promise slots, and may run while an
    /// append RPC is in flight. A stopped or paused channel refuses in-band
    /// via `error_code`.
    #[autometrics(objective = API_SLO)]
    pub async fn ask_for_vote(&self, req: AskForVoteRequest) -> Result<AskForVoteResponse> {
        {
            let st = self.progress.lock();
            let status = Self::check_status(&st);
            if status != ErrorCode::Succeeded {
                debug!(peer = %self.addr, code = status.as_str_name(), "not in a proper status, do not solicit a vote");
                let mut resp = AskForVoteResponse::default();
                resp.set_error_code(status);
                return Ok(resp);
            }
        }

        let rpc_timeout = Duration::from_millis(self.ctx.config.rpc_timeout_ms);
        self.ctx
            .transport
            .ask_for_vote(&self.addr, req, rpc_timeout)
            .await
    }

    /// Suspends sending; called when the owning partition loses leadership.
    /// The in-flight RPC is not cancelled, but its completion observes the
    /// flag and terminates the cycle.
    pub fn pause(&self) {
        info!(peer = %self.addr, "pausing the follower channel");
        self.progress.lock().paused = true;
    }

    /// Clears [`pause`](Self::pause). No state is replayed; the next
    /// submission re-establishes progress.
    pub fn resume(&self) {
        info!(peer = %self.addr, "resuming the follower channel");
        self.progress.lock().paused = false;
    }

    /// Terminal shutdown: every later submission fails with
    /// `E_HOST_STOPPED`, and the in-flight RPC resolves its waiters with the
    /// same code once it completes.
    pub fn stop(&self) {
        info!(peer = %self.addr, "stopping the follower channel");
        self.progress.lock().stopped = true;
    }

    /// Blocks until the RPC driver is quiescent. Must be called after
    /// [`stop`](Self::stop); the channel may be dropped once this returns.
    pub async fn wait_for_stop(&self) {
        loop {
            let notified = self.quiescent.notified();
            {
                let st = self.progress.lock();
                assert!(st.stopped, "wait_for_stop requires stop() first");
                if !st.request_on_going {
                    break;
                }
            }
            notified.await;
        }
        info!(peer = %self.addr, "the follower channel has been stopped");
    }

    fn check_status(st: &ProgressState) -> ErrorCode {
        if st.stopped {
            return ErrorCode::EHostStopped;
        }
        if st.paused {
            return ErrorCode::ENotALeader;
        }
        ErrorCode::Succeeded
    }

    /// Materialises one wire request for the range
    /// `[prev_log_id + 1, log_id]`, truncated to the batch cap and to the
    /// first term change so every entry shares the request's `log_term`.
    ///
    /// Called under the lock; the wal read is memory-speed and must stay
    /// await-free.
    fn build_request(
        &self,
        term: TermId,
        log_id: LogId,
        committed_log_id: LogId,
        prev_log_term: TermId,
        prev_log_id: LogId,
    ) -> std::result::Result<AppendLogRequest, ReplicationError> {
        let from = prev_log_id + 1;
        let to = log_id.min(prev_log_id.saturating_add(self.ctx.config.max_batch as u64));
        if from > to {
            return Err(ReplicationError::SnapshotRequired { from, to: log_id });
        }

        let entries = self.ctx.wal.entries_between(from..=to);
        let Some(first) = entries.first() else {
            return Err(ReplicationError::SnapshotRequired { from, to: log_id });
        };

        let log_term = first.term;
        let log_str_list: Vec<LogEntry> = entries
            .iter()
            .take_while(|e| e.term == log_term)
            .map(|e| LogEntry {
                cluster: e.cluster,
                payload: e.payload.to_vec(),
            })
            .collect();

        debug!(
            peer = %self.addr,
            from,
            to = log_id,
            log_term,
            batch = log_str_list.len(),
            "prepared append request"
        );

        Ok(AppendLogRequest {
            space: self.ctx.space_id,
            part: self.ctx.partition_id,
            current_term: term,
            last_log_id: log_id,
            leader_ip: self.ctx.leader_addr.ip.clone(),
            leader_port: u32::from(self.ctx.leader_addr.port),
            committed_log_id,
            last_log_term_sent: prev_log_term,
            last_log_id_sent: prev_log_id,
            log_term,
            log_str_list,
        })
    }

    /// Hands the request to the RPC driver task. The task owns a strong
    /// handle so the channel outlives the partition's reference for the
    /// duration of the exchange.
    fn dispatch(&self, req: AppendLogRequest) {
        let this = self
            .me
            .upgrade()
            .expect("channel is alive while dispatching");
        tokio::spawn(this.drive(req));
    }

    /// RPC driver: sends the request, classifies the completion, and keeps
    /// chaining follow-ups (batch drain, gap catch-up, adopted coalesced
    /// submissions) until the cycle terminates.
    async fn drive(self: Arc<Self>, mut req: AppendLogRequest) {
        let rpc_timeout = Duration::from_millis(self.ctx.config.rpc_timeout_ms);

        loop {
            let resp = match self.refusal_code() {
                Some(status) => {
                    warn!(
                        peer = %self.addr,
                        code = status.as_str_name(),
                        "the channel is not in a proper status, do not send"
                    );
                    error_response(status)
                }
                None => match self
                    .ctx
                    .transport
                    .append_log(&self.addr, req, rpc_timeout)
                    .await
                {
                    Ok(resp) => {
                        debug!(
                            peer = %self.addr,
                            code = resp.error_code().as_str_name(),
                            last_log_id = resp.last_log_id,
                            last_log_term = resp.last_log_term,
                            "append response"
                        );
                        resp
                    }
                    Err(e) => {
                        error!(peer = %self.addr, error = %e, "append_log rpc failed");
                        error_response(ErrorCode::EException)
                    }
                },
            };

            match self.process_response(resp) {
                Some(next) => req = next,
                None => break,
            }
        }

        self.quiescent.notify_waiters();
    }

    /// Pre-send status check. A refusal flows through the same
    /// classification as a follower response.
    fn refusal_code(&self) -> Option<ErrorCode> {
        let st = self.progress.lock();
        match Self::check_status(&st) {
            ErrorCode::Succeeded => None,
            code => Some(code),
        }
    }

    /// Classifies one completion under the lock and returns the next request
    /// to chain, if any.
    fn process_response(&self, resp: AppendLogResponse) -> Option<AppendLogRequest> {
        let mut st = self.progress.lock();

        match resp.error_code() {
            ErrorCode::Succeeded => {
                let status = Self::check_status(&st);
                if status != ErrorCode::Succeeded {
                    debug!(peer = %self.addr, "status changed while the rpc was in flight");
                    st.set_response(&error_response(status));
                    return None;
                }

                if resp.last_log_id < st.last_log_id_sent {
                    // A success must never move the acknowledged position
                    // backwards; a follower that does so is not trusted.
                    warn!(
                        peer = %self.addr,
                        reported = resp.last_log_id,
                        acked = st.last_log_id_sent,
                        "follower reported a regressed last log id, rejecting the response"
                    );
                    st.set_response(&error_response(ErrorCode::EException));
                    return None;
                }

                st.last_log_id_sent = resp.last_log_id;
                st.last_log_term_sent = resp.last_log_term;

                if st.last_log_id_sent < st.log_id_to_send {
                    // The batch cap truncated the send; keep draining the
                    // requested range without touching promises.
                    debug!(peer = %self.addr, "there are more logs to send");
                    return self.chain_next(&mut st);
                }

                // Submission fully delivered.
                st.live_promise.resolve(&resp);

                match st.pending_req.take() {
                    None => {
                        st.request_on_going = false;
                        None
                    }
                    Some(pending) => {
                        debug!(
                            peer = %self.addr,
                            from = st.last_log_id_sent + 1,
                            to = pending.log_id,
                            prev_log_term = pending.prev_log_term,
                            prev_log_id = pending.prev_log_id,
                            "sending the pending request in the queue"
                        );
                        st.log_term_to_send = pending.term;
                        st.log_id_to_send = pending.log_id;
                        st.committed_log_id = pending.committed_log_id;
                        st.rotate_promises();
                        self.chain_next(&mut st)
                    }
                }
            }
            ErrorCode::ELogGap => {
                let status = Self::check_status(&st);
                if status != ErrorCode::Succeeded {
                    debug!(peer = %self.addr, "status changed, skip catching up the gap");
                    st.set_response(&error_response(status));
                    return None;
                }

                info!(
                    peer = %self.addr,
                    follower_last_log_id = resp.last_log_id,
                    "the follower's log is behind, catch up from its tail"
                );
                st.last_log_id_sent = resp.last_log_id;
                st.last_log_term_sent = resp.last_log_term;
                self.chain_next(&mut st)
            }
            code => {
                warn!(
                    peer = %self.addr,
                    code = code.as_str_name(),
                    "failed to append logs to the follower"
                );
                st.set_response(&resp);
                None
            }
        }
    }

    /// Builds the follow-up request from the current baseline. A build
    /// failure terminates the cycle: the wal no longer serves the range and
    /// only a snapshot transfer could recover, so submitters are failed
    /// rather than left hanging.
    fn chain_next(&self, st: &mut ProgressState) -> Option<AppendLogRequest> {
        match self.build_request(
            st.log_term_to_send,
            st.log_id_to_send,
            st.committed_log_id,
            st.last_log_term_sent,
            st.last_log_id_sent,
        ) {
            Ok(req) => Some(req),
            Err(e) => {
                error!(peer = %self.addr, error = %e, "cannot build the follow-up request, abort the submission");
                st.set_response(&error_response(ErrorCode::EException));
                None
            }
        }
    }
}

fn error_response(code: ErrorCode) -> AppendLogResponse {
    let mut resp = AppendLogResponse::default();
    resp.set_error_code(code);
    resp
}
