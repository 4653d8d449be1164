use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use tokio::sync::oneshot;

use crate::proto::AppendLogResponse;
use crate::ReplicationError;
use crate::Result;

/// Broadcast one-shot promise: every subscriber receives a clone of the one
/// response the promise is eventually resolved with.
///
/// The channel keeps two of these — the live one bound to the RPC in flight
/// and the caching one collecting coalesced submitters — and rotates them
/// under its lock.
#[derive(Debug, Default)]
pub(crate) struct SharedPromise {
    senders: Vec<oneshot::Sender<AppendLogResponse>>,
}

impl SharedPromise {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hands out one more future bound to this promise's resolution.
    pub(crate) fn subscribe(&mut self) -> AppendFuture {
        let (tx, rx) = oneshot::channel();
        self.senders.push(tx);
        AppendFuture { rx }
    }

    /// Number of futures handed out and not yet resolved.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.senders.len()
    }

    /// Resolves every subscriber with a clone of `resp`. Subscribers that
    /// dropped their future are skipped. Resolving an already-drained
    /// promise is a no-op.
    pub(crate) fn resolve(&mut self, resp: &AppendLogResponse) {
        for sender in self.senders.drain(..) {
            let _ = sender.send(resp.clone());
        }
    }
}

/// Future side of a submission: resolves with the follower response (or the
/// in-band refusal) for the submission it was returned from.
#[derive(Debug)]
pub struct AppendFuture {
    rx: oneshot::Receiver<AppendLogResponse>,
}

impl AppendFuture {
    /// An already-resolved future, used for gate decisions that never reach
    /// the wire.
    pub(crate) fn ready(resp: AppendLogResponse) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(resp);
        Self { rx }
    }
}

impl Future for AppendFuture {
    type Output = Result<AppendLogResponse>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().rx).poll(cx) {
            Poll::Ready(Ok(resp)) => Poll::Ready(Ok(resp)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(ReplicationError::ChannelDropped.into())),
            Poll::Pending => Poll::Pending,
        }
    }
}
