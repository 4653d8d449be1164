use std::sync::Arc;

use crate::alias::TROF;
use crate::alias::WOF;
use crate::NodeAddr;
use crate::ReplicationConfig;
use crate::TypeConfig;

/// Leader-side view of one Raft partition, shared by every follower channel
/// the partition owns.
///
/// The partition object itself (quorum tracking, commit calculation, term
/// bookkeeping) lives above this crate; channels only need the identity
/// fields and the wal/transport handles collected here.
pub struct PartitionContext<T>
where
    T: TypeConfig,
{
    pub space_id: u32,
    pub partition_id: u32,
    /// Advertised in every request so followers learn who leads.
    pub leader_addr: NodeAddr,

    // Storage
    pub wal: Arc<WOF<T>>,

    // Network
    pub transport: Arc<TROF<T>>,

    pub config: ReplicationConfig,
}

impl<T> PartitionContext<T>
where
    T: TypeConfig,
{
    pub fn new(
        space_id: u32,
        partition_id: u32,
        leader_addr: NodeAddr,
        wal: Arc<WOF<T>>,
        transport: Arc<TROF<T>>,
        config: ReplicationConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            space_id,
            partition_id,
            leader_addr,
            wal,
            transport,
            config,
        })
    }

    pub fn wal(&self) -> &Arc<WOF<T>> {
        &self.wal
    }

    pub fn transport(&self) -> &Arc<TROF<T>> {
        &self.transport
    }
}
