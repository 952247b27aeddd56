use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::mpsc;

use crate::configs::Storage;
use crate::models::Node;
use crate::radio::NodeKind;
use crate::repositories::{NodeLogRepository, NodeRepository};

const WRITE_QUEUE_DEPTH: usize = 256;

/// One unit of mutating work against the store.
pub enum WriteOp {
    InsertNode { id: u8, kind: NodeKind },
    UpdateNode(Node),
    InsertLog { node: Node, at: OffsetDateTime },
    TrimLogs { cutoff: OffsetDateTime },
}

struct SqlWriter {
    nodes: NodeRepository,
    logs: NodeLogRepository,
}

impl SqlWriter {
    fn new(storage: Arc<Storage>) -> Self {
        Self {
            nodes: NodeRepository::new(storage.clone()),
            logs: NodeLogRepository::new(storage),
        }
    }

    async fn apply(&self, op: WriteOp) -> Result<(), sqlx::Error> {
        match op {
            WriteOp::InsertNode { id, kind } => self.nodes.insert(id, kind).await,
            WriteOp::UpdateNode(node) => self.nodes.update(&node).await,
            WriteOp::InsertLog { node, at } => self.logs.insert(&node, at).await,
            WriteOp::TrimLogs { cutoff } => self.logs.trim_older_than(cutoff).await,
        }
    }

    /// A failed mutation means the in-memory registry and the store can no
    /// longer be trusted to agree; there is no retry path.
    async fn apply_or_die(&self, op: WriteOp) {
        if let Err(err) = self.apply(op).await {
            tracing::error!("storage mutation failed: {err}");
            std::process::exit(1);
        }
    }
}

enum Mode {
    /// The caller awaits application; used by tests for determinism.
    Inline(SqlWriter),
    /// Work is queued to a dedicated drain task.
    Queued(mpsc::Sender<WriteOp>),
}

/// The single logical writer of the store.
///
/// All mutations funnel through `submit` and are applied one at a time in
/// submission order, whichever delivery mode is active. Reads (registry load
/// at startup, history queries) go straight to the pool instead.
pub struct PersistenceWriter {
    mode: Mode,
}

impl PersistenceWriter {
    /// Queued mode: a background task drains the FIFO.
    pub fn spawn(storage: Arc<Storage>) -> Self {
        let (queue, mut ops) = mpsc::channel::<WriteOp>(WRITE_QUEUE_DEPTH);
        let writer = SqlWriter::new(storage);

        tokio::spawn(async move {
            while let Some(op) = ops.recv().await {
                writer.apply_or_die(op).await;
            }
        });

        Self {
            mode: Mode::Queued(queue),
        }
    }

    /// Inline mode: `submit` returns once the mutation is applied.
    pub fn inline(storage: Arc<Storage>) -> Self {
        Self {
            mode: Mode::Inline(SqlWriter::new(storage)),
        }
    }

    pub async fn submit(&self, op: WriteOp) {
        match &self.mode {
            Mode::Inline(writer) => writer.apply_or_die(op).await,
            Mode::Queued(queue) => {
                if queue.send(op).await.is_err() {
                    tracing::error!("persistence writer task is gone");
                    std::process::exit(1);
                }
            }
        }
    }
}
