use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::services::{Hub, NodeRegistry, PersistenceWriter, WriteOp};

/// Periodic snapshot of every node's readings into the history log.
///
/// Ticks never overlap: one tick's mutations are all submitted before the
/// interval yields the next tick.
pub struct HistoryTicker;

impl HistoryTicker {
    pub fn spawn(
        period: Duration,
        retention: time::Duration,
        registry: Arc<NodeRegistry>,
        writer: Arc<PersistenceWriter>,
        hub: Arc<Hub>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);

            loop {
                // the first tick fires immediately
                ticker.tick().await;
                Self::run_once(&registry, &writer, &hub, retention).await;
            }
        })
    }

    /// Snapshot all nodes, then trim rows that fell out of the retention
    /// window.
    pub async fn run_once(
        registry: &NodeRegistry,
        writer: &PersistenceWriter,
        hub: &Hub,
        retention: time::Duration,
    ) {
        let now = OffsetDateTime::now_utc();

        for node in registry.all().await {
            // every supported kind reports at least one sensor, but an empty
            // schema would make a pointless all-NULL row
            if node.kind.sensors().is_empty() {
                continue;
            }

            hub.broadcast(node.snapshot_line().into_bytes()).await;
            writer.submit(WriteOp::InsertLog { node, at: now }).await;
        }

        writer
            .submit(WriteOp::TrimLogs {
                cutoff: now - retention,
            })
            .await;
    }
}
