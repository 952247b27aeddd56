use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::FrameError;
use crate::radio::{decode_payload, parse_line, NodeKind};
use crate::services::{DomoticzService, Hub, NodeRegistry, PersistenceWriter};

/// The ingestion path: serial lines in, decoded updates out to the store,
/// the hub and (optionally) Domoticz.
pub struct GatewayService;

impl GatewayService {
    pub fn spawn(
        lines: mpsc::Receiver<String>,
        registry: Arc<NodeRegistry>,
        writer: Arc<PersistenceWriter>,
        hub: Arc<Hub>,
        domoticz: Option<Arc<DomoticzService>>,
    ) -> JoinHandle<()> {
        tokio::spawn(Self::run(lines, registry, writer, hub, domoticz))
    }

    async fn run(
        mut lines: mpsc::Receiver<String>,
        registry: Arc<NodeRegistry>,
        writer: Arc<PersistenceWriter>,
        hub: Arc<Hub>,
        domoticz: Option<Arc<DomoticzService>>,
    ) {
        while let Some(line) = lines.recv().await {
            tracing::debug!("received: {line}");
            Self::process_line(&line, &registry, &writer, &hub, domoticz.as_ref()).await;
        }
    }

    /// Run one line through the full decode pipeline.
    ///
    /// Anything wrong with the frame is logged and dropped here; the node's
    /// prior state stays untouched and ingestion continues with the next
    /// line.
    pub async fn process_line(
        line: &str,
        registry: &NodeRegistry,
        writer: &PersistenceWriter,
        hub: &Hub,
        domoticz: Option<&Arc<DomoticzService>>,
    ) {
        let frame = match parse_line(line) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!("dropping frame {line:?}: {err}");
                return;
            }
        };

        let Some(kind) = NodeKind::from_code(frame.kind_code) else {
            let err = FrameError::UnknownNodeKind(frame.kind_code);
            tracing::warn!("dropping frame {line:?}: {err}");
            return;
        };

        let (node, created) = registry.get_or_create(frame.node_id, kind, writer).await;
        if created {
            tracing::info!("new node {} ({:?}) registered", node.id, node.kind);
        }

        // decode against the registered kind, which never changes; a frame
        // claiming another kind for a known id fails the length check
        let readings = match decode_payload(node.kind, &frame.payload) {
            Ok(readings) => readings,
            Err(err) => {
                tracing::warn!("dropping frame from node {}: {err}", node.id);
                return;
            }
        };

        if let Some(node) = registry.apply_decoded(frame.node_id, &readings, writer).await {
            tracing::debug!("node {} updated: {}", node.id, node.text_data());

            hub.broadcast(node.snapshot_line().into_bytes()).await;

            if let Some(domoticz) = domoticz {
                if let Some(params) = node.domoticz_params(domoticz.hardware_id()) {
                    let domoticz = Arc::clone(domoticz);
                    tokio::spawn(async move { domoticz.push(&params).await });
                }
            }
        }
    }
}
