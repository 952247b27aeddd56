use std::collections::BTreeMap;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::configs::Storage;
use crate::models::Node;
use crate::radio::{NodeKind, Sensor};
use crate::repositories::NodeRepository;
use crate::services::{PersistenceWriter, WriteOp};

/// In-memory collection of known nodes, keyed by id.
///
/// The ingestion task is the only mutator; HTTP handlers take read locks and
/// work on clones. A node's kind never changes after creation.
pub struct NodeRegistry {
    nodes: RwLock<BTreeMap<u8, Node>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Populate the registry from the store. Runs before any writer task
    /// starts, so it reads the pool directly.
    pub async fn load(storage: Arc<Storage>) -> Result<Self, sqlx::Error> {
        let nodes = NodeRepository::new(storage).load_all().await?;
        tracing::info!("registry loaded with {} nodes", nodes.len());

        Ok(Self {
            nodes: RwLock::new(nodes.into_iter().map(|node| (node.id, node)).collect()),
        })
    }

    pub async fn all(&self) -> Vec<Node> {
        self.nodes.read().await.values().cloned().collect()
    }

    pub async fn lookup(&self, id: u8) -> Option<Node> {
        self.nodes.read().await.get(&id).cloned()
    }

    /// Fetch the node, creating and immediately persisting it with empty
    /// readings on first contact. Returns the node and whether it was new.
    pub async fn get_or_create(
        &self,
        id: u8,
        kind: NodeKind,
        writer: &PersistenceWriter,
    ) -> (Node, bool) {
        let mut nodes = self.nodes.write().await;

        if let Some(node) = nodes.get(&id) {
            return (node.clone(), false);
        }

        let node = Node::new(id, kind);
        nodes.insert(id, node.clone());
        writer.submit(WriteOp::InsertNode { id, kind }).await;

        (node, true)
    }

    /// Overwrite the sensor fields present in the node's schema, refresh the
    /// timestamps and persist the update. Returns the updated snapshot.
    pub async fn apply_decoded(
        &self,
        id: u8,
        readings: &[(Sensor, u64)],
        writer: &PersistenceWriter,
    ) -> Option<Node> {
        let snapshot = {
            let mut nodes = self.nodes.write().await;
            let node = nodes.get_mut(&id)?;

            node.apply_raw(readings);
            let now = OffsetDateTime::now_utc();
            node.updated_at = Some(now);
            node.last_seen_at = Some(now);

            node.clone()
        };

        writer.submit(WriteOp::UpdateNode(snapshot.clone())).await;

        Some(snapshot)
    }

    /// Rename a node or re-point its Domoticz device index.
    pub async fn update_details(
        &self,
        id: u8,
        name: Option<String>,
        domoticz_idx: Option<String>,
        writer: &PersistenceWriter,
    ) -> Option<Node> {
        let snapshot = {
            let mut nodes = self.nodes.write().await;
            let node = nodes.get_mut(&id)?;

            if let Some(name) = name {
                node.name = Some(name);
            }
            if let Some(idx) = domoticz_idx {
                node.domoticz_idx = Some(idx);
            }
            node.updated_at = Some(OffsetDateTime::now_utc());

            node.clone()
        };

        writer.submit(WriteOp::UpdateNode(snapshot.clone())).await;

        Some(snapshot)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
