use std::sync::Arc;

use sqlx::Error;

use crate::configs::Storage;
use crate::models::Node;
use crate::radio::NodeKind;

pub struct NodeRepository {
    storage: Arc<Storage>,
}

impl NodeRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Every known node, for the registry load at startup.
    pub async fn load_all(&self) -> Result<Vec<Node>, Error> {
        let nodes: Vec<Node> = sqlx::query_as("SELECT * FROM nodes ORDER BY id")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(nodes)
    }

    /// Register a node first seen on the radio, with empty readings.
    pub async fn insert(&self, id: u8, kind: NodeKind) -> Result<(), Error> {
        sqlx::query("INSERT INTO nodes (id, kind) VALUES ($1, $2)")
            .bind(id as i64)
            .bind(kind.code() as i64)
            .execute(self.storage.get_pool())
            .await?;

        Ok(())
    }

    /// Write the node's current state. Sensors outside the node's schema are
    /// `None` and land as SQL NULL.
    pub async fn update(&self, node: &Node) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE nodes
            SET name = $1, domoticz_idx = $2, updated_at = $3, last_seen_at = $4,
                temperature = $5, humidity = $6, light = $7, motion = $8,
                lowbat = $9, vcc = $10
            WHERE id = $11
            "#,
        )
        .bind(node.name.as_deref())
        .bind(node.domoticz_idx.as_deref())
        .bind(node.updated_at.map(|t| t.unix_timestamp()))
        .bind(node.last_seen_at.map(|t| t.unix_timestamp()))
        .bind(node.temperature)
        .bind(node.humidity.map(|v| v as i64))
        .bind(node.light.map(|v| v as i64))
        .bind(node.motion)
        .bind(node.low_battery)
        .bind(node.vcc.map(|v| v as i64))
        .bind(node.id as i64)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::configs::{Database, SchemaManager};
    use crate::radio::Sensor;

    use super::*;

    async fn setup_test_db() -> Arc<Storage> {
        Arc::new(
            Storage::new(
                Database {
                    url: String::from("sqlite::memory:"),
                    clean_start: true,
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn insert_and_load_round_trip() {
        let storage = setup_test_db().await;
        let repo = NodeRepository::new(storage);

        repo.insert(2, NodeKind::TinytxTh).await.unwrap();
        repo.insert(5, NodeKind::JeenodeThlm).await.unwrap();

        let nodes = repo.load_all().await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, 2);
        assert_eq!(nodes[0].kind, NodeKind::TinytxTh);
        assert_eq!(nodes[0].temperature, None);
        assert_eq!(nodes[1].id, 5);
    }

    #[tokio::test]
    async fn update_persists_current_state() {
        let storage = setup_test_db().await;
        let repo = NodeRepository::new(storage);

        repo.insert(2, NodeKind::TinytxTh).await.unwrap();

        let mut node = Node::new(2, NodeKind::TinytxTh);
        node.name = Some("Bedroom".to_string());
        node.apply_raw(&[
            (Sensor::Temperature, 213),
            (Sensor::Humidity, 58),
            (Sensor::SupplyVoltage, 2970),
        ]);
        node.updated_at = Some(OffsetDateTime::from_unix_timestamp(1_400_000_000).unwrap());
        node.last_seen_at = node.updated_at;

        repo.update(&node).await.unwrap();

        let nodes = repo.load_all().await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name.as_deref(), Some("Bedroom"));
        assert_eq!(nodes[0].temperature, Some(21.3));
        assert_eq!(nodes[0].humidity, Some(58));
        assert_eq!(nodes[0].vcc, Some(2970));
        // not part of the TinytxTh schema, stays NULL
        assert_eq!(nodes[0].light, None);
        assert_eq!(nodes[0].updated_at, node.updated_at);
    }
}
