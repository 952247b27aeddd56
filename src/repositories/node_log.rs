use std::sync::Arc;

use sqlx::Error;
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::{Node, NodeLog};

pub struct NodeLogRepository {
    storage: Arc<Storage>,
}

impl NodeLogRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Append a snapshot of the node's current readings.
    pub async fn insert(&self, node: &Node, at: OffsetDateTime) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO node_logs (node_id, at, temperature, humidity, light, motion, lowbat, vcc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(node.id as i64)
        .bind(at.unix_timestamp())
        .bind(node.temperature)
        .bind(node.humidity.map(|v| v as i64))
        .bind(node.light.map(|v| v as i64))
        .bind(node.motion)
        .bind(node.low_battery)
        .bind(node.vcc.map(|v| v as i64))
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }

    pub async fn find_by_node(&self, node_id: u8) -> Result<Vec<NodeLog>, Error> {
        let logs: Vec<NodeLog> =
            sqlx::query_as("SELECT * FROM node_logs WHERE node_id = $1 ORDER BY at")
                .bind(node_id as i64)
                .fetch_all(self.storage.get_pool())
                .await?;

        Ok(logs)
    }

    /// Delete every row older than the cutoff.
    pub async fn trim_older_than(&self, cutoff: OffsetDateTime) -> Result<(), Error> {
        sqlx::query("DELETE FROM node_logs WHERE at < $1")
            .bind(cutoff.unix_timestamp())
            .execute(self.storage.get_pool())
            .await?;

        Ok(())
    }
}
