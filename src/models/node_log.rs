use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use time::OffsetDateTime;

use crate::models::{timestamp_column, Table};

/// One historical snapshot of a node's readings, written by the history
/// ticker and trimmed once it falls out of the retention window.
#[derive(Debug, Clone, Serialize)]
pub struct NodeLog {
    pub id: i64,
    pub node_id: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<u8>,
    pub light: Option<u8>,
    pub motion: Option<bool>,
    pub low_battery: Option<bool>,
    pub vcc: Option<u16>,
}

impl<'r> FromRow<'r, SqliteRow> for NodeLog {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let at = timestamp_column(row, "at")?.ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "at".to_string(),
            source: "log row without timestamp".into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            node_id: row.try_get::<i64, _>("node_id")? as u8,
            at,
            temperature: row.try_get("temperature")?,
            humidity: row.try_get::<Option<i64>, _>("humidity")?.map(|v| v as u8),
            light: row.try_get::<Option<i64>, _>("light")?.map(|v| v as u8),
            motion: row.try_get("motion")?,
            low_battery: row.try_get("lowbat")?,
            vcc: row.try_get::<Option<i64>, _>("vcc")?.map(|v| v as u16),
        })
    }
}

pub struct NodeLogTable;

impl Table for NodeLogTable {
    fn name(&self) -> &'static str {
        "node_logs"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS node_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                node_id INTEGER NOT NULL,
                at INTEGER NOT NULL,
                temperature REAL,
                humidity INTEGER,
                light INTEGER,
                motion INTEGER,
                lowbat INTEGER,
                vcc INTEGER,
                FOREIGN KEY (node_id) REFERENCES nodes (id)
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS node_logs;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["nodes"]
    }
}
