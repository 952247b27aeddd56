use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use time::OffsetDateTime;

use crate::models::{timestamp_column, Table};
use crate::radio::{NodeKind, Sensor, Value};

/// Base added to a node id to form a Domoticz device id when the node has no
/// explicitly configured device index.
const DOMOTICZ_DEVICE_ID_BASE: u32 = 2000;

/// A known sensor node and its current readings.
///
/// The kind is fixed at creation; only the current-value fields and the
/// timestamps mutate afterwards. Sensors outside the kind's schema stay
/// `None` forever, never stale values from another kind.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: u8,
    pub kind: NodeKind,
    pub name: Option<String>,
    pub domoticz_idx: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_seen_at: Option<OffsetDateTime>,
    pub temperature: Option<f64>,
    pub humidity: Option<u8>,
    pub light: Option<u8>,
    pub motion: Option<bool>,
    pub low_battery: Option<bool>,
    pub vcc: Option<u16>,
}

impl Node {
    pub fn new(id: u8, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            name: None,
            domoticz_idx: None,
            updated_at: None,
            last_seen_at: None,
            temperature: None,
            humidity: None,
            light: None,
            motion: None,
            low_battery: None,
            vcc: None,
        }
    }

    pub fn has_sensor(&self, sensor: Sensor) -> bool {
        self.kind.sensors().contains(&sensor)
    }

    /// Current reading for one sensor, if the kind reports it and a frame
    /// has arrived since creation.
    pub fn value(&self, sensor: Sensor) -> Option<Value> {
        match sensor {
            Sensor::Temperature => self.temperature.map(Value::Celsius),
            Sensor::Humidity => self.humidity.map(Value::Percent),
            Sensor::Light => self.light.map(Value::Percent),
            Sensor::Motion => self.motion.map(Value::Flag),
            Sensor::LowBattery => self.low_battery.map(Value::Flag),
            Sensor::SupplyVoltage => self.vcc.map(Value::Millivolts),
        }
    }

    /// Overwrite current values from decoded raw readings. Sensors outside
    /// this node's schema are ignored.
    pub fn apply_raw(&mut self, readings: &[(Sensor, u64)]) {
        for &(sensor, raw) in readings {
            if !self.has_sensor(sensor) {
                continue;
            }
            match (sensor, sensor.convert(raw)) {
                (Sensor::Temperature, Value::Celsius(v)) => self.temperature = Some(v),
                (Sensor::Humidity, Value::Percent(v)) => self.humidity = Some(v),
                (Sensor::Light, Value::Percent(v)) => self.light = Some(v),
                (Sensor::Motion, Value::Flag(v)) => self.motion = Some(v),
                (Sensor::LowBattery, Value::Flag(v)) => self.low_battery = Some(v),
                (Sensor::SupplyVoltage, Value::Millivolts(v)) => self.vcc = Some(v),
                // Sensor::convert always yields the variant for its sensor
                _ => {}
            }
        }
    }

    /// Human-readable dump of the current readings, in schema order.
    pub fn text_data(&self) -> String {
        self.kind
            .sensors()
            .iter()
            .map(|&sensor| match self.value(sensor) {
                Some(value) => format!("{}: {}", sensor.column(), value),
                None => format!("{}: -", sensor.column()),
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// The line broadcast to live subscribers after an update.
    pub fn snapshot_line(&self) -> String {
        format!(
            "[node {}][{}] {}",
            self.id,
            self.name.as_deref().unwrap_or("Unnamed"),
            self.text_data()
        )
    }

    /// Query parameters for a Domoticz `udevice` push, or `None` when the
    /// node has nothing Domoticz understands (it only speaks temperature and
    /// humidity) or no way to address a device.
    pub fn domoticz_params(&self, hardware_id: Option<&str>) -> Option<String> {
        let has_temp = self.has_sensor(Sensor::Temperature);
        let has_humi = self.has_sensor(Sensor::Humidity);
        if !has_temp && !has_humi {
            return None;
        }

        let mut params = match (&self.domoticz_idx, hardware_id) {
            (Some(idx), _) => format!("idx={idx}&nvalue=0&svalue="),
            (None, Some(hid)) => {
                let did = DOMOTICZ_DEVICE_ID_BASE + self.id as u32;
                // pTypeTEMP 0x50, pTypeHUM 0x51, pTypeTEMP_HUM 0x52
                let dtype = match (has_temp, has_humi) {
                    (true, true) => 82,
                    (false, true) => 81,
                    _ => 80,
                };
                format!("hid={hid}&did={did}&dunit=1&dtype={dtype}&dsubtype=1&nvalue=0&svalue=")
            }
            (None, None) => return None,
        };

        if has_temp {
            params.push_str(&format!("{:.1};", self.temperature.unwrap_or(0.0)));
        }
        if has_humi {
            params.push_str(&format!("{};", self.humidity.unwrap_or(0)));
        }
        params.push('0');

        Some(params)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Node {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let code: i64 = row.try_get("kind")?;
        let kind = NodeKind::from_code(code as u8).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "kind".to_string(),
            source: format!("unknown node kind code: {code}").into(),
        })?;

        Ok(Self {
            id: row.try_get::<i64, _>("id")? as u8,
            kind,
            name: row.try_get("name")?,
            domoticz_idx: row.try_get("domoticz_idx")?,
            updated_at: timestamp_column(row, "updated_at")?,
            last_seen_at: timestamp_column(row, "last_seen_at")?,
            temperature: row.try_get("temperature")?,
            humidity: row.try_get::<Option<i64>, _>("humidity")?.map(|v| v as u8),
            light: row.try_get::<Option<i64>, _>("light")?.map(|v| v as u8),
            motion: row.try_get("motion")?,
            low_battery: row.try_get("lowbat")?,
            vcc: row.try_get::<Option<i64>, _>("vcc")?.map(|v| v as u16),
        })
    }
}

pub struct NodeTable;

impl Table for NodeTable {
    fn name(&self) -> &'static str {
        "nodes"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                id INTEGER NOT NULL PRIMARY KEY,
                kind INTEGER NOT NULL,
                name TEXT,
                domoticz_idx TEXT,
                updated_at INTEGER,
                last_seen_at INTEGER,
                temperature REAL,
                humidity INTEGER,
                light INTEGER,
                motion INTEGER,
                lowbat INTEGER,
                vcc INTEGER
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS nodes;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
