use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    /// Optional directory with the built web app, served at `/`.
    pub web_app_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Serial {
    pub port: String,
    pub baud: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub url: String,
    pub clean_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// Seconds between history snapshots.
    pub period_secs: u64,
    /// Maximum age of a history row before it is trimmed.
    pub retention_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domoticz {
    pub host: String,
    pub port: u16,
    /// Domoticz virtual hardware id used to create devices on the fly for
    /// nodes without a configured device index.
    pub hardware_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub serial: Serial,
    pub database: Database,
    pub history: History,
    pub domoticz: Option<Domoticz>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("_"))
            .build()?
            .try_deserialize()
    }
}
