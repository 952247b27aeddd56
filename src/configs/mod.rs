mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{Database, Domoticz, History, Logger, Serial, Server, Settings};
pub use storage::Storage;
