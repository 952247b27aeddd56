mod domoticz_service;
mod gateway_service;
mod hub_service;
mod registry_service;
mod serial_service;
mod ticker_service;
mod writer_service;

pub use domoticz_service::*;
pub use gateway_service::*;
pub use hub_service::*;
pub use registry_service::*;
pub use serial_service::*;
pub use ticker_service::*;
pub use writer_service::*;
