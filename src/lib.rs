use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::app::create_app;
use crate::configs::{SchemaManager, Settings, Storage};
use crate::services::{
    DomoticzService, GatewayService, HistoryTicker, Hub, NodeRegistry, PersistenceWriter,
    SerialReader, SUBSCRIBER_BUFFER,
};

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod models;
pub mod radio;
pub mod repositories;
pub mod services;

pub async fn run(settings: &Arc<Settings>) {
    let storage = Arc::new(
        Storage::new(settings.database.clone(), SchemaManager::default())
            .await
            .expect("Failed to open database."),
    );

    let registry = Arc::new(
        NodeRegistry::load(storage.clone())
            .await
            .expect("Failed to load nodes."),
    );

    let writer = Arc::new(PersistenceWriter::spawn(storage.clone()));
    let hub = Arc::new(Hub::spawn(SUBSCRIBER_BUFFER));
    let domoticz = settings
        .domoticz
        .clone()
        .map(|config| Arc::new(DomoticzService::new(config)));

    let lines = SerialReader::spawn(settings.serial.clone());
    GatewayService::spawn(
        lines,
        registry.clone(),
        writer.clone(),
        hub.clone(),
        domoticz,
    );

    HistoryTicker::spawn(
        Duration::from_secs(settings.history.period_secs),
        time::Duration::seconds(settings.history.retention_secs as i64),
        registry.clone(),
        writer.clone(),
        hub.clone(),
    );

    let app = create_app(
        registry,
        storage,
        writer,
        hub,
        settings.server.web_app_path.clone(),
    );

    let ip_addr = settings.server.host.parse::<IpAddr>().unwrap();

    let address = SocketAddr::from((ip_addr, settings.server.port));

    let listener = TcpListener::bind(&address).await.unwrap();

    tracing::info!("listening on {:?}", address);

    axum::serve(listener, app).await.unwrap();
}
