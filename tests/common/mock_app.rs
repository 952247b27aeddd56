use std::sync::Arc;

use axum::Router;

use jeehub::app::create_app;
use jeehub::configs::{Database, SchemaManager, Storage};
use jeehub::services::{GatewayService, Hub, NodeRegistry, PersistenceWriter};

/// Test harness wiring the gateway against an in-memory store, an inline
/// (synchronous) persistence writer and a small hub.
pub struct MockApp {
    pub storage: Arc<Storage>,
    pub registry: Arc<NodeRegistry>,
    pub writer: Arc<PersistenceWriter>,
    pub hub: Arc<Hub>,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        let storage = Arc::new(
            Storage::new(
                Database {
                    url: String::from("sqlite::memory:"),
                    clean_start: true,
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        );

        let registry = Arc::new(NodeRegistry::new());
        let writer = Arc::new(PersistenceWriter::inline(storage.clone()));
        let hub = Arc::new(Hub::spawn(8));

        let router = create_app(
            registry.clone(),
            storage.clone(),
            writer.clone(),
            hub.clone(),
            None,
        );

        Self {
            storage,
            registry,
            writer,
            hub,
            router,
        }
    }

    /// Push one serial line through the full ingestion pipeline.
    pub async fn ingest(&self, line: &str) {
        GatewayService::process_line(line, &self.registry, &self.writer, &self.hub, None).await;
    }
}
