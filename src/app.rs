use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::configs::Storage;
use crate::handles::*;
use crate::services::{Hub, NodeRegistry, PersistenceWriter};

pub fn create_app(
    registry: Arc<NodeRegistry>,
    storage: Arc<Storage>,
    writer: Arc<PersistenceWriter>,
    hub: Arc<Hub>,
    web_app_path: Option<String>,
) -> Router {
    let nodes = Router::new()
        .route("/", get(get_nodes))
        .route("/:node_id", get(get_node).put(update_node))
        .route("/:node_id/logs", get(get_node_logs))
        .route("/:node_id/temperatures", get(get_node_temperatures))
        .with_state(NodeState {
            registry,
            storage,
            writer,
        });

    let ws = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(WsState { hub });

    let mut app = Router::new()
        .nest("/api/nodes", nodes)
        .merge(ws)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    if let Some(path) = web_app_path {
        app = app.fallback_service(ServeDir::new(path));
    }

    app
}
