use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use time::format_description::well_known::Rfc3339;

use crate::configs::Storage;
use crate::errors::ApiError;
use crate::repositories::NodeLogRepository;
use crate::services::{NodeRegistry, PersistenceWriter};

#[derive(Clone)]
pub struct NodeState {
    pub registry: Arc<NodeRegistry>,
    pub storage: Arc<Storage>,
    pub writer: Arc<PersistenceWriter>,
}

#[derive(Debug, Deserialize)]
pub struct NodeBody {
    pub name: Option<String>,
    pub domoticz_idx: Option<String>,
}

pub async fn get_nodes(State(state): State<NodeState>) -> impl IntoResponse {
    Json(state.registry.all().await)
}

pub async fn get_node(
    Path(node_id): Path<u8>,
    State(state): State<NodeState>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .registry
        .lookup(node_id)
        .await
        .map(Json)
        .ok_or(ApiError::NodeNotFound(node_id))
}

pub async fn update_node(
    Path(node_id): Path<u8>,
    State(state): State<NodeState>,
    Json(body): Json<NodeBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .registry
        .update_details(node_id, body.name, body.domoticz_idx, &state.writer)
        .await
        .map(Json)
        .ok_or(ApiError::NodeNotFound(node_id))
}

pub async fn get_node_logs(
    Path(node_id): Path<u8>,
    State(state): State<NodeState>,
) -> Result<impl IntoResponse, ApiError> {
    if state.registry.lookup(node_id).await.is_none() {
        return Err(ApiError::NodeNotFound(node_id));
    }

    let logs = NodeLogRepository::new(state.storage.clone())
        .find_by_node(node_id)
        .await?;

    Ok(Json(logs))
}

/// Temperature time series as `[timestamp, value]` pairs, ready for a chart.
pub async fn get_node_temperatures(
    Path(node_id): Path<u8>,
    State(state): State<NodeState>,
) -> Result<impl IntoResponse, ApiError> {
    if state.registry.lookup(node_id).await.is_none() {
        return Err(ApiError::NodeNotFound(node_id));
    }

    let logs = NodeLogRepository::new(state.storage.clone())
        .find_by_node(node_id)
        .await?;

    let series: Vec<_> = logs
        .iter()
        .map(|log| {
            let at = log.at.format(&Rfc3339).unwrap_or_default();
            json!([at, log.temperature])
        })
        .collect();

    Ok(Json(series))
}
