//! Run span endpoints: stored history and live stream

pub mod sse;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::watch;

use crate::api::types::{ApiError, validate_run_id};
use crate::domain::traces::{IngestService, SpanData};

/// Shared state for run endpoints
#[derive(Clone)]
pub struct RunsApiState {
    pub ingest: Arc<IngestService>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Build run routes
pub fn routes(ingest: Arc<IngestService>, shutdown_rx: watch::Receiver<bool>) -> Router<()> {
    Router::new()
        .route("/{run_id}/spans", get(list_run_spans))
        .route("/{run_id}/spans/stream", get(sse::stream_run_spans))
        .with_state(RunsApiState {
            ingest,
            shutdown_rx,
        })
}

/// Stored spans of a run, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/runs/{run_id}/spans",
    tag = "runs",
    params(
        ("run_id" = String, Path, description = "Run ID")
    ),
    responses(
        (status = 200, description = "Spans of the run ordered by start time", body = Vec<SpanData>),
        (status = 400, description = "Invalid run ID"),
        (status = 503, description = "Span store unavailable")
    )
)]
pub async fn list_run_spans(
    State(state): State<RunsApiState>,
    Path(run_id): Path<String>,
) -> Result<Json<Vec<SpanData>>, ApiError> {
    validate_run_id(&run_id)?;

    let spans = state
        .ingest
        .store()
        .list_run_spans(&run_id)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(spans))
}
