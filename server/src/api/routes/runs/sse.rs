//! SSE endpoint for live spans of one run
//!
//! Each connection joins room `run-{run_id}` and leaves it when the client
//! disconnects (the subscription is dropped with the stream).

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;

use super::RunsApiState;
use crate::api::types::{ApiError, validate_run_id};
use crate::core::constants::SSE_KEEPALIVE_SECS;
use crate::data::TopicError;
use crate::domain::traces::run_room;

#[utoipa::path(
    get,
    path = "/api/v1/runs/{run_id}/spans/stream",
    tag = "runs",
    params(
        ("run_id" = String, Path, description = "Run ID")
    ),
    responses(
        (status = 200, description = "Server-Sent Events stream; each `span` event carries one span", body = String, content_type = "text/event-stream"),
        (status = 400, description = "Invalid run ID")
    )
)]
pub async fn stream_run_spans(
    State(state): State<RunsApiState>,
    Path(run_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    validate_run_id(&run_id)?;

    let room = run_room(&run_id);
    let mut subscription = state.ingest.rooms().subscribe(&room);
    let mut shutdown_rx = state.shutdown_rx.clone();
    tracing::debug!(room = %room, "SSE client joined run room");

    let stream = async_stream::stream! {
        // A server already shutting down never sends another change
        if *shutdown_rx.borrow() {
            yield Ok(Event::default().event("terminate").data("shutdown"));
            return;
        }

        loop {
            tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        // Notify client before closing so it can reconnect immediately
                        yield Ok(Event::default().event("terminate").data("shutdown"));
                        break;
                    }
                }
                result = subscription.recv() => {
                    match result {
                        Ok(span) => match serde_json::to_string(&span) {
                            Ok(data) => yield Ok(Event::default().event("span").data(data)),
                            Err(e) => {
                                tracing::error!(span_id = %span.id, error = %e, "Failed to serialize SSE span");
                            }
                        },
                        Err(TopicError::Lagged(n)) => {
                            tracing::warn!(room = %subscription.room(), lagged = n, "SSE subscriber lagged behind");
                        }
                        Err(TopicError::ChannelClosed) => break,
                    }
                }
            }
        }

        tracing::debug!(room = %subscription.room(), "SSE stream closed");
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEPALIVE_SECS))
            .text("keep-alive"),
    ))
}
