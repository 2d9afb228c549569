//! Replying flag endpoints

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::types::ApiError;
use crate::core::replying::ReplyingState;

/// Whether the assistant is currently producing a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReplyingBody {
    pub replying: bool,
}

/// Routes carry their full path and are merged into the root router
pub fn routes(replying: ReplyingState) -> Router<()> {
    Router::new()
        .route("/api/v1/replying", get(get_replying).put(set_replying))
        .with_state(replying)
}

#[utoipa::path(
    get,
    path = "/api/v1/replying",
    tag = "replying",
    responses(
        (status = 200, description = "Current replying flag", body = ReplyingBody)
    )
)]
pub async fn get_replying(State(replying): State<ReplyingState>) -> Json<ReplyingBody> {
    Json(ReplyingBody {
        replying: replying.get(),
    })
}

#[utoipa::path(
    put,
    path = "/api/v1/replying",
    tag = "replying",
    request_body = ReplyingBody,
    responses(
        (status = 200, description = "Flag updated; returns the new value", body = ReplyingBody),
        (status = 400, description = "Body is not `{\"replying\": bool}`")
    )
)]
pub async fn set_replying(
    State(replying): State<ReplyingState>,
    body: Result<Json<ReplyingBody>, JsonRejection>,
) -> Result<Json<ReplyingBody>, ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::bad_request("INVALID_BODY", e.body_text()))?;

    let previous = replying.set(body.replying);
    if previous != body.replying {
        tracing::debug!(replying = body.replying, "Replying flag changed");
    }

    Ok(Json(body))
}
