//! OpenTelemetry Protocol (OTLP) HTTP and gRPC trace endpoints

mod encoding;
mod grpc;
mod traces;

pub use grpc::OtlpGrpcServer;

use std::sync::Arc;

use axum::Router;
use axum::routing::post;

use crate::domain::traces::IngestService;

#[derive(Clone)]
pub struct OtlpState {
    pub ingest: Arc<IngestService>,
}

pub fn routes(ingest: Arc<IngestService>) -> Router {
    Router::new()
        .route("/traces", post(traces::export))
        .with_state(OtlpState { ingest })
}
