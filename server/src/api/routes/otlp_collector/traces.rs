//! Traces export endpoint

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;

use super::OtlpState;
use super::encoding::{
    DecodeError, OtlpContentType, decode_json, decode_protobuf, success_response,
};
use crate::core::constants::STORE_UNAVAILABLE_RETRY_AFTER_SECS;
use crate::domain::traces::{SpanBatch, from_export_request, process_batch, process_json_batch};
use crate::utils::otlp::export_response;

pub async fn export(
    State(state): State<OtlpState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = OtlpContentType::from_headers(&headers);

    let batch = match decode_batch(&body, content_type) {
        Ok(batch) => batch,
        Err(e) => return e.into_response(content_type),
    };

    let outcome = match state.ingest.ingest(batch).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting trace export");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                [(
                    HeaderName::from_static("retry-after"),
                    STORE_UNAVAILABLE_RETRY_AFTER_SECS.to_string(),
                )],
            )
                .into_response();
        }
    };

    success_response(&export_response(outcome.rejected), content_type)
}

/// Decode an export body into a span batch
fn decode_batch(body: &Bytes, content_type: OtlpContentType) -> Result<SpanBatch, DecodeError> {
    match content_type {
        OtlpContentType::Protobuf => {
            let request: ExportTraceServiceRequest = decode_protobuf(body)?;
            Ok(process_batch(&from_export_request(request)))
        }
        OtlpContentType::Json => Ok(process_json_batch(&decode_json(body)?)),
    }
}
