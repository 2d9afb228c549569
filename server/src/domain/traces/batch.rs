//! Batch processor
//!
//! Walks an export payload (resource groups → scope groups → spans),
//! validates and decodes every span, and collects the survivors in input
//! order. A bad span is logged and counted, never fatal to its siblings.
//!
//! | Failure                         | Log      | Effect                     |
//! |---------------------------------|----------|----------------------------|
//! | missing/invalid required field  | `warn!`  | span dropped, counted      |
//! | decode failure                  | `error!` | span dropped, counted      |
//! | nested list not an array (JSON) | `warn!`  | group skipped              |
//! | outer list not an array (JSON)  | `error!` | empty batch                |

use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::decode::{decode_identifier, decode_span};
use super::types::{SpanBatch, SpanData};
use super::wire::{WireNanos, WireResourceSpans, WireSpan};
use crate::utils::json::get_either;

/// Why a span failed the structural check
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpanRejection {
    #[error("missing trace id")]
    MissingTraceId,

    #[error("missing span id")]
    MissingSpanId,

    #[error("missing name")]
    MissingName,

    #[error("missing start time")]
    MissingStartTime,

    #[error("missing end time")]
    MissingEndTime,

    #[error("start time is not numeric")]
    NonNumericStartTime,

    #[error("end time is not numeric")]
    NonNumericEndTime,
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Structural check run before decoding
pub fn validate_span(span: &WireSpan) -> Result<(), SpanRejection> {
    if span.trace_id.as_ref().is_none_or(|id| id.is_empty()) {
        return Err(SpanRejection::MissingTraceId);
    }
    if span.span_id.as_ref().is_none_or(|id| id.is_empty()) {
        return Err(SpanRejection::MissingSpanId);
    }
    if span.name.as_deref().is_none_or(str::is_empty) {
        return Err(SpanRejection::MissingName);
    }

    check_timestamp(
        span.start_time_unix_nano.as_ref(),
        SpanRejection::MissingStartTime,
        SpanRejection::NonNumericStartTime,
    )?;
    check_timestamp(
        span.end_time_unix_nano.as_ref(),
        SpanRejection::MissingEndTime,
        SpanRejection::NonNumericEndTime,
    )
}

fn check_timestamp(
    nanos: Option<&WireNanos>,
    missing: SpanRejection,
    non_numeric: SpanRejection,
) -> Result<(), SpanRejection> {
    match nanos {
        Some(nanos) if nanos.is_present() => nanos.as_f64().map(|_| ()).ok_or(non_numeric),
        _ => Err(missing),
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Validate then decode one span. Failures are logged and yield `None`.
pub fn safe_decode(span: &WireSpan) -> Option<SpanData> {
    if let Err(reason) = validate_span(span) {
        tracing::warn!(
            span_id = %decode_identifier(span.span_id.as_ref()),
            reason = %reason,
            "Dropping invalid span"
        );
        return None;
    }

    match decode_span(span) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::error!(
                span_id = %decode_identifier(span.span_id.as_ref()),
                error = %e,
                "Failed to decode span"
            );
            None
        }
    }
}

fn collect(batch: &mut SpanBatch, span: &WireSpan) {
    match safe_decode(span) {
        Some(data) => batch.spans.push(data),
        None => batch.rejected += 1,
    }
}

/// Process typed resource-span groups (protobuf intake)
pub fn process_batch(groups: &[WireResourceSpans]) -> SpanBatch {
    let mut batch = SpanBatch::default();
    for group in groups {
        for scope in &group.scope_spans {
            for span in &scope.spans {
                collect(&mut batch, span);
            }
        }
    }
    log_outcome(&batch);
    batch
}

/// Process an OTLP/JSON export payload without trusting its shape
pub fn process_json_batch(payload: &JsonValue) -> SpanBatch {
    let mut batch = SpanBatch::default();

    let groups = match get_either(payload, "resourceSpans", "resource_spans") {
        None | Some(JsonValue::Null) => return batch,
        Some(JsonValue::Array(groups)) => groups,
        Some(other) => {
            tracing::error!(
                found = json_type(other),
                "Malformed trace export: resourceSpans is not an array"
            );
            return batch;
        }
    };

    for group in groups {
        for scope in nested_list(group, "scopeSpans", "scope_spans") {
            for raw in nested_list(scope, "spans", "spans") {
                match WireSpan::deserialize(raw) {
                    Ok(span) => collect(&mut batch, &span),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read span from JSON payload");
                        batch.rejected += 1;
                    }
                }
            }
        }
    }

    log_outcome(&batch);
    batch
}

fn nested_list<'a>(value: &'a JsonValue, camel: &str, snake: &str) -> &'a [JsonValue] {
    match get_either(value, camel, snake) {
        None | Some(JsonValue::Null) => &[],
        Some(JsonValue::Array(items)) => items.as_slice(),
        Some(other) => {
            tracing::warn!(
                field = camel,
                found = json_type(other),
                "Skipping group with malformed nested list"
            );
            &[]
        }
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn log_outcome(batch: &SpanBatch) {
    if batch.rejected > 0 {
        tracing::warn!(
            accepted = batch.len(),
            rejected = batch.rejected,
            "Trace batch had rejected spans"
        );
    } else {
        tracing::debug!(accepted = batch.len(), "Trace batch processed");
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
