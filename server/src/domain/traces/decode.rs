//! Wire span decoder
//!
//! Pure functions turning one `WireSpan` into one `SpanData`. No I/O and no
//! shared state, so any number of request tasks may call them concurrently.
//!
//! Span attributes go through three stages:
//! 1. `decode_key_value_list` - wire key/values to a flat JSON map
//! 2. `parse_embedded_json` - string leaves holding JSON become structured
//! 3. `unflatten_attributes` - dotted keys become a nested tree
//!
//! Event attributes only go through stage 1.

use serde_json::{Number, Value as JsonValue};
use thiserror::Error;

use super::types::{Attributes, SpanData, SpanEvent, SpanKind, TraceStatus};
use super::unflatten::unflatten_attributes;
use super::wire::{
    AnyValueKind, WireAnyValue, WireBytes, WireEvent, WireId, WireInt, WireKeyValue, WireNanos,
    WireSpan, WireStatus, WireStatusCode,
};
use crate::utils::json::{get_path, scalar_to_string};
use crate::utils::otlp::{bytes_to_hex, decode_base64, status_code};
use crate::utils::time::{NANOS_PER_MILLI, millis_to_iso, nanos_to_millis};

/// Attribute path holding the span kind
pub const SPAN_KIND_PATH: &str = "span.kind";

/// Attribute path holding the owning run
pub const RUN_ID_PATH: &str = "project.run_id";

/// Failure while transforming a structurally valid span
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpanDecodeError {
    #[error("missing timestamp")]
    MissingTimestamp,

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("timestamp {0}ms is out of range")]
    TimestampOutOfRange(i64),

    #[error("invalid integer attribute value '{0}'")]
    InvalidInt(String),

    #[error("invalid bytes attribute value: {0}")]
    InvalidBytes(String),
}

// ============================================================================
// SCALARS
// ============================================================================

/// Identifier as text: strings pass through, bytes become lowercase hex
pub fn decode_identifier(raw: Option<&WireId>) -> String {
    match raw {
        None => String::new(),
        Some(WireId::Text(s)) => s.clone(),
        Some(WireId::Bytes(bytes)) => bytes_to_hex(bytes),
    }
}

/// Whole milliseconds since epoch, truncated toward zero
pub fn timestamp_millis(raw: &WireNanos) -> Result<i64, SpanDecodeError> {
    match raw {
        WireNanos::Int(nanos) => Ok(nanos_to_millis(*nanos)),
        WireNanos::Float(nanos) => float_nanos_to_millis(*nanos, raw),
        WireNanos::Text(text) => {
            let trimmed = text.trim();
            if let Ok(nanos) = trimmed.parse::<u64>() {
                return Ok(nanos_to_millis(nanos));
            }
            match trimmed.parse::<f64>() {
                Ok(nanos) => float_nanos_to_millis(nanos, raw),
                Err(_) => Err(SpanDecodeError::InvalidTimestamp(text.clone())),
            }
        }
    }
}

fn float_nanos_to_millis(nanos: f64, raw: &WireNanos) -> Result<i64, SpanDecodeError> {
    let millis = (nanos / NANOS_PER_MILLI as f64).trunc();
    if !millis.is_finite() || millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return Err(SpanDecodeError::InvalidTimestamp(format!("{:?}", raw)));
    }
    Ok(millis as i64)
}

fn format_millis(millis: i64) -> Result<String, SpanDecodeError> {
    millis_to_iso(millis).ok_or(SpanDecodeError::TimestampOutOfRange(millis))
}

/// Nanosecond timestamp to an ISO-8601 instant with millisecond precision
pub fn decode_timestamp(raw: &WireNanos) -> Result<String, SpanDecodeError> {
    format_millis(timestamp_millis(raw)?)
}

// ============================================================================
// KEY/VALUE LISTS
// ============================================================================

/// Decode a wire key/value list into a flat map. Later duplicates win.
pub fn decode_key_value_list(list: &[WireKeyValue]) -> Result<Attributes, SpanDecodeError> {
    let mut map = Attributes::new();
    for kv in list {
        let value = match &kv.value {
            Some(value) => decode_any_value(value)?,
            None => JsonValue::Null,
        };
        map.insert(kv.key.clone(), value);
    }
    Ok(map)
}

/// Decode one tagged any-value into its JSON equivalent
pub fn decode_any_value(value: &WireAnyValue) -> Result<JsonValue, SpanDecodeError> {
    Ok(match value.resolve() {
        AnyValueKind::String(s) => JsonValue::String(s.to_string()),
        AnyValueKind::Bool(b) => JsonValue::Bool(b),
        AnyValueKind::Int(WireInt::Int(i)) => JsonValue::from(*i),
        AnyValueKind::Int(WireInt::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(JsonValue::from)
            .map_err(|_| SpanDecodeError::InvalidInt(text.clone()))?,
        AnyValueKind::Double(d) => Number::from_f64(d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        AnyValueKind::Array(values) => JsonValue::Array(
            values
                .iter()
                .map(decode_any_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        AnyValueKind::KvList(values) => JsonValue::Object(decode_key_value_list(values)?),
        AnyValueKind::Bytes(WireBytes::Raw(bytes)) => JsonValue::String(bytes_to_hex(bytes)),
        AnyValueKind::Bytes(WireBytes::Base64(encoded)) => {
            let bytes = decode_base64(encoded)
                .map_err(|e| SpanDecodeError::InvalidBytes(e.to_string()))?;
            JsonValue::String(bytes_to_hex(&bytes))
        }
        AnyValueKind::Empty => JsonValue::Null,
    })
}

// ============================================================================
// ATTRIBUTE NORMALIZATION
// ============================================================================

/// Replace every string leaf that holds valid JSON with the parsed value.
/// Parsed output is not parsed again.
pub fn parse_embedded_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) => match serde_json::from_str::<JsonValue>(&s) {
            Ok(parsed) => parsed,
            Err(_) => JsonValue::String(s),
        },
        JsonValue::Array(items) => {
            JsonValue::Array(items.into_iter().map(parse_embedded_json).collect())
        }
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .map(|(k, v)| (k, parse_embedded_json(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Full span attribute pipeline: decode, parse embedded JSON, unflatten
pub fn normalize_attributes(list: &[WireKeyValue]) -> Result<Attributes, SpanDecodeError> {
    let flat: Attributes = decode_key_value_list(list)?
        .into_iter()
        .map(|(k, v)| (k, parse_embedded_json(v)))
        .collect();
    Ok(unflatten_attributes(flat))
}

/// Span kind at `span.kind`; COMMON unless it names a known kind exactly
pub fn derive_span_kind(attributes: &Attributes) -> SpanKind {
    get_path(attributes, SPAN_KIND_PATH)
        .and_then(JsonValue::as_str)
        .and_then(SpanKind::parse)
        .unwrap_or_default()
}

/// Run id at `project.run_id`; empty when absent or not a scalar
pub fn derive_run_id(attributes: &Attributes) -> String {
    get_path(attributes, RUN_ID_PATH)
        .and_then(scalar_to_string)
        .unwrap_or_default()
}

// ============================================================================
// STATUS & EVENTS
// ============================================================================

/// Map the wire status to `TraceStatus` and its message
pub fn decode_status(raw: Option<&WireStatus>) -> (TraceStatus, String) {
    let Some(status) = raw else {
        return (TraceStatus::Unset, String::new());
    };

    let code = match &status.code {
        Some(WireStatusCode::Number(status_code::OK)) => TraceStatus::Ok,
        Some(WireStatusCode::Number(status_code::ERROR)) => TraceStatus::Error,
        Some(WireStatusCode::Name(name)) => match name.as_str() {
            status_code::OK_NAME => TraceStatus::Ok,
            status_code::ERROR_NAME => TraceStatus::Error,
            _ => TraceStatus::Unset,
        },
        _ => TraceStatus::Unset,
    };

    (code, status.message.clone().unwrap_or_default())
}

/// Decode an event. Attributes stay flat and unparsed.
pub fn decode_event(event: &WireEvent) -> Result<SpanEvent, SpanDecodeError> {
    let timestamp = match &event.time_unix_nano {
        Some(nanos) => decode_timestamp(nanos)?,
        None => format_millis(0)?,
    };

    Ok(SpanEvent {
        name: event.name.clone().unwrap_or_default(),
        timestamp,
        attributes: decode_key_value_list(&event.attributes)?,
    })
}

// ============================================================================
// SPAN
// ============================================================================

/// Decode a span. Callers should validate first; this only fails on
/// values that cannot be converted.
pub fn decode_span(span: &WireSpan) -> Result<SpanData, SpanDecodeError> {
    let id = decode_identifier(span.span_id.as_ref());
    let trace_id = decode_identifier(span.trace_id.as_ref());
    let parent_span_id = decode_identifier(span.parent_span_id.as_ref());

    let start_ms = timestamp_millis(
        span.start_time_unix_nano
            .as_ref()
            .ok_or(SpanDecodeError::MissingTimestamp)?,
    )?;
    let end_ms = timestamp_millis(
        span.end_time_unix_nano
            .as_ref()
            .ok_or(SpanDecodeError::MissingTimestamp)?,
    )?;
    let start_time = format_millis(start_ms)?;
    let end_time = format_millis(end_ms)?;
    let latency_ms = end_ms.saturating_sub(start_ms) as f64;

    let attributes = normalize_attributes(&span.attributes)?;
    let span_kind = derive_span_kind(&attributes);
    let run_id = derive_run_id(&attributes);

    let (status, status_message) = decode_status(span.status.as_ref());

    let events = span
        .events
        .iter()
        .map(decode_event)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SpanData {
        id,
        trace_id,
        run_id,
        parent_span_id,
        name: span.name.clone().unwrap_or_default(),
        span_kind,
        attributes,
        start_time,
        end_time,
        latency_ms,
        status,
        status_message,
        events,
    })
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
