//! In-memory OTLP span graph consumed by the decoder
//!
//! Built from two sources:
//! - protobuf messages (`opentelemetry-proto`), via the `From` impls below
//! - OTLP/JSON, via serde. Both the canonical camelCase field names and the
//!   snake_case protobuf names are accepted, and identifiers, timestamps and
//!   integers may arrive as strings or numbers.
//!
//! Every field is optional here. Required-field checks belong to the batch
//! validator, not to deserialization.

use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::{
    AnyValue, ArrayValue, KeyValue, KeyValueList, any_value,
};
use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span, Status, span};
use serde::Deserialize;

// ============================================================================
// SCALAR UNIONS
// ============================================================================

/// Span, trace or parent identifier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Bytes(Vec<u8>),
}

impl WireId {
    pub fn is_empty(&self) -> bool {
        match self {
            WireId::Text(s) => s.is_empty(),
            WireId::Bytes(b) => b.is_empty(),
        }
    }
}

/// Nanoseconds since the Unix epoch
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireNanos {
    Int(u64),
    Float(f64),
    Text(String),
}

impl WireNanos {
    /// Zero and the empty string count as absent
    pub fn is_present(&self) -> bool {
        match self {
            WireNanos::Int(n) => *n != 0,
            WireNanos::Float(f) => *f != 0.0,
            WireNanos::Text(s) => !s.is_empty(),
        }
    }

    /// Numeric value, if the input coerces to a finite number
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            WireNanos::Int(n) => *n as f64,
            WireNanos::Float(f) => *f,
            WireNanos::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// 64-bit integer; OTLP/JSON encodes these as strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireInt {
    Int(i64),
    Text(String),
}

/// Raw bytes; OTLP/JSON encodes these as base64
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireBytes {
    Base64(String),
    Raw(Vec<u8>),
}

/// Status code, numeric or by enum name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireStatusCode {
    Number(i64),
    Name(String),
}

// ============================================================================
// ANY VALUE
// ============================================================================

/// Tagged attribute value as it appears on the wire.
///
/// Producers are expected to set exactly one tag. `resolve` picks one
/// deterministically when they don't.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireAnyValue {
    #[serde(alias = "string_value")]
    pub string_value: Option<String>,
    #[serde(alias = "bool_value")]
    pub bool_value: Option<bool>,
    #[serde(alias = "int_value")]
    pub int_value: Option<WireInt>,
    #[serde(alias = "double_value")]
    pub double_value: Option<f64>,
    #[serde(alias = "array_value")]
    pub array_value: Option<WireArrayValue>,
    #[serde(alias = "kvlist_value")]
    pub kvlist_value: Option<WireKeyValueList>,
    #[serde(alias = "bytes_value")]
    pub bytes_value: Option<WireBytes>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WireArrayValue {
    pub values: Vec<WireAnyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WireKeyValueList {
    pub values: Vec<WireKeyValue>,
}

/// The single tag selected from a `WireAnyValue`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnyValueKind<'a> {
    String(&'a str),
    Bool(bool),
    Int(&'a WireInt),
    Double(f64),
    Array(&'a [WireAnyValue]),
    KvList(&'a [WireKeyValue]),
    Bytes(&'a WireBytes),
    Empty,
}

impl WireAnyValue {
    /// Select the value tag: string, bool, int, double, array, kvlist, bytes.
    pub fn resolve(&self) -> AnyValueKind<'_> {
        if let Some(s) = &self.string_value {
            AnyValueKind::String(s)
        } else if let Some(b) = self.bool_value {
            AnyValueKind::Bool(b)
        } else if let Some(i) = &self.int_value {
            AnyValueKind::Int(i)
        } else if let Some(d) = self.double_value {
            AnyValueKind::Double(d)
        } else if let Some(arr) = &self.array_value {
            AnyValueKind::Array(&arr.values)
        } else if let Some(kv) = &self.kvlist_value {
            AnyValueKind::KvList(&kv.values)
        } else if let Some(bytes) = &self.bytes_value {
            AnyValueKind::Bytes(bytes)
        } else {
            AnyValueKind::Empty
        }
    }
}

// ============================================================================
// SPAN GRAPH
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WireKeyValue {
    pub key: String,
    pub value: Option<WireAnyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WireStatus {
    pub code: Option<WireStatusCode>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireEvent {
    #[serde(alias = "time_unix_nano")]
    pub time_unix_nano: Option<WireNanos>,
    pub name: Option<String>,
    pub attributes: Vec<WireKeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireSpan {
    #[serde(alias = "trace_id")]
    pub trace_id: Option<WireId>,
    #[serde(alias = "span_id")]
    pub span_id: Option<WireId>,
    #[serde(alias = "parent_span_id")]
    pub parent_span_id: Option<WireId>,
    pub name: Option<String>,
    #[serde(alias = "start_time_unix_nano")]
    pub start_time_unix_nano: Option<WireNanos>,
    #[serde(alias = "end_time_unix_nano")]
    pub end_time_unix_nano: Option<WireNanos>,
    pub attributes: Vec<WireKeyValue>,
    pub events: Vec<WireEvent>,
    pub status: Option<WireStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireScopeSpans {
    pub spans: Vec<WireSpan>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireResourceSpans {
    pub scope_spans: Vec<WireScopeSpans>,
}

// ============================================================================
// PROTOBUF CONVERSIONS
// ============================================================================

/// Flatten a decoded protobuf export request into resource-span groups
pub fn from_export_request(request: ExportTraceServiceRequest) -> Vec<WireResourceSpans> {
    request
        .resource_spans
        .into_iter()
        .map(WireResourceSpans::from)
        .collect()
}

impl From<ResourceSpans> for WireResourceSpans {
    fn from(rs: ResourceSpans) -> Self {
        Self {
            scope_spans: rs.scope_spans.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ScopeSpans> for WireScopeSpans {
    fn from(ss: ScopeSpans) -> Self {
        Self {
            spans: ss.spans.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Span> for WireSpan {
    fn from(span: Span) -> Self {
        Self {
            trace_id: Some(WireId::Bytes(span.trace_id)),
            span_id: Some(WireId::Bytes(span.span_id)),
            parent_span_id: (!span.parent_span_id.is_empty())
                .then_some(WireId::Bytes(span.parent_span_id)),
            name: Some(span.name),
            start_time_unix_nano: Some(WireNanos::Int(span.start_time_unix_nano)),
            end_time_unix_nano: Some(WireNanos::Int(span.end_time_unix_nano)),
            attributes: span.attributes.into_iter().map(Into::into).collect(),
            events: span.events.into_iter().map(Into::into).collect(),
            status: span.status.map(Into::into),
        }
    }
}

impl From<span::Event> for WireEvent {
    fn from(event: span::Event) -> Self {
        Self {
            time_unix_nano: Some(WireNanos::Int(event.time_unix_nano)),
            name: Some(event.name),
            attributes: event.attributes.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Status> for WireStatus {
    fn from(status: Status) -> Self {
        Self {
            code: Some(WireStatusCode::Number(i64::from(status.code))),
            message: Some(status.message),
        }
    }
}

impl From<KeyValue> for WireKeyValue {
    fn from(kv: KeyValue) -> Self {
        Self {
            key: kv.key,
            value: kv.value.map(Into::into),
        }
    }
}

impl From<AnyValue> for WireAnyValue {
    fn from(value: AnyValue) -> Self {
        let mut wire = WireAnyValue::default();
        match value.value {
            Some(any_value::Value::StringValue(s)) => wire.string_value = Some(s),
            Some(any_value::Value::BoolValue(b)) => wire.bool_value = Some(b),
            Some(any_value::Value::IntValue(i)) => wire.int_value = Some(WireInt::Int(i)),
            Some(any_value::Value::DoubleValue(d)) => wire.double_value = Some(d),
            Some(any_value::Value::ArrayValue(ArrayValue { values })) => {
                wire.array_value = Some(WireArrayValue {
                    values: values.into_iter().map(Into::into).collect(),
                })
            }
            Some(any_value::Value::KvlistValue(KeyValueList { values })) => {
                wire.kvlist_value = Some(WireKeyValueList {
                    values: values.into_iter().map(Into::into).collect(),
                })
            }
            Some(any_value::Value::BytesValue(b)) => wire.bytes_value = Some(WireBytes::Raw(b)),
            None => {}
        }
        wire
    }
}
