//! Canonical span record produced by the ingestion pipeline

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;

use crate::core::constants::RUN_ROOM_PREFIX;

/// Nested attribute tree
pub type Attributes = Map<String, JsonValue>;

// ============================================================================
// SPAN KIND
// ============================================================================

/// Role of a span within an agent run.
///
/// Derived from the `span.kind` attribute, not from the OTLP span kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpanKind {
    Agent,
    Tool,
    Llm,
    Embedding,
    Formatter,
    #[default]
    Common,
}

impl SpanKind {
    pub const ALL: [SpanKind; 6] = [
        SpanKind::Agent,
        SpanKind::Tool,
        SpanKind::Llm,
        SpanKind::Embedding,
        SpanKind::Formatter,
        SpanKind::Common,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Agent => "AGENT",
            SpanKind::Tool => "TOOL",
            SpanKind::Llm => "LLM",
            SpanKind::Embedding => "EMBEDDING",
            SpanKind::Formatter => "FORMATTER",
            SpanKind::Common => "COMMON",
        }
    }

    /// Exact, case-sensitive match against the known kinds
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TRACE STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TraceStatus {
    Ok,
    Error,
    #[default]
    Unset,
}

impl TraceStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TraceStatus::Ok => "OK",
            TraceStatus::Error => "ERROR",
            TraceStatus::Unset => "UNSET",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(TraceStatus::Ok),
            "ERROR" => Some(TraceStatus::Error),
            "UNSET" => Some(TraceStatus::Unset),
            _ => None,
        }
    }
}

impl fmt::Display for TraceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SPAN RECORDS
// ============================================================================

/// Timestamped annotation on a span. Attributes stay flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpanEvent {
    pub name: String,
    pub timestamp: String,
    #[schema(value_type = Object)]
    pub attributes: Attributes,
}

/// A decoded span, ready for storage and broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpanData {
    pub id: String,
    pub trace_id: String,
    pub run_id: String,
    pub parent_span_id: String,
    pub name: String,
    pub span_kind: SpanKind,
    #[schema(value_type = Object)]
    pub attributes: Attributes,
    pub start_time: String,
    pub end_time: String,
    pub latency_ms: f64,
    pub status: TraceStatus,
    pub status_message: String,
    pub events: Vec<SpanEvent>,
}

impl SpanData {
    /// Broadcast room for this span, `None` for orphaned spans
    pub fn room(&self) -> Option<String> {
        if self.run_id.is_empty() {
            None
        } else {
            Some(run_room(&self.run_id))
        }
    }
}

/// Room name that live subscribers of a run join
pub fn run_room(run_id: &str) -> String {
    format!("{}{}", RUN_ROOM_PREFIX, run_id)
}

// ============================================================================
// BATCH RESULT
// ============================================================================

/// Outcome of processing one export payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanBatch {
    /// Decoded spans, in input order
    pub spans: Vec<SpanData>,
    /// Spans dropped by validation or decoding
    pub rejected: usize,
}

impl SpanBatch {
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
