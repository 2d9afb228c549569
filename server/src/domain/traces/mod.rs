//! OTLP trace ingestion
//!
//! - `wire` - Lenient OTLP object graph built from protobuf or JSON
//! - `decode` - One wire span to one `SpanData`
//! - `unflatten` - Dotted attribute keys to nested objects
//! - `batch` - Resource/scope/span walk with per-span failure isolation
//! - `ingest` - Storage and run-room hand-off
//!
//! Everything up to `batch` is synchronous and free of shared state.

pub mod batch;
pub mod decode;
pub mod ingest;
mod types;
pub mod unflatten;
pub mod wire;

pub use batch::{SpanRejection, process_batch, process_json_batch, safe_decode, validate_span};
pub use decode::{SpanDecodeError, decode_span};
pub use ingest::{IngestError, IngestOutcome, IngestService};
pub use types::{Attributes, SpanBatch, SpanData, SpanEvent, SpanKind, TraceStatus, run_room};
pub use wire::from_export_request;
