//! Domain logic for run monitoring
//!
//! - `traces` - OTLP span decoding, normalization and ingestion

pub mod traces;

pub use traces::{IngestOutcome, IngestService, SpanBatch, SpanData};
