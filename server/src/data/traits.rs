//! Repository traits for database backends
//!
//! Services hold a `dyn` repository so tests and alternative backends can
//! stand in for SQLite.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::domain::traces::SpanData;

/// Span persistence, keyed by span id and grouped by run id
#[async_trait]
pub trait SpanRepository: Send + Sync {
    /// Insert or replace spans by id. Returns the number of rows written.
    async fn save_spans(&self, spans: &[SpanData]) -> Result<usize, DataError>;

    /// Spans of one run, ordered by start time
    async fn list_run_spans(&self, run_id: &str) -> Result<Vec<SpanData>, DataError>;
}
