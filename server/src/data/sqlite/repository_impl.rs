//! SpanRepository trait implementation for SQLite

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::SpanRepository;
use crate::domain::traces::SpanData;

use super::SqliteService;
use super::repositories;

#[async_trait]
impl SpanRepository for Arc<SqliteService> {
    async fn save_spans(&self, spans: &[SpanData]) -> Result<usize, DataError> {
        repositories::upsert_spans(self.pool(), spans)
            .await
            .map_err(Into::into)
    }

    async fn list_run_spans(&self, run_id: &str) -> Result<Vec<SpanData>, DataError> {
        repositories::list_run_spans(self.pool(), run_id)
            .await
            .map_err(Into::into)
    }
}
