//! Hand-off of decoded spans to the span store and live run rooms
//!
//! Spans are persisted first and only then published, so a dashboard that
//! reloads after receiving a live span always finds it in storage.

use std::sync::Arc;

use thiserror::Error;

use super::types::SpanBatch;
use crate::core::config::OrphanPolicy;
use crate::data::error::DataError;
use crate::data::topics::RoomHub;
use crate::data::traits::SpanRepository;
use crate::utils::retry::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, retry_with_backoff};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("span store unavailable after {attempts} attempt(s): {source}")]
    Store {
        #[source]
        source: DataError,
        attempts: u32,
    },
}

/// Counts reported back for one export request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Rows written to the span store
    pub stored: usize,
    /// Spans the batch processor dropped as invalid or undecodable
    pub rejected: usize,
    /// Orphan spans discarded by the storage policy
    pub dropped_orphans: usize,
    /// Live deliveries across all run rooms
    pub delivered: usize,
}

pub struct IngestService {
    store: Arc<dyn SpanRepository>,
    rooms: Arc<RoomHub>,
    orphan_policy: OrphanPolicy,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn SpanRepository>,
        rooms: Arc<RoomHub>,
        orphan_policy: OrphanPolicy,
    ) -> Self {
        Self {
            store,
            rooms,
            orphan_policy,
        }
    }

    pub fn rooms(&self) -> &Arc<RoomHub> {
        &self.rooms
    }

    pub fn store(&self) -> &Arc<dyn SpanRepository> {
        &self.store
    }

    pub async fn ingest(&self, batch: SpanBatch) -> Result<IngestOutcome, IngestError> {
        let SpanBatch {
            mut spans,
            rejected,
        } = batch;

        let mut outcome = IngestOutcome {
            rejected,
            ..Default::default()
        };

        if self.orphan_policy == OrphanPolicy::Drop {
            let before = spans.len();
            spans.retain(|span| !span.run_id.is_empty());
            outcome.dropped_orphans = before - spans.len();
            if outcome.dropped_orphans > 0 {
                tracing::debug!(dropped = outcome.dropped_orphans, "Dropped orphan spans");
            }
        }

        if spans.is_empty() {
            return Ok(outcome);
        }

        outcome.stored = retry_with_backoff(
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_BASE_DELAY_MS,
            DataError::is_transient,
            || self.store.save_spans(&spans),
        )
        .await
        .map_err(|(source, attempts)| {
            tracing::error!(error = %source, attempts, spans = spans.len(), "Failed to store spans");
            IngestError::Store { source, attempts }
        })?;

        // Orphans have no room
        for span in spans {
            if let Some(room) = span.room() {
                outcome.delivered += self.rooms.publish(&room, span);
            }
        }

        tracing::debug!(
            stored = outcome.stored,
            rejected = outcome.rejected,
            delivered = outcome.delivered,
            "Ingested span batch"
        );
        Ok(outcome)
    }
}
