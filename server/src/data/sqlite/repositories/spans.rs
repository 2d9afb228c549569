//! Span repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::domain::traces::{Attributes, SpanData, SpanEvent, SpanKind, TraceStatus};
use crate::utils::time::iso_to_millis;

type SpanRowTuple = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    f64,
    String,
    String,
    String,
);

/// Insert or replace spans by id in a single transaction.
/// Returns the number of rows written.
pub async fn upsert_spans(pool: &SqlitePool, spans: &[SpanData]) -> Result<usize, SqliteError> {
    if spans.is_empty() {
        return Ok(0);
    }

    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    for span in spans {
        let attributes = serde_json::to_string(&span.attributes)?;
        let events = serde_json::to_string(&span.events)?;
        let start_time_ms = iso_to_millis(&span.start_time).unwrap_or(0);

        sqlx::query(
            r#"
            INSERT INTO spans (
                id, trace_id, run_id, parent_span_id, name, span_kind, attributes,
                start_time, start_time_ms, end_time, latency_ms, status, status_message,
                events, ingested_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                trace_id = excluded.trace_id,
                run_id = excluded.run_id,
                parent_span_id = excluded.parent_span_id,
                name = excluded.name,
                span_kind = excluded.span_kind,
                attributes = excluded.attributes,
                start_time = excluded.start_time,
                start_time_ms = excluded.start_time_ms,
                end_time = excluded.end_time,
                latency_ms = excluded.latency_ms,
                status = excluded.status,
                status_message = excluded.status_message,
                events = excluded.events,
                ingested_at = excluded.ingested_at
            "#,
        )
        .bind(&span.id)
        .bind(&span.trace_id)
        .bind(&span.run_id)
        .bind(&span.parent_span_id)
        .bind(&span.name)
        .bind(span.span_kind.as_str())
        .bind(&attributes)
        .bind(&span.start_time)
        .bind(start_time_ms)
        .bind(&span.end_time)
        .bind(span.latency_ms)
        .bind(span.status.as_str())
        .bind(&span.status_message)
        .bind(&events)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(spans.len())
}

/// List the spans of one run, oldest first
pub async fn list_run_spans(pool: &SqlitePool, run_id: &str) -> Result<Vec<SpanData>, SqliteError> {
    let rows: Vec<SpanRowTuple> = sqlx::query_as(
        r#"
        SELECT id, trace_id, run_id, parent_span_id, name, span_kind, attributes,
               start_time, end_time, latency_ms, status, status_message, events
        FROM spans
        WHERE run_id = ?
        ORDER BY start_time_ms ASC, id ASC
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_span).collect()
}

fn row_to_span(row: SpanRowTuple) -> Result<SpanData, SqliteError> {
    let (
        id,
        trace_id,
        run_id,
        parent_span_id,
        name,
        span_kind,
        attributes,
        start_time,
        end_time,
        latency_ms,
        status,
        status_message,
        events,
    ) = row;

    Ok(SpanData {
        id,
        trace_id,
        run_id,
        parent_span_id,
        name,
        span_kind: SpanKind::parse(&span_kind).unwrap_or_default(),
        attributes: serde_json::from_str::<Attributes>(&attributes)?,
        start_time,
        end_time,
        latency_ms,
        status: TraceStatus::parse(&status).unwrap_or_default(),
        status_message,
        events: serde_json::from_str::<Vec<SpanEvent>>(&events)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    fn make_span(id: &str, run_id: &str, start_time: &str) -> SpanData {
        let attributes = match json!({"project": {"run_id": run_id}, "span": {"kind": "LLM"}}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        SpanData {
            id: id.to_string(),
            trace_id: "ab12".to_string(),
            run_id: run_id.to_string(),
            parent_span_id: String::new(),
            name: format!("span-{}", id),
            span_kind: SpanKind::Llm,
            attributes,
            start_time: start_time.to_string(),
            end_time: "2024-01-01T00:00:10.000Z".to_string(),
            latency_ms: 50.0,
            status: TraceStatus::Ok,
            status_message: String::new(),
            events: vec![SpanEvent {
                name: "retry".to_string(),
                timestamp: "2024-01-01T00:00:01.000Z".to_string(),
                attributes: Attributes::new(),
            }],
        }
    }

    #[tokio::test]
    async fn test_upsert_and_list_round_trip() {
        let pool = setup_test_pool().await;
        let span = make_span("01", "run-42", "2024-01-01T00:00:00.000Z");

        assert_eq!(upsert_spans(&pool, &[span.clone()]).await.unwrap(), 1);

        let stored = list_run_spans(&pool, "run-42").await.unwrap();
        assert_eq!(stored, vec![span]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_id() {
        let pool = setup_test_pool().await;
        let first = make_span("01", "run-42", "2024-01-01T00:00:00.000Z");
        upsert_spans(&pool, &[first]).await.unwrap();

        let mut second = make_span("01", "run-42", "2024-01-01T00:00:00.000Z");
        second.name = "renamed".to_string();
        second.status = TraceStatus::Error;
        upsert_spans(&pool, &[second]).await.unwrap();

        let stored = list_run_spans(&pool, "run-42").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "renamed");
        assert_eq!(stored[0].status, TraceStatus::Error);
    }

    #[tokio::test]
    async fn test_list_orders_by_start_and_filters_run() {
        let pool = setup_test_pool().await;
        upsert_spans(
            &pool,
            &[
                make_span("late", "run-a", "2024-01-01T00:00:05.000Z"),
                make_span("other", "run-b", "2024-01-01T00:00:00.000Z"),
                make_span("early", "run-a", "2024-01-01T00:00:01.000Z"),
            ],
        )
        .await
        .unwrap();

        let ids: Vec<_> = list_run_spans(&pool, "run-a")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert!(list_run_spans(&pool, "run-missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_empty_is_noop() {
        let pool = setup_test_pool().await;
        assert_eq!(upsert_spans(&pool, &[]).await.unwrap(), 0);
    }
}
