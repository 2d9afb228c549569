//! SQLite schema definitions

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- Spans
-- =============================================================================
-- run_id is empty for orphaned spans. attributes and events hold JSON text.
CREATE TABLE IF NOT EXISTS spans (
    id TEXT PRIMARY KEY,
    trace_id TEXT NOT NULL,
    run_id TEXT NOT NULL DEFAULT '',
    parent_span_id TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL,
    span_kind TEXT NOT NULL DEFAULT 'COMMON'
        CHECK(span_kind IN ('AGENT', 'TOOL', 'LLM', 'EMBEDDING', 'FORMATTER', 'COMMON')),
    attributes TEXT NOT NULL DEFAULT '{}',
    start_time TEXT NOT NULL,
    start_time_ms INTEGER NOT NULL,
    end_time TEXT NOT NULL,
    latency_ms REAL NOT NULL,
    status TEXT NOT NULL DEFAULT 'UNSET' CHECK(status IN ('OK', 'ERROR', 'UNSET')),
    status_message TEXT NOT NULL DEFAULT '',
    events TEXT NOT NULL DEFAULT '[]',
    ingested_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_spans_run ON spans(run_id, start_time_ms);
CREATE INDEX IF NOT EXISTS idx_spans_trace ON spans(trace_id);
"#;
