//! SQLite repositories

pub mod spans;

pub use spans::{list_run_spans, upsert_spans};
