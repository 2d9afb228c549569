//! RunLens server: OTLP trace intake, span store and live run streams

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
