//! API server and routes

pub mod middleware;
pub mod openapi;
pub mod routes;
mod server;
pub mod types;

pub use routes::otlp_collector::OtlpGrpcServer;
pub use server::{ApiContext, ApiServer, build_router};
