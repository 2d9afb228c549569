//! gRPC OTLP server

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tonic::transport::Server as TonicServer;
use tonic::{Request, Response, Status};

use opentelemetry_proto::tonic::collector::trace::v1::{
    ExportTraceServiceRequest, ExportTraceServiceResponse,
    trace_service_server::{TraceService, TraceServiceServer},
};

use crate::core::config::OtelConfig;
use crate::domain::traces::{IngestService, from_export_request, process_batch};
use crate::utils::otlp::export_response;

pub struct OtlpGrpcServer {
    host: String,
    port: u16,
    body_limit: usize,
    ingest: Arc<IngestService>,
}

impl OtlpGrpcServer {
    pub fn new(config: &OtelConfig, host: &str, ingest: Arc<IngestService>) -> Self {
        Self {
            host: host.to_string(),
            port: config.grpc_port,
            body_limit: config.body_limit_bytes,
            ingest,
        }
    }

    pub async fn start(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        let addr = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .with_context(|| format!("Cannot resolve gRPC bind address {}", self.host))?;

        tracing::debug!(%addr, "Starting OTLP gRPC server");

        TonicServer::builder()
            .add_service(
                TraceServiceServer::new(OtlpTraceService {
                    ingest: self.ingest,
                })
                .max_decoding_message_size(self.body_limit)
                .max_encoding_message_size(self.body_limit),
            )
            .serve_with_shutdown(addr, async move {
                let _ = shutdown_rx.wait_for(|&v| v).await;
                tracing::debug!("OTLP gRPC server shutting down");
            })
            .await?;

        Ok(())
    }
}

/// gRPC trace service
struct OtlpTraceService {
    ingest: Arc<IngestService>,
}

#[tonic::async_trait]
impl TraceService for OtlpTraceService {
    async fn export(
        &self,
        request: Request<ExportTraceServiceRequest>,
    ) -> Result<Response<ExportTraceServiceResponse>, Status> {
        let batch = process_batch(&from_export_request(request.into_inner()));

        let outcome = self.ingest.ingest(batch).await.map_err(|e| {
            tracing::warn!(error = %e, "Rejecting gRPC trace export");
            Status::unavailable("span store unavailable")
        })?;

        Ok(Response::new(export_response(outcome.rejected)))
    }
}
