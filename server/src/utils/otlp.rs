//! OTLP utility functions
//!
//! Helpers shared by the wire decoder and the OTLP transports:
//! - Identifier and bytes encoding
//! - Status code mapping
//! - Export responses with partial-success reporting

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use opentelemetry_proto::tonic::collector::trace::v1::{
    ExportTracePartialSuccess, ExportTraceServiceResponse,
};

// ============================================================================
// ENCODING
// ============================================================================

/// Render raw bytes as lowercase hex
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode an OTLP/JSON `bytesValue` (standard base64)
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(encoded.trim())
}

// ============================================================================
// STATUS CODES
// ============================================================================

pub mod status_code {
    pub const UNSET: i64 = 0;
    pub const OK: i64 = 1;
    pub const ERROR: i64 = 2;

    pub const UNSET_NAME: &str = "STATUS_CODE_UNSET";
    pub const OK_NAME: &str = "STATUS_CODE_OK";
    pub const ERROR_NAME: &str = "STATUS_CODE_ERROR";
}

// ============================================================================
// RESPONSES
// ============================================================================

/// Build an export response, reporting dropped spans as a partial success
pub fn export_response(rejected: usize) -> ExportTraceServiceResponse {
    if rejected == 0 {
        return ExportTraceServiceResponse {
            partial_success: None,
        };
    }

    ExportTraceServiceResponse {
        partial_success: Some(ExportTracePartialSuccess {
            rejected_spans: i64::try_from(rejected).unwrap_or(i64::MAX),
            error_message: format!("{} span(s) rejected as invalid or undecodable", rejected),
        }),
    }
}
