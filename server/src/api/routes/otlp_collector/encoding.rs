//! OTLP content-type encoding and decoding
//!
//! Protobuf bodies decode into the generated request type. JSON bodies are
//! only parsed to a `serde_json::Value`: the batch processor walks the raw
//! tree itself so one malformed span cannot reject the whole export.

use std::fmt;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use prost::Message;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Content type for OTLP requests/responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtlpContentType {
    Protobuf,
    Json,
}

impl OtlpContentType {
    /// Parse content type from HTTP headers.
    /// Defaults to protobuf if content type is missing or unrecognized.
    #[inline]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if content_type.starts_with("application/json") {
            OtlpContentType::Json
        } else {
            OtlpContentType::Protobuf
        }
    }

    /// Get the content type header value for responses
    #[inline]
    pub fn as_header_value(self) -> &'static str {
        match self {
            OtlpContentType::Protobuf => "application/x-protobuf",
            OtlpContentType::Json => "application/json",
        }
    }

    #[inline]
    fn decode_error_message(self) -> &'static str {
        match self {
            OtlpContentType::Protobuf => "Failed to decode protobuf request",
            OtlpContentType::Json => "Failed to decode JSON request",
        }
    }
}

/// Decode a protobuf OTLP message
#[inline]
pub fn decode_protobuf<T>(body: &Bytes) -> Result<T, DecodeError>
where
    T: Message + Default,
{
    T::decode(body.as_ref()).map_err(|e| DecodeError::Protobuf(e.to_string()))
}

/// Parse a JSON OTLP body into an untyped tree
#[inline]
pub fn decode_json(body: &Bytes) -> Result<JsonValue, DecodeError> {
    serde_json::from_slice(body.as_ref()).map_err(|e| DecodeError::Json(e.to_string()))
}

fn encode_response<T>(response: &T, content_type: OtlpContentType) -> Result<Vec<u8>, String>
where
    T: Message + Serialize,
{
    match content_type {
        OtlpContentType::Protobuf => Ok(response.encode_to_vec()),
        OtlpContentType::Json => serde_json::to_vec(response).map_err(|e| e.to_string()),
    }
}

/// Create a successful OTLP response with the correct content type
pub fn success_response<T>(response: &T, content_type: OtlpContentType) -> Response
where
    T: Message + Serialize,
{
    match encode_response(response, content_type) {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type.as_header_value())],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode OTLP response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                "Internal server error",
            )
                .into_response()
        }
    }
}

/// Error returned when decoding fails
#[derive(Debug)]
pub enum DecodeError {
    Protobuf(String),
    Json(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Protobuf(e) => write!(f, "protobuf decode error: {}", e),
            DecodeError::Json(e) => write!(f, "JSON decode error: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {}

impl DecodeError {
    /// Create an error response for a decode failure.
    /// Internal error details are logged but not exposed to clients.
    pub fn into_response(self, content_type: OtlpContentType) -> Response {
        tracing::warn!(
            error = %self,
            content_type = content_type.as_header_value(),
            "Failed to decode OTLP request"
        );

        (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "text/plain")],
            content_type.decode_error_message(),
        )
            .into_response()
    }
}
