//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{health, replying, runs};
use crate::domain::traces::{SpanData, SpanEvent, SpanKind, TraceStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RunLens API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Live trace viewer for agent runs"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "runs", description = "Stored and live spans of a run"),
        (name = "replying", description = "Assistant replying flag")
    ),
    paths(
        health::health,
        runs::list_run_spans,
        runs::sse::stream_run_spans,
        replying::get_replying,
        replying::set_replying,
    ),
    components(schemas(
        health::HealthResponse,
        replying::ReplyingBody,
        SpanData,
        SpanEvent,
        SpanKind,
        TraceStatus,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON spec
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>RunLens API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
"#;
