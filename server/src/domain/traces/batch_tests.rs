//! Tests for the batch processor

use serde_json::json;

use super::*;
use crate::domain::traces::types::SpanKind;
use crate::domain::traces::wire::{WireId, WireScopeSpans};

fn span_json(span_id: &str, run_id: &str) -> JsonValue {
    json!({
        "traceId": "ab12",
        "spanId": span_id,
        "name": format!("span-{}", span_id),
        "startTimeUnixNano": "1000000000",
        "endTimeUnixNano": "1050000000",
        "attributes": [
            {"key": "project.run_id", "value": {"stringValue": run_id}}
        ]
    })
}

fn wire_span(value: JsonValue) -> WireSpan {
    serde_json::from_value(value).unwrap()
}

fn group(spans: Vec<WireSpan>) -> WireResourceSpans {
    WireResourceSpans {
        scope_spans: vec![WireScopeSpans { spans }],
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn test_validate_accepts_complete_span() {
    assert_eq!(validate_span(&wire_span(span_json("01", "run-1"))), Ok(()));
}

#[test]
fn test_validate_required_fields() {
    let mut span = wire_span(span_json("01", "run-1"));
    span.trace_id = None;
    assert_eq!(validate_span(&span), Err(SpanRejection::MissingTraceId));

    let mut span = wire_span(span_json("01", "run-1"));
    span.span_id = Some(WireId::Bytes(vec![]));
    assert_eq!(validate_span(&span), Err(SpanRejection::MissingSpanId));

    let mut span = wire_span(span_json("01", "run-1"));
    span.name = Some(String::new());
    assert_eq!(validate_span(&span), Err(SpanRejection::MissingName));
}

#[test]
fn test_validate_timestamps() {
    let mut span = wire_span(span_json("01", "run-1"));
    span.start_time_unix_nano = None;
    assert_eq!(validate_span(&span), Err(SpanRejection::MissingStartTime));

    let mut span = wire_span(span_json("01", "run-1"));
    span.end_time_unix_nano = Some(WireNanos::Int(0));
    assert_eq!(validate_span(&span), Err(SpanRejection::MissingEndTime));

    let mut span = wire_span(span_json("01", "run-1"));
    span.start_time_unix_nano = Some(WireNanos::Text("yesterday".to_string()));
    assert_eq!(validate_span(&span), Err(SpanRejection::NonNumericStartTime));

    let mut span = wire_span(span_json("01", "run-1"));
    span.end_time_unix_nano = Some(WireNanos::Text("NaN".to_string()));
    assert_eq!(validate_span(&span), Err(SpanRejection::NonNumericEndTime));
}

#[test]
fn test_safe_decode_drops_invalid_and_undecodable() {
    let mut span = wire_span(span_json("01", "run-1"));
    span.name = None;
    assert!(safe_decode(&span).is_none());

    // Passes validation, fails on the int attribute
    let span = wire_span(json!({
        "traceId": "ab12",
        "spanId": "01",
        "name": "n",
        "startTimeUnixNano": "1000000000",
        "endTimeUnixNano": "1050000000",
        "attributes": [{"key": "count", "value": {"intValue": "many"}}]
    }));
    assert!(safe_decode(&span).is_none());

    let span = wire_span(span_json("01", "run-1"));
    assert_eq!(safe_decode(&span).unwrap().run_id, "run-1");
}

// ============================================================================
// TYPED BATCHES
// ============================================================================

#[test]
fn test_process_batch_llm_span() {
    let span = WireSpan {
        trace_id: Some(WireId::Bytes(vec![0xab, 0x12])),
        span_id: Some(WireId::Bytes(vec![0x01])),
        name: Some("call-llm".to_string()),
        start_time_unix_nano: Some(WireNanos::Text("1000000000".to_string())),
        end_time_unix_nano: Some(WireNanos::Text("1050000000".to_string())),
        attributes: wire_span(json!({
            "attributes": [
                {"key": "span.kind", "value": {"string_value": "LLM"}},
                {"key": "project.run_id", "value": {"string_value": "run-42"}}
            ]
        }))
        .attributes,
        ..Default::default()
    };

    let batch = process_batch(&[group(vec![span.clone()])]);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.rejected, 0);
    let decoded = &batch.spans[0];
    assert_eq!(decoded.id, "01");
    assert_eq!(decoded.trace_id, "ab12");
    assert_eq!(decoded.span_kind, SpanKind::Llm);
    assert_eq!(decoded.run_id, "run-42");
    assert_eq!(decoded.latency_ms, 50.0);

    let mut without_kind = span;
    without_kind.attributes.retain(|kv| kv.key != "span.kind");
    let batch = process_batch(&[group(vec![without_kind])]);
    assert_eq!(batch.spans[0].span_kind, SpanKind::Common);
}

#[test]
fn test_process_batch_missing_name_dropped() {
    let span = wire_span(json!({
        "traceId": "ab12",
        "spanId": "01",
        "startTimeUnixNano": "1000000000",
        "endTimeUnixNano": "1050000000",
        "attributes": []
    }));
    let batch = process_batch(&[group(vec![span])]);
    assert!(batch.is_empty());
    assert_eq!(batch.rejected, 1);
}

#[test]
fn test_process_batch_isolates_bad_span() {
    let mut bad = wire_span(span_json("02", "run-1"));
    bad.start_time_unix_nano = Some(WireNanos::Text("not-a-number".to_string()));

    let batch = process_batch(&[group(vec![
        wire_span(span_json("01", "run-1")),
        bad,
        wire_span(span_json("03", "run-1")),
    ])]);

    let ids: Vec<_> = batch.spans.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["01", "03"]);
    assert_eq!(batch.rejected, 1);
}

#[test]
fn test_process_batch_groups_keep_order_and_run_ids() {
    let batch = process_batch(&[
        group(vec![wire_span(span_json("01", "run-a"))]),
        group(vec![wire_span(span_json("02", "run-b"))]),
    ]);

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.spans[0].run_id, "run-a");
    assert_eq!(batch.spans[1].run_id, "run-b");
}

#[test]
fn test_process_batch_skips_empty_levels() {
    let batch = process_batch(&[
        WireResourceSpans::default(),
        WireResourceSpans {
            scope_spans: vec![WireScopeSpans::default()],
        },
        group(vec![wire_span(span_json("01", "run-a"))]),
    ]);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.rejected, 0);

    assert!(process_batch(&[]).is_empty());
}

#[test]
fn test_process_batch_keeps_orphan_spans() {
    let mut span = wire_span(span_json("01", "run-a"));
    span.attributes.clear();
    let batch = process_batch(&[group(vec![span])]);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.spans[0].run_id, "");
    assert!(batch.spans[0].room().is_none());
}

// ============================================================================
// JSON PAYLOADS
// ============================================================================

#[test]
fn test_json_batch_camel_case() {
    let payload = json!({
        "resourceSpans": [
            {"scopeSpans": [{"spans": [span_json("01", "run-a"), span_json("02", "run-a")]}]}
        ]
    });
    let batch = process_json_batch(&payload);
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.spans[1].id, "02");
}

#[test]
fn test_json_batch_snake_case() {
    let payload = json!({
        "resource_spans": [
            {"scope_spans": [{"spans": [{
                "trace_id": "ab12",
                "span_id": "01",
                "name": "n",
                "start_time_unix_nano": 1000000000u64,
                "end_time_unix_nano": 1050000000u64,
                "attributes": [{"key": "project.run_id", "value": {"string_value": "run-a"}}]
            }]}]}
        ]
    });
    let batch = process_json_batch(&payload);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.spans[0].run_id, "run-a");
    assert_eq!(batch.spans[0].latency_ms, 50.0);
}

#[test]
fn test_json_batch_outer_list_not_array() {
    let batch = process_json_batch(&json!({"resourceSpans": 5}));
    assert!(batch.is_empty());
    assert_eq!(batch.rejected, 0);
}

#[test]
fn test_json_batch_missing_outer_list() {
    assert!(process_json_batch(&json!({})).is_empty());
    assert!(process_json_batch(&json!([1, 2])).is_empty());
    assert!(process_json_batch(&JsonValue::Null).is_empty());
}

#[test]
fn test_json_batch_malformed_group_skipped() {
    let payload = json!({
        "resourceSpans": [
            {"scopeSpans": "oops"},
            {"scopeSpans": [{"spans": {"not": "a list"}}]},
            {},
            {"scopeSpans": [{"spans": [span_json("03", "run-a")]}]}
        ]
    });
    let batch = process_json_batch(&payload);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.spans[0].id, "03");
}

#[test]
fn test_json_batch_unreadable_span_counted() {
    let payload = json!({
        "resourceSpans": [{"scopeSpans": [{"spans": [
            span_json("01", "run-a"),
            {"traceId": 12, "spanId": "02"},
            null,
            span_json("04", "run-a")
        ]}]}]
    });
    let batch = process_json_batch(&payload);
    let ids: Vec<_> = batch.spans.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["01", "04"]);
    assert_eq!(batch.rejected, 2);
}
