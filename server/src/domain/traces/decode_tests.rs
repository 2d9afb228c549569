//! Tests for the wire span decoder

use serde_json::json;

use super::*;
use crate::domain::traces::wire::{WireArrayValue, WireKeyValueList};
use crate::utils::time::iso_to_millis;

fn string_value(s: &str) -> WireAnyValue {
    WireAnyValue {
        string_value: Some(s.to_string()),
        ..Default::default()
    }
}

fn int_value(i: i64) -> WireAnyValue {
    WireAnyValue {
        int_value: Some(WireInt::Int(i)),
        ..Default::default()
    }
}

fn kv(key: &str, value: WireAnyValue) -> WireKeyValue {
    WireKeyValue {
        key: key.to_string(),
        value: Some(value),
    }
}

fn make_span(attributes: Vec<WireKeyValue>) -> WireSpan {
    WireSpan {
        trace_id: Some(WireId::Bytes(vec![0xab, 0x12])),
        span_id: Some(WireId::Bytes(vec![0x01])),
        parent_span_id: None,
        name: Some("call-llm".to_string()),
        start_time_unix_nano: Some(WireNanos::Text("1000000000".to_string())),
        end_time_unix_nano: Some(WireNanos::Text("1050000000".to_string())),
        attributes,
        events: vec![],
        status: None,
    }
}

// ============================================================================
// IDENTIFIERS
// ============================================================================

#[test]
fn test_identifier_bytes_to_hex() {
    let bytes = vec![0x00, 0x0f, 0xab, 0xff];
    let id = decode_identifier(Some(&WireId::Bytes(bytes.clone())));
    assert_eq!(id, "000fabff");
    assert_eq!(id.len(), 2 * bytes.len());
    assert_eq!(id, id.to_lowercase());
}

#[test]
fn test_identifier_string_passthrough() {
    let id = decode_identifier(Some(&WireId::Text("ABC-not-hex".to_string())));
    assert_eq!(id, "ABC-not-hex");
}

#[test]
fn test_identifier_absent_is_empty() {
    assert_eq!(decode_identifier(None), "");
    assert_eq!(decode_identifier(Some(&WireId::Bytes(vec![]))), "");
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

#[test]
fn test_timestamp_string_and_number_agree() {
    let from_text = decode_timestamp(&WireNanos::Text("1000000000".to_string())).unwrap();
    let from_int = decode_timestamp(&WireNanos::Int(1_000_000_000)).unwrap();
    let from_float = decode_timestamp(&WireNanos::Float(1e9)).unwrap();
    assert_eq!(from_text, "1970-01-01T00:00:01.000Z");
    assert_eq!(from_text, from_int);
    assert_eq!(from_text, from_float);
}

#[test]
fn test_timestamp_truncates_sub_millisecond() {
    let ts = decode_timestamp(&WireNanos::Int(1_704_067_200_123_999_999)).unwrap();
    assert_eq!(ts, "2024-01-01T00:00:00.123Z");
}

#[test]
fn test_timestamp_large_integer_text_is_exact() {
    // Beyond f64's exact integer range; integer text must not go through floats
    let ts = decode_timestamp(&WireNanos::Text("1704067200123456789".to_string())).unwrap();
    assert_eq!(ts, "2024-01-01T00:00:00.123Z");
}

#[test]
fn test_timestamp_scientific_notation_text() {
    let ts = decode_timestamp(&WireNanos::Text("1.5e9".to_string())).unwrap();
    assert_eq!(ts, "1970-01-01T00:00:01.500Z");
}

#[test]
fn test_timestamp_non_numeric_fails() {
    let err = decode_timestamp(&WireNanos::Text("soon".to_string())).unwrap_err();
    assert_eq!(err, SpanDecodeError::InvalidTimestamp("soon".to_string()));
}

#[test]
fn test_timestamp_out_of_range_fails() {
    let err = decode_timestamp(&WireNanos::Float(1e300)).unwrap_err();
    assert!(matches!(err, SpanDecodeError::InvalidTimestamp(_)));

    let err = decode_timestamp(&WireNanos::Float(9e24)).unwrap_err();
    assert!(matches!(err, SpanDecodeError::TimestampOutOfRange(_)));
}

// ============================================================================
// KEY/VALUE LISTS
// ============================================================================

#[test]
fn test_key_value_list_scalars() {
    let list = vec![
        kv("s", string_value("x")),
        kv(
            "b",
            WireAnyValue {
                bool_value: Some(true),
                ..Default::default()
            },
        ),
        kv("i", int_value(-7)),
        kv(
            "i_text",
            WireAnyValue {
                int_value: Some(WireInt::Text("9007199254740993".to_string())),
                ..Default::default()
            },
        ),
        kv(
            "d",
            WireAnyValue {
                double_value: Some(0.25),
                ..Default::default()
            },
        ),
    ];

    let map = decode_key_value_list(&list).unwrap();
    assert_eq!(
        JsonValue::Object(map),
        json!({"s": "x", "b": true, "i": -7, "i_text": 9007199254740993i64, "d": 0.25})
    );
}

#[test]
fn test_key_value_list_nested_array_and_kvlist_stay_flat() {
    let list = vec![
        kv(
            "arr",
            WireAnyValue {
                array_value: Some(WireArrayValue {
                    values: vec![int_value(1), string_value("two")],
                }),
                ..Default::default()
            },
        ),
        kv(
            "map",
            WireAnyValue {
                kvlist_value: Some(WireKeyValueList {
                    values: vec![kv("inner.key", int_value(3))],
                }),
                ..Default::default()
            },
        ),
    ];

    let map = decode_key_value_list(&list).unwrap();
    assert_eq!(
        JsonValue::Object(map),
        json!({"arr": [1, "two"], "map": {"inner.key": 3}})
    );
}

#[test]
fn test_key_value_list_bytes_raw_and_base64() {
    let list = vec![
        kv(
            "raw",
            WireAnyValue {
                bytes_value: Some(WireBytes::Raw(vec![0xde, 0xad])),
                ..Default::default()
            },
        ),
        kv(
            "b64",
            WireAnyValue {
                bytes_value: Some(WireBytes::Base64("3q0=".to_string())),
                ..Default::default()
            },
        ),
    ];

    let map = decode_key_value_list(&list).unwrap();
    assert_eq!(map["raw"], "dead");
    assert_eq!(map["b64"], "dead");
}

#[test]
fn test_key_value_list_missing_value_is_null() {
    let list = vec![
        WireKeyValue {
            key: "none".to_string(),
            value: None,
        },
        kv("empty", WireAnyValue::default()),
    ];
    let map = decode_key_value_list(&list).unwrap();
    assert_eq!(JsonValue::Object(map), json!({"none": null, "empty": null}));
}

#[test]
fn test_key_value_list_duplicate_key_last_wins() {
    let list = vec![kv("k", int_value(1)), kv("k", int_value(2))];
    let map = decode_key_value_list(&list).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["k"], 2);
}

#[test]
fn test_key_value_list_string_beats_int_when_both_set() {
    let value = WireAnyValue {
        string_value: Some("text".to_string()),
        int_value: Some(WireInt::Int(5)),
        ..Default::default()
    };
    assert_eq!(decode_any_value(&value).unwrap(), json!("text"));
}

#[test]
fn test_key_value_list_invalid_int_text_fails() {
    let list = vec![kv(
        "i",
        WireAnyValue {
            int_value: Some(WireInt::Text("twelve".to_string())),
            ..Default::default()
        },
    )];
    assert_eq!(
        decode_key_value_list(&list).unwrap_err(),
        SpanDecodeError::InvalidInt("twelve".to_string())
    );
}

#[test]
fn test_key_value_list_invalid_base64_fails() {
    let list = vec![kv(
        "b",
        WireAnyValue {
            bytes_value: Some(WireBytes::Base64("%%%".to_string())),
            ..Default::default()
        },
    )];
    assert!(matches!(
        decode_key_value_list(&list),
        Err(SpanDecodeError::InvalidBytes(_))
    ));
}

#[test]
fn test_key_value_list_nan_double_is_null() {
    let value = WireAnyValue {
        double_value: Some(f64::NAN),
        ..Default::default()
    };
    assert_eq!(decode_any_value(&value).unwrap(), JsonValue::Null);
}

// ============================================================================
// ATTRIBUTE NORMALIZATION
// ============================================================================

#[test]
fn test_attributes_unflatten_round_trip() {
    let list = vec![kv("a.b", int_value(1)), kv("a.c", string_value("x"))];
    let attrs = normalize_attributes(&list).unwrap();
    assert_eq!(JsonValue::Object(attrs), json!({"a": {"b": 1, "c": "x"}}));
}

#[test]
fn test_attributes_embedded_json_parsed() {
    let list = vec![kv("payload", string_value(r#"{"k":1}"#))];
    let attrs = normalize_attributes(&list).unwrap();
    assert_eq!(attrs["payload"], json!({"k": 1}));
}

#[test]
fn test_attributes_embedded_json_parsed_before_unflatten() {
    let list = vec![kv("output.usage", string_value(r#"{"input_tokens":12}"#))];
    let attrs = normalize_attributes(&list).unwrap();
    assert_eq!(
        JsonValue::Object(attrs),
        json!({"output": {"usage": {"input_tokens": 12}}})
    );
}

#[test]
fn test_attributes_plain_strings_untouched() {
    let list = vec![kv("greeting", string_value("hello world"))];
    let attrs = normalize_attributes(&list).unwrap();
    assert_eq!(attrs["greeting"], "hello world");
}

#[test]
fn test_embedded_json_nested_leaves_parsed() {
    let value = json!({"outer": ["[1,2]", {"deep": "true"}, "plain"]});
    assert_eq!(
        parse_embedded_json(value),
        json!({"outer": [[1, 2], {"deep": true}, "plain"]})
    );
}

#[test]
fn test_embedded_json_not_reparsed() {
    // Parsed once into the string "{\"k\":1}", which stays a string
    let value = json!(r#""{\"k\":1}""#);
    assert_eq!(parse_embedded_json(value), json!(r#"{"k":1}"#));
}

#[test]
fn test_event_attributes_stay_flat_and_unparsed() {
    let event = WireEvent {
        time_unix_nano: Some(WireNanos::Int(2_000_000_000)),
        name: Some("retry".to_string()),
        attributes: vec![kv("a.b", string_value(r#"{"k":1}"#))],
    };
    let decoded = decode_event(&event).unwrap();
    assert_eq!(decoded.name, "retry");
    assert_eq!(decoded.timestamp, "1970-01-01T00:00:02.000Z");
    assert_eq!(
        JsonValue::Object(decoded.attributes),
        json!({"a.b": r#"{"k":1}"#})
    );
}

#[test]
fn test_event_without_time_uses_epoch() {
    let event = WireEvent::default();
    let decoded = decode_event(&event).unwrap();
    assert_eq!(decoded.name, "");
    assert_eq!(decoded.timestamp, "1970-01-01T00:00:00.000Z");
}

// ============================================================================
// DERIVED FIELDS
// ============================================================================

#[test]
fn test_span_kind_default_known_and_unknown() {
    let attrs = normalize_attributes(&[]).unwrap();
    assert_eq!(derive_span_kind(&attrs), SpanKind::Common);

    let attrs = normalize_attributes(&[kv("span.kind", string_value("LLM"))]).unwrap();
    assert_eq!(derive_span_kind(&attrs), SpanKind::Llm);

    let attrs = normalize_attributes(&[kv("span.kind", string_value("BOGUS"))]).unwrap();
    assert_eq!(derive_span_kind(&attrs), SpanKind::Common);

    let attrs = normalize_attributes(&[kv("span.kind", int_value(3))]).unwrap();
    assert_eq!(derive_span_kind(&attrs), SpanKind::Common);
}

#[test]
fn test_run_id_string_number_and_missing() {
    let attrs = normalize_attributes(&[kv("project.run_id", string_value("run-42"))]).unwrap();
    assert_eq!(derive_run_id(&attrs), "run-42");

    // Numeric strings come back as numbers after embedded JSON parsing
    let attrs = normalize_attributes(&[kv("project.run_id", string_value("42"))]).unwrap();
    assert_eq!(derive_run_id(&attrs), "42");

    let attrs = normalize_attributes(&[kv("project.name", string_value("demo"))]).unwrap();
    assert_eq!(derive_run_id(&attrs), "");

    let attrs = normalize_attributes(&[kv("project.run_id", string_value("{}"))]).unwrap();
    assert_eq!(derive_run_id(&attrs), "");
}

#[test]
fn test_status_mapping() {
    assert_eq!(decode_status(None), (TraceStatus::Unset, String::new()));

    let status = WireStatus {
        code: Some(WireStatusCode::Number(2)),
        message: Some("boom".to_string()),
    };
    assert_eq!(
        decode_status(Some(&status)),
        (TraceStatus::Error, "boom".to_string())
    );

    let status = WireStatus {
        code: Some(WireStatusCode::Name("STATUS_CODE_OK".to_string())),
        message: None,
    };
    assert_eq!(decode_status(Some(&status)), (TraceStatus::Ok, String::new()));

    let status = WireStatus {
        code: Some(WireStatusCode::Number(9)),
        message: None,
    };
    assert_eq!(decode_status(Some(&status)).0, TraceStatus::Unset);
}

// ============================================================================
// FULL SPAN
// ============================================================================

#[test]
fn test_decode_span_llm_call() {
    let span = make_span(vec![
        kv("span.kind", string_value("LLM")),
        kv("project.run_id", string_value("run-42")),
    ]);

    let decoded = decode_span(&span).unwrap();
    assert_eq!(decoded.id, "01");
    assert_eq!(decoded.trace_id, "ab12");
    assert_eq!(decoded.parent_span_id, "");
    assert_eq!(decoded.name, "call-llm");
    assert_eq!(decoded.span_kind, SpanKind::Llm);
    assert_eq!(decoded.run_id, "run-42");
    assert_eq!(decoded.latency_ms, 50.0);
    assert_eq!(decoded.start_time, "1970-01-01T00:00:01.000Z");
    assert_eq!(decoded.end_time, "1970-01-01T00:00:01.050Z");
    assert_eq!(decoded.status, TraceStatus::Unset);
    assert_eq!(decoded.status_message, "");
    assert_eq!(
        JsonValue::Object(decoded.attributes),
        json!({"span": {"kind": "LLM"}, "project": {"run_id": "run-42"}})
    );
}

#[test]
fn test_decode_span_latency_matches_timestamps() {
    let mut span = make_span(vec![]);
    span.start_time_unix_nano = Some(WireNanos::Int(1_704_067_200_000_400_000));
    span.end_time_unix_nano = Some(WireNanos::Text("1704067201234999999".to_string()));

    let decoded = decode_span(&span).unwrap();
    let start = iso_to_millis(&decoded.start_time).unwrap();
    let end = iso_to_millis(&decoded.end_time).unwrap();
    assert_eq!(decoded.latency_ms, (end - start) as f64);
    assert_eq!(decoded.latency_ms, 1234.0);
}

#[test]
fn test_decode_span_kind_defaults_to_common() {
    let span = make_span(vec![kv("project.run_id", string_value("run-42"))]);
    assert_eq!(decode_span(&span).unwrap().span_kind, SpanKind::Common);
}

#[test]
fn test_decode_span_with_parent_status_and_events() {
    let mut span = make_span(vec![]);
    span.parent_span_id = Some(WireId::Text("parent-1".to_string()));
    span.status = Some(WireStatus {
        code: Some(WireStatusCode::Number(1)),
        message: Some("done".to_string()),
    });
    span.events = vec![
        WireEvent {
            time_unix_nano: Some(WireNanos::Int(1_010_000_000)),
            name: Some("first".to_string()),
            attributes: vec![],
        },
        WireEvent {
            time_unix_nano: Some(WireNanos::Int(1_020_000_000)),
            name: Some("second".to_string()),
            attributes: vec![kv("n", int_value(2))],
        },
    ];

    let decoded = decode_span(&span).unwrap();
    assert_eq!(decoded.parent_span_id, "parent-1");
    assert_eq!(decoded.status, TraceStatus::Ok);
    assert_eq!(decoded.status_message, "done");
    assert_eq!(decoded.events.len(), 2);
    assert_eq!(decoded.events[0].name, "first");
    assert_eq!(decoded.events[1].timestamp, "1970-01-01T00:00:01.020Z");
    assert_eq!(decoded.events[1].attributes["n"], 2);
}

#[test]
fn test_decode_span_bad_event_fails_span() {
    let mut span = make_span(vec![]);
    span.events = vec![WireEvent {
        time_unix_nano: Some(WireNanos::Text("later".to_string())),
        name: Some("bad".to_string()),
        attributes: vec![],
    }];
    assert!(decode_span(&span).is_err());
}

#[test]
fn test_decode_span_missing_timestamp_fails() {
    let mut span = make_span(vec![]);
    span.end_time_unix_nano = None;
    assert_eq!(
        decode_span(&span).unwrap_err(),
        SpanDecodeError::MissingTimestamp
    );
}
