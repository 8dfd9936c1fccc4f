//! Tests for the transform engine
//!
//! Covers missing-field skips, translation lookups under each strictness
//! mode, nested writes, callback rules and reported transforms.

use super::{Callback, DirectionBuilder, MappingDomainBuilder, PathMapper, Verse};
use crate::error::Error;
use crate::{LossinessCode, Severity, StrictMode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn forward_only(direction: DirectionBuilder) -> PathMapper {
    let domain = MappingDomainBuilder::new("test")
        .forward(direction)
        .build()
        .unwrap();
    PathMapper::new(domain).unwrap()
}

#[test]
fn test_missing_field_is_skipped() {
    let mapper = forward_only(DirectionBuilder::new().map("b", "x"));

    let output = mapper.transform_forward(&json!({"a": 1})).unwrap();
    assert_eq!(output, json!({}));
    assert!(output.get("x").is_none());
}

#[test]
fn test_null_and_empty_inputs_are_skipped() {
    let mapper = forward_only(
        DirectionBuilder::new()
            .map("bymonth", "monthsOfTheYear")
            .map("until", "end.endDate")
            .map("interval", "interval"),
    );

    let output = mapper
        .transform_forward(&json!({"bymonth": [], "until": null, "interval": 0}))
        .unwrap();
    assert_eq!(output, json!({"interval": 0}));
}

#[test]
fn test_translation_lookup() {
    let mapper = forward_only(
        DirectionBuilder::new()
            .map("freq", "frequency")
            .translate("freq", json!("WEEKLY"), json!(2)),
    );

    let output = mapper.transform_forward(&json!({"freq": "WEEKLY"})).unwrap();
    assert_eq!(output, json!({"frequency": 2}));
}

#[test]
fn test_untranslatable_value_is_dropped_by_default() {
    let mapper = forward_only(
        DirectionBuilder::new()
            .map("freq", "frequency")
            .translate("freq", json!("WEEKLY"), json!(2)),
    );
    assert_eq!(mapper.strict_mode(), StrictMode::Warn);

    let outcome = mapper
        .transform_with_report(Verse::Forward, &json!({"freq": "UNKNOWN"}))
        .unwrap();
    assert_eq!(outcome.output, json!({}));
    assert!(outcome.has_lossiness());

    let item = &outcome.lossiness.items[0];
    assert_eq!(item.code, LossinessCode::Drop);
    assert_eq!(item.path, "freq");
    assert_eq!(item.before, Some(json!("UNKNOWN")));
    assert_eq!(item.severity, Severity::Warning);
}

#[test]
fn test_dropped_nested_value_keeps_containers() {
    let mapper = forward_only(
        DirectionBuilder::new()
            .map("count", "end.occurrenceCount")
            .translate("count", json!(1), json!(1)),
    );

    let output = mapper.transform_forward(&json!({"count": 7})).unwrap();
    assert_eq!(output, json!({"end": {}}));
}

#[test]
fn test_untranslatable_value_fails_in_strict_mode() {
    let mapper = forward_only(
        DirectionBuilder::new()
            .map("freq", "frequency")
            .translate("freq", json!("WEEKLY"), json!(2)),
    )
    .with_strict_mode(StrictMode::Strict);

    match mapper.transform_forward(&json!({"freq": "UNKNOWN"})) {
        Err(Error::Translation { path, value }) => {
            assert_eq!(path, "freq");
            assert_eq!(value, json!("UNKNOWN"));
        }
        other => panic!("expected translation error, got {:?}", other),
    }

    // Known values still translate
    assert_eq!(
        mapper.transform_forward(&json!({"freq": "WEEKLY"})).unwrap(),
        json!({"frequency": 2})
    );
}

#[test]
fn test_untranslatable_value_passes_through_in_coerce_mode() {
    let mapper = forward_only(
        DirectionBuilder::new()
            .map("freq", "frequency")
            .translate("freq", json!("WEEKLY"), json!(2)),
    )
    .with_strict_mode(StrictMode::Coerce);

    let outcome = mapper
        .transform_with_report(Verse::Forward, &json!({"freq": "HOURLY"}))
        .unwrap();
    assert_eq!(outcome.output, json!({"frequency": "HOURLY"}));
    assert_eq!(outcome.lossiness.items[0].code, LossinessCode::MapFallback);
}

#[test]
fn test_nested_path_write() {
    let mapper = forward_only(DirectionBuilder::new().map("count", "end.occurrenceCount"));

    let output = mapper.transform_forward(&json!({"count": 5})).unwrap();
    assert_eq!(output, json!({"end": {"occurrenceCount": 5}}));
}

#[test]
fn test_nested_path_read() {
    let mapper = forward_only(
        DirectionBuilder::new()
            .map("end.occurrenceCount", "count")
            .map("end.endDate", "until"),
    );

    let output = mapper
        .transform_forward(&json!({"end": {"occurrenceCount": 3}}))
        .unwrap();
    assert_eq!(output, json!({"count": 3}));
}

#[test]
fn test_callback_receives_translated_value_and_owns_its_output() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let mapper = forward_only(
        DirectionBuilder::new()
            .map_with("byweekday", "days_of_week", move |out, value| {
                seen.fetch_add(1, Ordering::SeqCst);
                let days: Vec<Value> = value
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|day| json!({"dayOfWeek": day}))
                    .collect();
                out["daysOfTheWeek"] = Value::Array(days);
                Ok(())
            })
            .map_with("freq", "frequency_code", |out, value| {
                out["frequencyCode"] = value.clone();
                Ok(())
            })
            .translate("freq", json!("DAILY"), json!(0)),
    );

    let output = mapper
        .transform_forward(&json!({"byweekday": [2, 4], "freq": "DAILY"}))
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        output,
        json!({
            "daysOfTheWeek": [{"dayOfWeek": 2}, {"dayOfWeek": 4}],
            "frequencyCode": 0
        })
    );
    assert!(output.get("byweekday").is_none());
}

#[test]
fn test_callback_not_invoked_for_dropped_value() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let mapper = forward_only(
        DirectionBuilder::new()
            .callback(
                "freq",
                Callback::new("count_calls", move |_, _| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .translate("freq", json!("DAILY"), json!(0)),
    );

    let output = mapper.transform_forward(&json!({"freq": "SECONDLY"})).unwrap();
    assert_eq!(output, json!({}));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_callback_errors_propagate() {
    let mapper = forward_only(DirectionBuilder::new().map_with("until", "reject", |_, value| {
        Err(Error::callback("reject", "until", format!("cannot parse {}", value)))
    }));

    let err = mapper.transform_forward(&json!({"until": "soon"})).unwrap_err();
    assert!(matches!(err, Error::Callback { .. }));
    assert!(err.to_string().contains("reject"));
}

#[test]
fn test_input_is_not_mutated() {
    let mapper = forward_only(
        DirectionBuilder::new()
            .map("count", "end.occurrenceCount")
            .map_with("interval", "touch", |out, value| {
                out["interval"] = json!(value.as_i64().unwrap_or(0) * 10);
                Ok(())
            }),
    );

    let input = json!({"count": 2, "interval": 3});
    let snapshot = input.clone();
    let output = mapper.transform_forward(&input).unwrap();

    assert_eq!(input, snapshot);
    assert_eq!(output, json!({"end": {"occurrenceCount": 2}, "interval": 30}));
}

#[test]
fn test_verse_selects_table() {
    let domain = MappingDomainBuilder::new("rename")
        .forward(DirectionBuilder::new().map("a", "b"))
        .inverse(DirectionBuilder::new().map("b", "a"))
        .build()
        .unwrap();
    let mapper = PathMapper::new(domain).unwrap();

    assert_eq!(mapper.transform(Verse::Forward, &json!({"a": 1})).unwrap(), json!({"b": 1}));
    assert_eq!(mapper.transform(Verse::Inverse, &json!({"b": 1})).unwrap(), json!({"a": 1}));
    assert_eq!(mapper.transform(Verse::Inverse, &json!({"a": 1})).unwrap(), json!({}));
}

#[test]
fn test_non_object_input_yields_empty_output() {
    let mapper = forward_only(DirectionBuilder::new().map("a", "b"));

    assert_eq!(mapper.transform_forward(&Value::Null).unwrap(), json!({}));
    assert_eq!(mapper.transform_forward(&json!([{"a": 1}])).unwrap(), json!({}));
}

#[test]
fn test_mapper_is_shareable_across_threads() {
    let mapper = Arc::new(forward_only(
        DirectionBuilder::new()
            .map("freq", "frequency")
            .translate("freq", json!("WEEKLY"), json!(1)),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let mapper = Arc::clone(&mapper);
            std::thread::spawn(move || mapper.transform_forward(&json!({"freq": "WEEKLY"})).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), json!({"frequency": 1}));
    }
}
