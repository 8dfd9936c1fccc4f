//! Property-based testing strategies for recurrence values
//!
//! Generates random but valid rule and platform recurrence objects, and
//! checks that the built-in domain and the RRULE codec agree with
//! themselves over them.

#![cfg(test)]

use crate::recurrence::{self, FREQUENCIES, WEEKDAYS};
use crate::rrule;
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Strategy for the four mapped frequencies
pub fn frequency_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(FREQUENCIES.iter().map(|(freq, _)| *freq).collect::<Vec<_>>())
}

/// Strategy for weekday tokens with an optional ordinal
pub fn weekday_token_strategy() -> impl Strategy<Value = String> {
    (
        option::of(prop_oneof![-5i64..=-1, 1i64..=5]),
        prop::sample::select(WEEKDAYS.to_vec()),
    )
        .prop_map(|(ordinal, day)| match ordinal {
            Some(n) => format!("{}{}", n, day),
            None => day.to_string(),
        })
}

/// Strategy for whole-second UTC instants between 2000 and 2099
pub fn until_strategy() -> impl Strategy<Value = String> {
    (946_684_800i64..4_102_444_800i64).prop_map(|secs| {
        chrono::DateTime::from_timestamp(secs, 0)
            .map(|date| recurrence::format_rule_date(&date))
            .unwrap_or_default()
    })
}

/// Strategy for rule objects the recurrence domain maps without loss
pub fn rule_strategy() -> impl Strategy<Value = Value> {
    (
        frequency_strategy(),
        1u64..10,
        prop_oneof![
            (1u64..100).prop_map(|count| ("count", json!(count))),
            until_strategy().prop_map(|until| ("until", json!(until))),
        ],
        option::of(vec(1i64..=12, 1..3)),
        option::of(vec(1i64..=28, 1..3)),
        option::of(vec(weekday_token_strategy(), 1..4)),
    )
        .prop_map(|(freq, interval, (end_key, end), bymonth, bymonthday, byweekday)| {
            let mut rule = Map::new();
            rule.insert("freq".to_string(), json!(freq));
            rule.insert("interval".to_string(), json!(interval));
            rule.insert(end_key.to_string(), end);
            if let Some(months) = bymonth {
                rule.insert("bymonth".to_string(), json!(months));
            }
            if let Some(days) = bymonthday {
                rule.insert("bymonthday".to_string(), json!(days));
            }
            if let Some(days) = byweekday {
                rule.insert("byweekday".to_string(), json!(days));
            }
            Value::Object(rule)
        })
}

/// Strategy for platform recurrence objects
pub fn platform_strategy() -> impl Strategy<Value = Value> {
    (
        prop::sample::select(vec![0i64, 1, 2, 3]),
        1u64..10,
        1u64..50,
        vec((1i64..=7, option::of(1i64..=4)), 0..4),
    )
        .prop_map(|(frequency, interval, count, days)| {
            let mut platform = json!({
                "frequency": frequency,
                "interval": interval,
                "end": {"occurrenceCount": count}
            });
            if !days.is_empty() {
                let days: Vec<Value> = days
                    .into_iter()
                    .map(|(day, week)| match week {
                        Some(week) => json!({"dayOfWeek": day, "week": week}),
                        None => json!({"dayOfWeek": day}),
                    })
                    .collect();
                platform["daysOfTheWeek"] = Value::Array(days);
            }
            platform
        })
}

proptest! {
    /// Property: a rule survives rule -> platform -> rule
    #[test]
    fn prop_rule_round_trip(rule in rule_strategy()) {
        let platform = recurrence::rule_to_platform(&rule).unwrap();
        let back = recurrence::platform_to_rule(&platform).unwrap();
        prop_assert_eq!(back, rule);
    }

    /// Property: a platform object survives platform -> rule -> platform
    #[test]
    fn prop_platform_round_trip(platform in platform_strategy()) {
        let rule = recurrence::platform_to_rule(&platform).unwrap();
        let back = recurrence::rule_to_platform(&rule).unwrap();
        prop_assert_eq!(back, platform);
    }

    /// Property: formatted rules parse back to the same rule
    #[test]
    fn prop_rrule_text_round_trip(rule in rule_strategy()) {
        let text = rrule::format(&rule).unwrap();
        prop_assert_eq!(rrule::parse(&text).unwrap(), rule);
    }
}
