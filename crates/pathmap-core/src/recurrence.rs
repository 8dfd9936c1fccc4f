//! Built-in mapping domain between recurrence rules and platform recurrences
//!
//! The *rule* shape follows RFC 5545 RRULE parts:
//!
//! ```json
//! {"freq": "WEEKLY", "interval": 2, "count": 5, "byweekday": ["MO", "1FR"]}
//! ```
//!
//! The *platform* shape is the native recurrence object of mobile calendar
//! APIs:
//!
//! ```json
//! {"frequency": 1, "interval": 2, "end": {"occurrenceCount": 5},
//!  "daysOfTheWeek": [{"dayOfWeek": 2}, {"dayOfWeek": 6, "week": 1}]}
//! ```
//!
//! Forward maps rule to platform, inverse maps platform to rule. Frequencies
//! are recoded through translation tables; weekdays and end dates need
//! callbacks because they change structure.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::mapping::{
    Callback, DirectionBuilder, MappingDomain, MappingDomainBuilder, PathMapper,
    ValueTranslationTable,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

/// Name of the built-in domain
pub const DOMAIN_NAME: &str = "recurrence";

/// Date format of platform end dates, e.g. `2025-01-31T09:30:00.000+0000`
pub const PLATFORM_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f+0000";

/// Rule frequencies and their platform codes
pub const FREQUENCIES: [(&str, i64); 4] =
    [("YEARLY", 3), ("MONTHLY", 2), ("WEEKLY", 1), ("DAILY", 0)];

/// Rule weekday tokens in platform order; the platform number is index + 1
pub const WEEKDAYS: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

pub const UNTIL_CALLBACK: &str = "rrule_until_to_platform_end";
pub const END_DATE_CALLBACK: &str = "platform_end_date_to_rrule_until";
pub const BYWEEKDAY_CALLBACK: &str = "rrule_weekdays_to_platform";
pub const DAYS_OF_WEEK_CALLBACK: &str = "platform_weekdays_to_rrule";

static WEEKDAY_PATTERN: OnceLock<Regex> = OnceLock::new();
static WEEKDAY_TO_PLATFORM: OnceLock<ValueTranslationTable> = OnceLock::new();
static WEEKDAY_FROM_PLATFORM: OnceLock<ValueTranslationTable> = OnceLock::new();
static MAPPER: OnceLock<PathMapper> = OnceLock::new();

/// A weekday token split into its optional ordinal and its day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayToken<'a> {
    pub ordinal: Option<i64>,
    pub day: &'a str,
}

/// Parse `MO`, `1FR`, `-1SU` style tokens
pub fn parse_weekday_token(token: &str) -> Option<WeekdayToken<'_>> {
    let pattern = WEEKDAY_PATTERN.get_or_init(|| {
        Regex::new(r"^([+-]?[0-9]{1,2})?(MO|TU|WE|TH|FR|SA|SU)$").expect("weekday pattern is valid")
    });

    let captures = pattern.captures(token)?;
    let ordinal = match captures.get(1) {
        Some(m) => {
            let n: i64 = m.as_str().parse().ok()?;
            if n == 0 || n.abs() > 53 {
                return None;
            }
            Some(n)
        }
        None => None,
    };
    let day = captures.get(2)?.as_str();

    Some(WeekdayToken { ordinal, day })
}

fn weekday_to_platform() -> &'static ValueTranslationTable {
    WEEKDAY_TO_PLATFORM.get_or_init(|| {
        let mut table = ValueTranslationTable::new();
        for (index, day) in WEEKDAYS.iter().enumerate() {
            table.insert(&json!(day), json!(index + 1));
        }
        table
    })
}

fn weekday_from_platform() -> &'static ValueTranslationTable {
    WEEKDAY_FROM_PLATFORM.get_or_init(|| {
        let mut table = ValueTranslationTable::new();
        for (index, day) in WEEKDAYS.iter().enumerate() {
            table.insert(&json!(index + 1), json!(day));
        }
        table
    })
}

/// Frequency translation, rule token to platform code
pub fn frequency_to_platform() -> ValueTranslationTable {
    let mut table = ValueTranslationTable::new();
    for (freq, code) in FREQUENCIES {
        table.insert(&json!(freq), json!(code));
    }
    table
}

/// Frequency translation, platform code to rule token
pub fn frequency_from_platform() -> ValueTranslationTable {
    let mut table = ValueTranslationTable::new();
    for (freq, code) in FREQUENCIES {
        table.insert(&json!(code), json!(freq));
    }
    table
}

/// Parse a rule `UNTIL` value
///
/// Accepts RFC 3339, RRULE basic form (`20250131T093000Z`, floating times are
/// read as UTC) and plain dates (`20250131`, `2025-01-31`, midnight UTC).
pub fn parse_rule_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y%m%dT%H%M%SZ", "%Y%m%dT%H%M%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    for format in ["%Y%m%d", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Parse a platform end date (`2025-01-31T09:30:00.000+0000` or RFC 3339)
pub fn parse_platform_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a date the way platform end dates are written
pub fn format_platform_date(date: &DateTime<Utc>) -> String {
    date.format(PLATFORM_DATE_FORMAT).to_string()
}

/// Format a date the way rule `until` values are written
pub fn format_rule_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn until_to_platform_end(output: &mut Value, value: &Value) -> Result<()> {
    let date = value
        .as_str()
        .and_then(parse_rule_date)
        .ok_or_else(|| Error::callback(UNTIL_CALLBACK, "until", format!("unreadable date {}", value)))?;

    // replaces any occurrence count written before
    output["end"] = json!({ "endDate": format_platform_date(&date) });
    Ok(())
}

fn end_date_to_rule_until(output: &mut Value, value: &Value) -> Result<()> {
    let date = value.as_str().and_then(parse_platform_date).ok_or_else(|| {
        Error::callback(END_DATE_CALLBACK, "end.endDate", format!("unreadable date {}", value))
    })?;

    output["until"] = json!(format_rule_date(&date));
    Ok(())
}

fn weekdays_to_platform(output: &mut Value, value: &Value) -> Result<()> {
    let tokens: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    let mut days = Vec::with_capacity(tokens.len());
    for token in tokens {
        let parsed = token.as_str().and_then(parse_weekday_token).ok_or_else(|| {
            Error::callback(BYWEEKDAY_CALLBACK, "byweekday", format!("invalid weekday {}", token))
        })?;
        let day_of_week = weekday_to_platform()
            .lookup(&json!(parsed.day))
            .cloned()
            .ok_or_else(|| {
                Error::callback(BYWEEKDAY_CALLBACK, "byweekday", format!("unknown weekday {}", parsed.day))
            })?;

        let mut day = json!({ "dayOfWeek": day_of_week });
        if let Some(week) = parsed.ordinal {
            day["week"] = json!(week);
        }
        days.push(day);
    }

    output["daysOfTheWeek"] = Value::Array(days);
    Ok(())
}

/// Integer value of a number, accepting floats such as `1.0`
fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
            .map(|float| float as i64)
    })
}

fn weekdays_to_rule(output: &mut Value, value: &Value) -> Result<()> {
    let entries = value.as_array().ok_or_else(|| {
        Error::callback(DAYS_OF_WEEK_CALLBACK, "daysOfTheWeek", format!("expected a list, got {}", value))
    })?;

    let mut tokens = Vec::with_capacity(entries.len());
    for entry in entries {
        let day = entry
            .get("dayOfWeek")
            .and_then(|number| weekday_from_platform().lookup(number))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::callback(DAYS_OF_WEEK_CALLBACK, "daysOfTheWeek", format!("invalid day {}", entry))
            })?;

        let token = match entry.get("week").and_then(whole_number).filter(|week| *week != 0) {
            Some(week) => format!("{}{}", week, day),
            None => day.to_string(),
        };
        tokens.push(Value::String(token));
    }

    output["byweekday"] = Value::Array(tokens);
    Ok(())
}

/// The four callbacks used by the recurrence domain
pub fn callbacks() -> Vec<Callback> {
    vec![
        Callback::new(UNTIL_CALLBACK, until_to_platform_end),
        Callback::new(END_DATE_CALLBACK, end_date_to_rule_until),
        Callback::new(BYWEEKDAY_CALLBACK, weekdays_to_platform),
        Callback::new(DAYS_OF_WEEK_CALLBACK, weekdays_to_rule),
    ]
}

/// Build the recurrence mapping domain
pub fn domain() -> Result<MappingDomain> {
    MappingDomainBuilder::new(DOMAIN_NAME)
        .forward(
            DirectionBuilder::new()
                .map("interval", "interval")
                .map("count", "end.occurrenceCount")
                .callback("until", Callback::new(UNTIL_CALLBACK, until_to_platform_end))
                .map("freq", "frequency")
                .map("bymonth", "monthsOfTheYear")
                .map("bymonthday", "daysOfTheMonth")
                .map("byyearday", "daysOfTheYear")
                .callback("byweekday", Callback::new(BYWEEKDAY_CALLBACK, weekdays_to_platform))
                .translation_table("freq", frequency_to_platform()),
        )
        .inverse(
            DirectionBuilder::new()
                .map("interval", "interval")
                .map("end.occurrenceCount", "count")
                .callback("end.endDate", Callback::new(END_DATE_CALLBACK, end_date_to_rule_until))
                .map("frequency", "freq")
                .map("monthsOfTheYear", "bymonth")
                .map("daysOfTheMonth", "bymonthday")
                .map("daysOfTheYear", "byyearday")
                .callback("daysOfTheWeek", Callback::new(DAYS_OF_WEEK_CALLBACK, weekdays_to_rule))
                .translation_table("frequency", frequency_from_platform()),
        )
        .build()
}

/// Shared mapper over the recurrence domain
pub fn mapper() -> Result<&'static PathMapper> {
    if let Some(mapper) = MAPPER.get() {
        return Ok(mapper);
    }
    let mapper = PathMapper::new(domain()?)?;
    Ok(MAPPER.get_or_init(|| mapper))
}

/// Fill rule defaults: a rule without `interval` repeats every period
pub fn apply_rule_defaults(rule: &mut Value) {
    if let Some(fields) = rule.as_object_mut() {
        let missing = fields.get("interval").map_or(true, |v| v.is_null() || v == &json!(0));
        if missing {
            fields.insert("interval".to_string(), json!(1));
        }
    }
}

/// Convert a rule into its platform recurrence, applying rule defaults
pub fn rule_to_platform(rule: &Value) -> Result<Value> {
    let mut rule = rule.clone();
    apply_rule_defaults(&mut rule);
    mapper()?.transform_forward(&rule)
}

/// Convert a platform recurrence back into a rule
pub fn platform_to_rule(platform: &Value) -> Result<Value> {
    mapper()?.transform_inverse(platform)
}
