//! RRULE text codec for the recurrence rule shape
//!
//! Converts between RFC 5545 recurrence rule text such as
//! `RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,1FR;UNTIL=20250131T000000Z` and the
//! rule object consumed by the [`recurrence`](crate::recurrence) domain:
//!
//! ```
//! use pathmap_core::rrule;
//! use serde_json::json;
//!
//! let rule = rrule::parse("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,1FR").unwrap();
//! assert_eq!(rule, json!({"freq": "WEEKLY", "interval": 2, "byweekday": ["MO", "1FR"]}));
//! assert_eq!(rrule::format(&rule).unwrap(), "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,1FR");
//! ```
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::recurrence::{format_rule_date, parse_rule_date, parse_weekday_token};
use serde_json::{Map, Value};

/// Frequencies allowed by RFC 5545
pub const RULE_FREQUENCIES: [&str; 7] = [
    "SECONDLY", "MINUTELY", "HOURLY", "DAILY", "WEEKLY", "MONTHLY", "YEARLY",
];

#[derive(Debug, Clone, Copy)]
enum PartKind {
    Frequency,
    Positive,
    Until,
    /// Non-zero integers with `|n| <= max`, optionally signed
    IntList { max: i64, signed: bool },
    Weekdays,
    Weekday,
}

/// Rule parts in output order: (RRULE name, rule field, kind)
const PARTS: [(&str, &str, PartKind); 10] = [
    ("FREQ", "freq", PartKind::Frequency),
    ("INTERVAL", "interval", PartKind::Positive),
    ("COUNT", "count", PartKind::Positive),
    ("UNTIL", "until", PartKind::Until),
    ("BYMONTH", "bymonth", PartKind::IntList { max: 12, signed: false }),
    ("BYMONTHDAY", "bymonthday", PartKind::IntList { max: 31, signed: true }),
    ("BYYEARDAY", "byyearday", PartKind::IntList { max: 366, signed: true }),
    ("BYDAY", "byweekday", PartKind::Weekdays),
    ("BYSETPOS", "bysetpos", PartKind::IntList { max: 366, signed: true }),
    ("WKST", "wkst", PartKind::Weekday),
];

fn rule_error(input: &str, message: impl Into<String>) -> Error {
    Error::Rule {
        input: input.to_string(),
        message: message.into(),
    }
}

/// Parse RRULE text into a rule object
pub fn parse(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let body = match trimmed.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &trimmed[6..],
        _ => trimmed,
    };

    let mut rule = Map::new();
    for part in body.split(';').filter(|p| !p.is_empty()) {
        let (name, raw) = part
            .split_once('=')
            .ok_or_else(|| rule_error(text, format!("part '{}' has no value", part)))?;
        let name = name.trim().to_ascii_uppercase();

        let (_, field, kind) = PARTS
            .iter()
            .find(|(part_name, _, _)| *part_name == name)
            .ok_or_else(|| rule_error(text, format!("unsupported part '{}'", name)))?;

        if rule.contains_key(*field) {
            return Err(rule_error(text, format!("part '{}' appears twice", name)));
        }

        let value = parse_part(text, &name, raw.trim(), *kind)?;
        rule.insert(field.to_string(), value);
    }

    if !rule.contains_key("freq") {
        return Err(rule_error(text, "FREQ is required"));
    }
    if rule.contains_key("count") && rule.contains_key("until") {
        return Err(rule_error(text, "COUNT and UNTIL are mutually exclusive"));
    }

    Ok(Value::Object(rule))
}

fn parse_part(text: &str, name: &str, raw: &str, kind: PartKind) -> Result<Value> {
    match kind {
        PartKind::Frequency => {
            let freq = raw.to_ascii_uppercase();
            if RULE_FREQUENCIES.contains(&freq.as_str()) {
                Ok(Value::String(freq))
            } else {
                Err(rule_error(text, format!("unknown frequency '{}'", raw)))
            }
        }
        PartKind::Positive => match raw.parse::<u64>() {
            Ok(n) if n > 0 => Ok(Value::from(n)),
            _ => Err(rule_error(text, format!("{} must be a positive integer", name))),
        },
        PartKind::Until => parse_rule_date(raw)
            .map(|date| Value::String(format_rule_date(&date)))
            .ok_or_else(|| rule_error(text, format!("unreadable UNTIL '{}'", raw))),
        PartKind::IntList { max, signed } => raw
            .split(',')
            .map(|item| {
                check_int(item.trim().parse::<i64>().ok(), max, signed)
                    .map(Value::from)
                    .ok_or_else(|| rule_error(text, format!("invalid {} value '{}'", name, item)))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        PartKind::Weekdays => raw
            .split(',')
            .map(|item| {
                let token = item.trim().to_ascii_uppercase();
                match parse_weekday_token(&token) {
                    Some(_) => Ok(Value::String(token)),
                    None => Err(rule_error(text, format!("invalid BYDAY value '{}'", item))),
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        PartKind::Weekday => {
            let token = raw.to_ascii_uppercase();
            match parse_weekday_token(&token) {
                Some(day) if day.ordinal.is_none() => Ok(Value::String(token)),
                _ => Err(rule_error(text, format!("invalid WKST value '{}'", raw))),
            }
        }
    }
}

fn check_int(value: Option<i64>, max: i64, signed: bool) -> Option<i64> {
    let n = value?;
    let in_range = n != 0 && n.abs() <= max && (signed || n > 0);
    in_range.then_some(n)
}

/// Format a rule object as RRULE text (without the `RRULE:` prefix)
pub fn format(rule: &Value) -> Result<String> {
    let fields = rule
        .as_object()
        .ok_or_else(|| rule_error(&rule.to_string(), "rule must be an object"))?;

    if let Some(unknown) = fields
        .keys()
        .find(|key| !PARTS.iter().any(|(_, field, _)| field == key))
    {
        return Err(rule_error(&rule.to_string(), format!("unsupported field '{}'", unknown)));
    }
    if !fields.contains_key("freq") {
        return Err(rule_error(&rule.to_string(), "freq is required"));
    }

    let mut parts = Vec::new();
    for (name, field, kind) in PARTS {
        let Some(value) = fields.get(field).filter(|v| !v.is_null()) else {
            continue;
        };
        let text = format_part(value, kind)
            .ok_or_else(|| rule_error(&rule.to_string(), format!("invalid {} value {}", field, value)))?;
        parts.push(format!("{}={}", name, text));
    }

    Ok(parts.join(";"))
}

fn format_part(value: &Value, kind: PartKind) -> Option<String> {
    match kind {
        PartKind::Frequency => value
            .as_str()
            .map(str::to_ascii_uppercase)
            .filter(|freq| RULE_FREQUENCIES.contains(&freq.as_str())),
        PartKind::Positive => value.as_u64().filter(|n| *n > 0).map(|n| n.to_string()),
        PartKind::Until => value
            .as_str()
            .and_then(parse_rule_date)
            .map(|date| date.format("%Y%m%dT%H%M%SZ").to_string()),
        PartKind::IntList { max, signed } => list_items(value)
            .into_iter()
            .map(|item| check_int(item.as_i64(), max, signed).map(|n| n.to_string()))
            .collect::<Option<Vec<_>>>()
            .map(|items| items.join(",")),
        PartKind::Weekdays => list_items(value)
            .into_iter()
            .map(|item| item.as_str().filter(|t| parse_weekday_token(t).is_some()).map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(|items| items.join(",")),
        PartKind::Weekday => value
            .as_str()
            .filter(|t| parse_weekday_token(t).is_some_and(|day| day.ordinal.is_none()))
            .map(str::to_string),
    }
}

/// Lists and single values are both accepted for list parts
fn list_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    }
}
