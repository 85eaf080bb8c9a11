//! Ordered field resolution over JSON records.
//!
//! A `FieldChain` lists every place a logical field has lived across schema
//! versions, newest first. Resolution takes the first source holding a usable
//! value; callers supply the hard-coded default.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChain {
    /// Canonical field name, for logs and tests.
    pub field: &'static str,
    /// JSON pointers, structured locations first and flat legacy columns after.
    pub sources: &'static [&'static str],
}

impl FieldChain {
    pub const fn new(field: &'static str, sources: &'static [&'static str]) -> Self {
        Self { field, sources }
    }

    /// First source whose value converts, with the pointer that supplied it.
    pub fn resolve_with<'a, T>(
        &self,
        record: &'a Value,
        convert: impl Fn(&'a Value) -> Option<T>,
    ) -> Option<(&'static str, T)> {
        self.sources.iter().find_map(|pointer| {
            record
                .pointer(pointer)
                .filter(|value| !value.is_null())
                .and_then(&convert)
                .map(|converted| (*pointer, converted))
        })
    }

    /// Pointer that supplied the text value, if any.
    pub fn source_of(&self, record: &Value) -> Option<&'static str> {
        self.resolve_with(record, as_text).map(|(pointer, _)| pointer)
    }

    pub fn text(&self, record: &Value) -> Option<String> {
        self.resolve_with(record, as_text).map(|(_, value)| value)
    }

    pub fn text_or(&self, record: &Value, default: &str) -> String {
        self.text(record).unwrap_or_else(|| default.to_string())
    }

    pub fn decimal(&self, record: &Value) -> Option<Decimal> {
        self.resolve_with(record, as_decimal).map(|(_, value)| value)
    }

    pub fn integer(&self, record: &Value) -> Option<i64> {
        self.resolve_with(record, as_integer).map(|(_, value)| value)
    }

    pub fn array<'a>(&self, record: &'a Value) -> Option<&'a Vec<Value>> {
        self.resolve_with(record, |value| value.as_array().filter(|items| !items.is_empty()))
            .map(|(_, items)| items)
    }
}

/// Non-blank strings and scalars rendered as text.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => Decimal::from_str(&number.to_string())
            .ok()
            .or_else(|| number.as_f64().and_then(|float| Decimal::try_from(float).ok())),
        Value::String(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    }
}

pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0)
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}
