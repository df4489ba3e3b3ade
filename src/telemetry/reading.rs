//! Rows and typed readings
//!
//! Telemetry CSV lines are positional: `timestamp, plant 1, <unused>, plant 2`.

use serde::Serialize;
use thiserror::Error;

pub const TIMESTAMP_FIELD: usize = 0;
pub const MOISTURE_A_FIELD: usize = 1;
pub const MOISTURE_B_FIELD: usize = 3;

/// One parsed CSV line, fields in file order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

/// A row projected onto the fields the charts use
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: String,
    pub moisture_a: f64,
    pub moisture_b: f64,
}

/// Why a row does not map cleanly onto a `Reading`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIssue {
    #[error("field {index} is missing")]
    MissingField { index: usize },

    #[error("field {index} is not a number: {value:?}")]
    NotANumber { index: usize, value: String },
}

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn numeric(&self, index: usize) -> Result<f64, ParseIssue> {
        let raw = self.field(index).ok_or(ParseIssue::MissingField { index })?;
        parse_number(raw).ok_or_else(|| ParseIssue::NotANumber {
            index,
            value: raw.to_string(),
        })
    }

    /// Strict projection; the first problem found is reported
    pub fn to_reading(&self) -> Result<Reading, ParseIssue> {
        let timestamp = self
            .field(TIMESTAMP_FIELD)
            .ok_or(ParseIssue::MissingField { index: TIMESTAMP_FIELD })?;
        Ok(Reading {
            timestamp: timestamp.to_string(),
            moisture_a: self.numeric(MOISTURE_A_FIELD)?,
            moisture_b: self.numeric(MOISTURE_B_FIELD)?,
        })
    }

    /// Projection that never fails: bad numbers become NaN, a missing timestamp is empty
    pub fn to_reading_lossy(&self) -> Reading {
        Reading {
            timestamp: self.field(TIMESTAMP_FIELD).unwrap_or_default().to_string(),
            moisture_a: self.numeric(MOISTURE_A_FIELD).unwrap_or(f64::NAN),
            moisture_b: self.numeric(MOISTURE_B_FIELD).unwrap_or(f64::NAN),
        }
    }
}

impl From<Vec<String>> for Row {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl From<&[&str]> for Row {
    fn from(fields: &[&str]) -> Self {
        Self(fields.iter().map(|f| f.to_string()).collect())
    }
}

/// Parse the longest numeric prefix of a field.
///
/// Leading whitespace is skipped and trailing garbage ignored, so `" 812\r"`
/// and `"812mV"` both read as 812. `Infinity` is accepted with an optional
/// sign. Returns `None` when no digits lead the field.
pub fn parse_number(field: &str) -> Option<f64> {
    let s = field.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse().ok();
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let dot = end;
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        digits += end - dot - 1;
        if end - dot == 1 && digits == 0 {
            end = dot;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            end = exp;
        }
    }

    s[..end].parse().ok()
}
