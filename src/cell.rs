//! Spreadsheet cell values and their coercion into typed values.
//!
//! Workbook readers hand rows to the parser as slices of [`Cell`]. Date cells
//! may arrive either already resolved or as raw serial numbers, in which case
//! the workbook's [`DateMode`] decides the epoch.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Largest serial representable in either epoch (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Raw cell as produced by a workbook reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Date stored as a day serial relative to the workbook epoch.
    Date(f64),
    /// Date already resolved by the reader.
    DateTime(NaiveDateTime),
    Error(String),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Date system of a workbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateMode {
    /// Windows epoch, including the phantom 1900-02-29.
    #[default]
    Excel1900,
    /// Mac epoch starting at 1904-01-01.
    Excel1904,
}

impl DateMode {
    /// Convert a day serial into a date/time, keeping millisecond precision.
    pub fn to_datetime(&self, serial: f64) -> Option<NaiveDateTime> {
        if !serial.is_finite() || !(0.0..=MAX_SERIAL).contains(&serial) {
            return None;
        }

        let epoch = match self {
            DateMode::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1)?,
            DateMode::Excel1900 if serial < 60.0 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
            DateMode::Excel1900 => NaiveDate::from_ymd_opt(1899, 12, 30)?,
        };

        let days = serial.trunc();
        let millis = ((serial - days) * 86_400_000.0).round() as i64;

        epoch
            .and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::days(days as i64))?
            .checked_add_signed(Duration::milliseconds(millis))
    }
}

/// A cell value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

/// Normalize a single cell: dates are resolved, text is trimmed, the rest passes through.
pub fn coerce(cell: &Cell, mode: DateMode) -> Value {
    match cell {
        Cell::Date(serial) => match mode.to_datetime(*serial) {
            Some(datetime) => Value::DateTime(datetime),
            None => Value::Error(format!("date serial {} out of range", serial)),
        },
        Cell::DateTime(datetime) => Value::DateTime(*datetime),
        Cell::Text(text) => Value::Text(text.trim().to_string()),
        Cell::Number(n) => Value::Number(*n),
        Cell::Bool(b) => Value::Bool(*b),
        Cell::Empty => Value::Empty,
        Cell::Error(e) => Value::Error(e.clone()),
    }
}

impl Value {
    /// Numeric reading of an amount cell. Empty cells count as zero.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Empty => Some(Decimal::ZERO),
            Value::Number(n) => Decimal::from_f64(*n),
            Value::Text(t) if t.is_empty() => Some(Decimal::ZERO),
            Value::Text(t) => Decimal::from_str(t).ok(),
            _ => None,
        }
    }

    /// Textual reading of a cell. Integral numbers lose their fractional part.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Empty => Some(String::new()),
            Value::Text(t) => Some(t.clone()),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(datetime) => Some(*datetime),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("<empty>"),
            Value::Text(t) => write!(f, "'{}'", t),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(d) => write!(f, "{}", d),
            Value::Error(e) => write!(f, "#{}", e),
        }
    }
}
