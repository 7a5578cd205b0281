//! Statement header scanning.
//!
//! The header block of an export is a loose list of one-cell rows: the
//! statement period, the account number, the currency and finally the
//! caption row of the transaction table. Everything else in the block is
//! bank boilerplate and is ignored.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;

/// Date format used by header period lines, e.g. `01.01.2023.`.
pub const HEADER_DATE_FORMAT: &str = "%d.%m.%Y.";

/// Fixed label texts of one export language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLabels {
    /// Text preceding the period start date.
    pub period: &'static str,
    /// Text between the period start and end dates.
    pub period_separator: &'static str,
    pub account: &'static str,
    pub currency: &'static str,
    /// Caption of the date column, which opens the transaction table.
    pub end_of_header: &'static str,
}

impl HeaderLabels {
    /// Croatian-language export.
    pub const CROATIAN: HeaderLabels = HeaderLabels {
        period: "Prometi za razdoblje od",
        period_separator: "do",
        account: "Račun:",
        currency: "Valuta:",
        end_of_header: "Datum",
    };

    /// English-language export.
    pub const ENGLISH: HeaderLabels = HeaderLabels {
        period: "Period from",
        period_separator: "to",
        account: "Account:",
        currency: "Currency:",
        end_of_header: "Date",
    };

    /// Every label set the scanner recognizes.
    pub const KNOWN: [HeaderLabels; 2] = [HeaderLabels::CROATIAN, HeaderLabels::ENGLISH];
}

/// Classification of one header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine {
    Period { start: NaiveDate, end: NaiveDate },
    Account(String),
    Currency(String),
    EndOfHeader,
    NoMatch,
}

struct Matchers {
    period: Regex,
    account: Regex,
    currency: Regex,
    end_of_header: Regex,
}

impl Matchers {
    fn new(labels: &HeaderLabels) -> Result<Self> {
        Ok(Self {
            period: Regex::new(&format!(
                r"^{}\s+(?P<start>[0-9.]+)\s+{}\s+(?P<end>[0-9.]+)",
                regex::escape(labels.period),
                regex::escape(labels.period_separator)
            ))?,
            account: Regex::new(&format!(r"^{}\s*(?P<token>\w+)", regex::escape(labels.account)))?,
            currency: Regex::new(&format!(r"^{}\s*(?P<token>\w+)", regex::escape(labels.currency)))?,
            end_of_header: Regex::new(&format!(r"^{}\b", regex::escape(labels.end_of_header)))?,
        })
    }
}

/// Recognizes the four header line patterns of the known export languages.
pub struct HeaderScanner {
    matchers: Vec<Matchers>,
}

impl HeaderScanner {
    /// Build a scanner for all known label sets.
    pub fn new() -> Result<Self> {
        Self::with_labels(&HeaderLabels::KNOWN)
    }

    /// Build a scanner for the given label sets.
    pub fn with_labels(labels: &[HeaderLabels]) -> Result<Self> {
        let matchers = labels.iter().map(Matchers::new).collect::<Result<Vec<_>>>()?;
        Ok(Self { matchers })
    }

    /// Classify the first-column text of a header row.
    ///
    /// Patterns are tried in a fixed order: period, account, currency and
    /// end of header. `row` is only used to label date errors.
    pub fn classify(&self, text: &str, row: usize) -> Result<HeaderLine> {
        for m in &self.matchers {
            if let Some(caps) = m.period.captures(text) {
                let start = parse_header_date(&caps["start"], row)?;
                let end = parse_header_date(&caps["end"], row)?;
                return Ok(HeaderLine::Period { start, end });
            }
        }
        for m in &self.matchers {
            if let Some(caps) = m.account.captures(text) {
                return Ok(HeaderLine::Account(caps["token"].to_string()));
            }
        }
        for m in &self.matchers {
            if let Some(caps) = m.currency.captures(text) {
                return Ok(HeaderLine::Currency(caps["token"].to_string()));
            }
        }
        if self.matchers.iter().any(|m| m.end_of_header.is_match(text)) {
            return Ok(HeaderLine::EndOfHeader);
        }
        Ok(HeaderLine::NoMatch)
    }
}

/// Parse a header date in the `DD.MM.YYYY.` format.
pub fn parse_header_date(value: &str, row: usize) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, HEADER_DATE_FORMAT).map_err(|_| Error::InvalidHeaderDate {
        row,
        value: value.to_string(),
    })
}
