//! Common types shared by the parser and the output formats.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic field of a statement body row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    ReferenceNumber,
    Memo,
    DebitAmount,
    CreditAmount,
    Balance,
    CurrencyCode,
}

impl Field {
    /// Field name as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::ReferenceNumber => "reference number",
            Field::Memo => "memo",
            Field::DebitAmount => "debit amount",
            Field::CreditAmount => "credit amount",
            Field::Balance => "balance",
            Field::CurrencyCode => "currency",
        }
    }
}

/// Column layout every body row must satisfy, in processing order.
pub const FIELD_MAP: [(Field, usize); 7] = [
    (Field::Date, 0),
    (Field::ReferenceNumber, 1),
    (Field::Memo, 2),
    (Field::DebitAmount, 3),
    (Field::CreditAmount, 4),
    (Field::Balance, 5),
    (Field::CurrencyCode, 6),
];

/// Account metadata collected from the header block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementHeader {
    /// Account number (IBAN for current exports).
    pub account_id: Option<String>,

    /// Account currency code (e.g., EUR, HRK).
    pub currency_code: Option<String>,

    /// First day of the statement period.
    pub period_start: Option<NaiveDate>,

    /// Last day of the statement period.
    pub period_end: Option<NaiveDate>,
}

/// Direction of a transaction, derived from which amount column was filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Debit,
    Credit,
    #[default]
    None,
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBIT" => Ok(TransactionType::Debit),
            "CREDIT" => Ok(TransactionType::Credit),
            "NONE" | "" => Ok(TransactionType::None),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl TransactionType {
    /// Convert to OFX `TRNTYPE` code.
    pub fn to_ofx_code(&self) -> &'static str {
        match self {
            TransactionType::Debit => "DEBIT",
            TransactionType::Credit => "CREDIT",
            TransactionType::None => "OTHER",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionType::Debit => "DEBIT",
            TransactionType::Credit => "CREDIT",
            TransactionType::None => "NONE",
        };
        f.write_str(s)
    }
}

/// One statement body row, fully decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Booking date of the transaction.
    pub date: NaiveDateTime,

    /// Bank reference number.
    pub reference_number: String,

    /// Transaction description.
    pub memo: String,

    /// Signed amount: debit minus credit.
    pub amount: Decimal,

    /// Which amount column was filled.
    pub transaction_type: TransactionType,

    /// Running balance after the transaction.
    pub balance: Decimal,

    /// Currency code of the row.
    pub currency_code: String,

    /// Account number followed by the reference number.
    pub id: String,
}

/// A parsed account statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Bank identifier (BIC).
    pub bank_id: String,

    /// Header metadata.
    pub header: StatementHeader,

    /// Transactions in row order.
    pub transactions: Vec<TransactionRecord>,

    /// Non-fatal problems met while scanning the header.
    pub warnings: Vec<String>,
}

impl Statement {
    /// Create an empty statement for the given bank and header.
    pub fn new(bank_id: String, header: StatementHeader) -> Self {
        Self {
            bank_id,
            header,
            transactions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Running balance reported on the last transaction row.
    pub fn closing_balance(&self) -> Option<Decimal> {
        self.transactions.last().map(|tx| tx.balance)
    }

    /// Statement currency: the header value, or the first row's currency.
    pub fn currency(&self) -> Option<&str> {
        self.header
            .currency_code
            .as_deref()
            .or_else(|| self.transactions.first().map(|tx| tx.currency_code.as_str()))
    }
}
