//! CSV serializer.
//!
//! One line per transaction, with the statement's decoded fields.

use crate::error::Result;
use crate::types::{Statement, TransactionRecord};
use csv::Writer;
use serde::Serialize;
use std::io::Write;

/// Represents a CSV statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvStatement {
    /// The underlying statement data.
    pub statement: Statement,
}

/// CSV transaction record structure.
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Reference")]
    reference: &'a str,
    #[serde(rename = "Memo")]
    memo: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Type")]
    transaction_type: String,
    #[serde(rename = "Balance")]
    balance: String,
    #[serde(rename = "Currency")]
    currency: &'a str,
    #[serde(rename = "Id")]
    id: &'a str,
}

impl<'a> From<&'a TransactionRecord> for CsvRecord<'a> {
    fn from(tx: &'a TransactionRecord) -> Self {
        CsvRecord {
            date: tx.date.format("%Y-%m-%d").to_string(),
            reference: &tx.reference_number,
            memo: &tx.memo,
            amount: tx.amount.to_string(),
            transaction_type: tx.transaction_type.to_string(),
            balance: tx.balance.to_string(),
            currency: &tx.currency_code,
            id: &tx.id,
        }
    }
}

impl CsvStatement {
    /// Write a CSV statement to any destination implementing `Write`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use zaba_statement::csv_format::CsvStatement;
    /// use zaba_statement::types::{Statement, StatementHeader};
    ///
    /// let statement = Statement::new("ZABAHR2X".into(), StatementHeader::default());
    /// let csv = CsvStatement { statement };
    /// let mut file = File::create("output.csv")?;
    /// csv.write_to(&mut file)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut csv_writer = Writer::from_writer(writer);

        if self.statement.transactions.is_empty() {
            csv_writer.write_record([
                "Date", "Reference", "Memo", "Amount", "Type", "Balance", "Currency", "Id",
            ])?;
        }

        for transaction in &self.statement.transactions {
            csv_writer.serialize(CsvRecord::from(transaction))?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
