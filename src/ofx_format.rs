//! OFX 2.x serializer.
//!
//! Writes a parsed statement as an OFX bank statement response, the format
//! most personal finance tools import.

use crate::error::{Error, Result};
use crate::types::{Statement, TransactionRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::io::Write;

const OFX_HEADER: &str = r#"<?OFX OFXHEADER="200" VERSION="220" SECURITY="NONE" OLDFILEUID="NONE" NEWFILEUID="NONE"?>"#;

/// Represents an OFX statement.
#[derive(Debug, Clone, PartialEq)]
pub struct OfxStatement {
    /// The underlying statement data.
    pub statement: Statement,
}

impl OfxStatement {
    /// Write an OFX statement to any destination implementing `Write`.
    ///
    /// Fails with [`Error::MissingField`] when the statement has no account
    /// number or currency.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use zaba_statement::ofx_format::OfxStatement;
    /// use zaba_statement::types::{Statement, StatementHeader};
    ///
    /// let mut header = StatementHeader::default();
    /// header.account_id = Some("HR1234567890".into());
    /// header.currency_code = Some("EUR".into());
    /// let ofx = OfxStatement { statement: Statement::new("ZABAHR2X".into(), header) };
    /// let mut file = File::create("output.ofx")?;
    /// ofx.write_to(&mut file)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let document = self.to_document(chrono::Utc::now().naive_utc())?;
        let xml = quick_xml::se::to_string(&document)
            .map_err(|e| Error::XmlError(e.to_string()))?;

        writeln!(writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(writer, "{}", OFX_HEADER)?;
        writeln!(writer, "{}", xml)?;

        Ok(())
    }

    fn to_document(&self, server_time: NaiveDateTime) -> Result<OfxDocument> {
        let stmt = &self.statement;

        let account_id = stmt
            .header
            .account_id
            .clone()
            .ok_or_else(|| Error::MissingField("account number".to_string()))?;
        let currency = stmt
            .currency()
            .ok_or_else(|| Error::MissingField("currency".to_string()))?
            .to_string();

        let first = stmt.transactions.iter().map(|tx| tx.date).min();
        let last = stmt.transactions.iter().map(|tx| tx.date).max();
        let dt_start = stmt
            .header
            .period_start
            .map(format_date)
            .or_else(|| first.as_ref().map(format_datetime));
        let dt_end = stmt
            .header
            .period_end
            .map(format_date)
            .or_else(|| last.as_ref().map(format_datetime));

        let ledger_bal = stmt.closing_balance().map(|amount| LedgerBalanceXml {
            bal_amt: amount.to_string(),
            dt_as_of: dt_end.clone().unwrap_or_else(|| format_datetime(&server_time)),
        });

        Ok(OfxDocument {
            signon: SignonXml {
                sonrs: SignonResponseXml {
                    status: StatusXml::ok(),
                    dt_server: format_datetime(&server_time),
                    language: "ENG".to_string(),
                },
            },
            bank: BankMessagesXml {
                stmttrnrs: StatementTransactionResponseXml {
                    trnuid: "0".to_string(),
                    status: StatusXml::ok(),
                    stmtrs: StatementResponseXml {
                        curdef: currency,
                        bank_acct_from: BankAccountXml {
                            bank_id: stmt.bank_id.clone(),
                            acct_id: account_id,
                            acct_type: "CHECKING".to_string(),
                        },
                        bank_tran_list: BankTransactionListXml {
                            dt_start,
                            dt_end,
                            stmttrn: stmt.transactions.iter().map(StatementTransactionXml::from).collect(),
                        },
                        ledger_bal,
                    },
                },
            },
        })
    }
}

impl From<&TransactionRecord> for StatementTransactionXml {
    fn from(tx: &TransactionRecord) -> Self {
        StatementTransactionXml {
            trn_type: tx.transaction_type.to_ofx_code().to_string(),
            dt_posted: format_datetime(&tx.date),
            trn_amt: tx.amount.to_string(),
            fit_id: tx.id.clone(),
            ref_num: (!tx.reference_number.is_empty()).then(|| tx.reference_number.clone()),
            memo: (!tx.memo.is_empty()).then(|| tx.memo.clone()),
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y%m%d%H%M%S").to_string()
}

// XML structure definitions
#[derive(Debug, Serialize)]
#[serde(rename = "OFX")]
struct OfxDocument {
    #[serde(rename = "SIGNONMSGSRSV1")]
    signon: SignonXml,
    #[serde(rename = "BANKMSGSRSV1")]
    bank: BankMessagesXml,
}

#[derive(Debug, Serialize)]
struct SignonXml {
    #[serde(rename = "SONRS")]
    sonrs: SignonResponseXml,
}

#[derive(Debug, Serialize)]
struct SignonResponseXml {
    #[serde(rename = "STATUS")]
    status: StatusXml,
    #[serde(rename = "DTSERVER")]
    dt_server: String,
    #[serde(rename = "LANGUAGE")]
    language: String,
}

#[derive(Debug, Serialize)]
struct StatusXml {
    #[serde(rename = "CODE")]
    code: String,
    #[serde(rename = "SEVERITY")]
    severity: String,
}

impl StatusXml {
    fn ok() -> Self {
        StatusXml {
            code: "0".to_string(),
            severity: "INFO".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BankMessagesXml {
    #[serde(rename = "STMTTRNRS")]
    stmttrnrs: StatementTransactionResponseXml,
}

#[derive(Debug, Serialize)]
struct StatementTransactionResponseXml {
    #[serde(rename = "TRNUID")]
    trnuid: String,
    #[serde(rename = "STATUS")]
    status: StatusXml,
    #[serde(rename = "STMTRS")]
    stmtrs: StatementResponseXml,
}

#[derive(Debug, Serialize)]
struct StatementResponseXml {
    #[serde(rename = "CURDEF")]
    curdef: String,
    #[serde(rename = "BANKACCTFROM")]
    bank_acct_from: BankAccountXml,
    #[serde(rename = "BANKTRANLIST")]
    bank_tran_list: BankTransactionListXml,
    #[serde(rename = "LEDGERBAL", skip_serializing_if = "Option::is_none")]
    ledger_bal: Option<LedgerBalanceXml>,
}

#[derive(Debug, Serialize)]
struct BankAccountXml {
    #[serde(rename = "BANKID")]
    bank_id: String,
    #[serde(rename = "ACCTID")]
    acct_id: String,
    #[serde(rename = "ACCTTYPE")]
    acct_type: String,
}

#[derive(Debug, Serialize)]
struct BankTransactionListXml {
    #[serde(rename = "DTSTART", skip_serializing_if = "Option::is_none")]
    dt_start: Option<String>,
    #[serde(rename = "DTEND", skip_serializing_if = "Option::is_none")]
    dt_end: Option<String>,
    #[serde(rename = "STMTTRN")]
    stmttrn: Vec<StatementTransactionXml>,
}

#[derive(Debug, Serialize)]
#[serde(rename = "STMTTRN")]
struct StatementTransactionXml {
    #[serde(rename = "TRNTYPE")]
    trn_type: String,
    #[serde(rename = "DTPOSTED")]
    dt_posted: String,
    #[serde(rename = "TRNAMT")]
    trn_amt: String,
    #[serde(rename = "FITID")]
    fit_id: String,
    #[serde(rename = "REFNUM", skip_serializing_if = "Option::is_none")]
    ref_num: Option<String>,
    #[serde(rename = "MEMO", skip_serializing_if = "Option::is_none")]
    memo: Option<String>,
}

#[derive(Debug, Serialize)]
struct LedgerBalanceXml {
    #[serde(rename = "BALAMT")]
    bal_amt: String,
    #[serde(rename = "DTASOF")]
    dt_as_of: String,
}
