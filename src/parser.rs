//! Row-by-row statement parser.
//!
//! The parser is a two-mode state machine. In header mode each row's first
//! cell is classified by the [`HeaderScanner`] and account metadata is
//! collected. The date column caption switches the parser to body mode,
//! where every row becomes one [`TransactionRecord`].

use crate::cell::{coerce, Cell, DateMode, Value};
use crate::error::{Error, Result};
use crate::header::{HeaderLine, HeaderScanner};
use crate::types::{
    Field, Statement, StatementHeader, TransactionRecord, TransactionType, FIELD_MAP,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, trace, warn};

/// ZABA's BIC, used as the default bank id.
pub const DEFAULT_BANK_ID: &str = "ZABAHR2X";

/// Which block of the sheet the parser is in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Header,
    Body,
}

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Bank identifier stamped on the statement.
    pub bank_id: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            bank_id: DEFAULT_BANK_ID.to_string(),
        }
    }
}

/// State of one parse run.
#[derive(Debug, Default)]
pub struct ParserState {
    pub mode: Mode,
    /// Number of rows consumed so far.
    pub row_index: usize,
    /// Header collected so far. Frozen once the body starts.
    pub header: StatementHeader,
    pub date_mode: DateMode,
    /// Header problems that did not stop the run.
    pub warnings: Vec<Error>,
}

impl ParserState {
    pub fn new(date_mode: DateMode) -> Self {
        Self {
            date_mode,
            ..Self::default()
        }
    }

    /// 1-based sheet row number of the row being processed.
    fn row_number(&self) -> usize {
        self.row_index + 1
    }
}

/// Statement parser for ZABA spreadsheet exports.
pub struct StatementParser {
    scanner: HeaderScanner,
    options: ParserOptions,
}

impl StatementParser {
    pub fn new(options: ParserOptions) -> Result<Self> {
        Ok(Self {
            scanner: HeaderScanner::new()?,
            options,
        })
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Process one row.
    ///
    /// Returns `None` for header rows and the finished record for body rows.
    pub fn parse_row(
        &self,
        state: &mut ParserState,
        row: &[Cell],
    ) -> Result<Option<TransactionRecord>> {
        match state.mode {
            Mode::Header => {
                self.scan_header(state, row);
                state.row_index += 1;
                Ok(None)
            }
            Mode::Body => {
                let record = extract_record(state, row)?;
                state.row_index += 1;
                Ok(Some(record))
            }
        }
    }

    /// Lazily parse `rows`, yielding one result per body row.
    ///
    /// Iteration stops after the first error; records yielded before it stay valid.
    pub fn transactions<I, R>(&self, rows: I, date_mode: DateMode) -> Transactions<'_, I::IntoIter>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[Cell]>,
    {
        Transactions {
            parser: self,
            state: ParserState::new(date_mode),
            rows: rows.into_iter(),
            failed: false,
        }
    }

    /// Parse all `rows` into a statement.
    pub fn parse<I, R>(&self, rows: I, date_mode: DateMode) -> Result<Statement>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[Cell]>,
    {
        let mut transactions = self.transactions(rows, date_mode);
        let records = transactions.by_ref().collect::<Result<Vec<_>>>()?;
        let state = transactions.into_state();

        if state.mode == Mode::Header {
            warn!(rows = state.row_index, "no transaction table found");
        }

        let mut statement = Statement::new(self.options.bank_id.clone(), state.header);
        statement.transactions = records;
        statement.warnings = state.warnings.iter().map(ToString::to_string).collect();
        Ok(statement)
    }

    fn scan_header(&self, state: &mut ParserState, row: &[Cell]) {
        let row_number = state.row_number();
        let text = match row.first().map(|cell| coerce(cell, state.date_mode)) {
            Some(Value::Text(text)) => text,
            _ => {
                trace!(row = row_number, "skipping header row without text");
                return;
            }
        };

        match self.scanner.classify(&text, row_number) {
            Ok(HeaderLine::Period { start, end }) => {
                debug!(row = row_number, %start, %end, "statement period");
                state.header.period_start = Some(start);
                state.header.period_end = Some(end);
            }
            Ok(HeaderLine::Account(account)) => {
                debug!(row = row_number, %account, "account number");
                state.header.account_id = Some(account);
            }
            Ok(HeaderLine::Currency(currency)) => {
                debug!(row = row_number, %currency, "account currency");
                state.header.currency_code = Some(currency);
            }
            Ok(HeaderLine::EndOfHeader) => {
                debug!(row = row_number, "end of header");
                state.mode = Mode::Body;
            }
            Ok(HeaderLine::NoMatch) => {
                trace!(row = row_number, text = %text, "skipping header row");
            }
            Err(e) => {
                warn!(row = row_number, error = %e, "ignoring statement period");
                state.warnings.push(e);
            }
        }
    }
}

/// Build a transaction record from one body row.
fn extract_record(state: &ParserState, row: &[Cell]) -> Result<TransactionRecord> {
    let row_number = state.row_number();

    let mut date: Option<NaiveDateTime> = None;
    let mut reference_number = String::new();
    let mut memo = String::new();
    let mut amount = Decimal::ZERO;
    let mut transaction_type = TransactionType::None;
    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;
    let mut balance = Decimal::ZERO;
    let mut currency_code = String::new();

    for (field, column) in FIELD_MAP {
        let cell = row.get(column).ok_or_else(|| Error::MissingColumn {
            row: row_number,
            field: field.name(),
            column,
            width: row.len(),
        })?;
        let value = coerce(cell, state.date_mode);
        let invalid = || Error::InvalidCell {
            row: row_number,
            field: field.name(),
            value: value.to_string(),
        };

        match field {
            Field::Date => date = Some(value.as_datetime().ok_or_else(invalid)?),
            Field::ReferenceNumber => reference_number = value.to_text().ok_or_else(invalid)?,
            Field::Memo => memo = value.to_text().ok_or_else(invalid)?,
            Field::DebitAmount => {
                debit = value.to_decimal().ok_or_else(invalid)?;
                if !debit.is_zero() {
                    amount += debit;
                    transaction_type = TransactionType::Debit;
                }
            }
            Field::CreditAmount => {
                credit = value.to_decimal().ok_or_else(invalid)?;
                if !credit.is_zero() {
                    amount -= credit;
                    transaction_type = TransactionType::Credit;
                }
            }
            Field::Balance => balance = value.to_decimal().ok_or_else(invalid)?,
            Field::CurrencyCode => currency_code = value.to_text().ok_or_else(invalid)?,
        }
    }

    if !debit.is_zero() && !credit.is_zero() {
        return Err(Error::AmbiguousAmount {
            row: row_number,
            debit,
            credit,
        });
    }

    let date = date.ok_or_else(|| Error::MissingField(Field::Date.name().to_string()))?;
    let id = transaction_id(&state.header, &reference_number, row_number)?;

    Ok(TransactionRecord {
        date,
        reference_number,
        memo,
        amount,
        transaction_type,
        balance,
        currency_code,
        id,
    })
}

/// Transaction id: account number immediately followed by the reference number.
fn transaction_id(header: &StatementHeader, reference_number: &str, row: usize) -> Result<String> {
    let account_id = header
        .account_id
        .as_deref()
        .ok_or(Error::MissingAccountId { row })?;
    Ok(format!("{}{}", account_id, reference_number))
}

/// Iterator over the transactions of a row sequence.
pub struct Transactions<'p, I> {
    parser: &'p StatementParser,
    state: ParserState,
    rows: I,
    failed: bool,
}

impl<I> Transactions<'_, I> {
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn into_state(self) -> ParserState {
        self.state
    }
}

impl<I, R> Iterator for Transactions<'_, I>
where
    I: Iterator<Item = R>,
    R: AsRef<[Cell]>,
{
    type Item = Result<TransactionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        for row in self.rows.by_ref() {
            match self.parser.parse_row(&mut self.state, row.as_ref()) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn datetime(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn text_row(text: &str) -> Vec<Cell> {
        vec![Cell::from(text)]
    }

    fn header_rows() -> Vec<Vec<Cell>> {
        vec![
            text_row("Period from 01.01.2023. to 31.01.2023."),
            text_row("Account: HR1234567890"),
            text_row("Currency: EUR"),
            text_row("Date"),
        ]
    }

    fn body_row(reference: &str, debit: f64, credit: f64) -> Vec<Cell> {
        vec![
            Cell::DateTime(datetime(2023, 1, 5)),
            Cell::from(reference),
            Cell::from(" Groceries "),
            Cell::Number(debit),
            Cell::Number(credit),
            Cell::Number(1000.0),
            Cell::from("EUR"),
        ]
    }

    fn parser() -> StatementParser {
        StatementParser::new(ParserOptions::default()).unwrap()
    }

    fn parse(rows: Vec<Vec<Cell>>) -> Result<Statement> {
        parser().parse(rows, DateMode::Excel1900)
    }

    #[test]
    fn test_debit_row() {
        let mut rows = header_rows();
        rows.push(body_row("REF1", 120.50, 0.0));

        let statement = parse(rows).unwrap();

        assert_eq!(
            statement.header,
            StatementHeader {
                account_id: Some("HR1234567890".into()),
                currency_code: Some("EUR".into()),
                period_start: NaiveDate::from_ymd_opt(2023, 1, 1),
                period_end: NaiveDate::from_ymd_opt(2023, 1, 31),
            }
        );
        assert_eq!(statement.bank_id, "ZABAHR2X");
        assert_eq!(
            statement.transactions,
            vec![TransactionRecord {
                date: datetime(2023, 1, 5),
                reference_number: "REF1".into(),
                memo: "Groceries".into(),
                amount: dec("120.50"),
                transaction_type: TransactionType::Debit,
                balance: dec("1000.00"),
                currency_code: "EUR".into(),
                id: "HR1234567890REF1".into(),
            }]
        );
    }

    #[test]
    fn test_credit_row() {
        let mut rows = header_rows();
        rows.push(body_row("REF2", 0.0, 50.0));

        let statement = parse(rows).unwrap();
        let tx = &statement.transactions[0];
        assert_eq!(tx.amount, dec("-50.00"));
        assert_eq!(tx.transaction_type, TransactionType::Credit);
    }

    #[test]
    fn test_zero_amounts_leave_type_unset() {
        let mut rows = header_rows();
        rows.push(body_row("REF3", 0.0, 0.0));

        let tx = &parse(rows).unwrap().transactions[0];
        assert_eq!(tx.amount, Decimal::ZERO);
        assert_eq!(tx.transaction_type, TransactionType::None);
    }

    #[test]
    fn test_empty_amount_cells_count_as_zero() {
        let mut rows = header_rows();
        let mut row = body_row("REF4", 0.0, 0.0);
        row[3] = Cell::Empty;
        row[4] = Cell::from("75.25");
        rows.push(row);

        let tx = &parse(rows).unwrap().transactions[0];
        assert_eq!(tx.amount, dec("-75.25"));
        assert_eq!(tx.transaction_type, TransactionType::Credit);
    }

    #[test]
    fn test_both_amounts_set_is_rejected() {
        let mut rows = header_rows();
        rows.push(body_row("REF5", 10.0, 4.0));

        match parse(rows).unwrap_err() {
            Error::AmbiguousAmount { row, debit, credit } => {
                assert_eq!(row, 5);
                assert_eq!(debit, dec("10"));
                assert_eq!(credit, dec("4"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_account_id() {
        let rows = vec![
            text_row("Currency: EUR"),
            text_row("Date"),
            body_row("REF1", 120.50, 0.0),
        ];

        match parse(rows).unwrap_err() {
            Error::MissingAccountId { row } => assert_eq!(row, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_is_structural_error() {
        let mut rows = header_rows();
        let mut row = body_row("REF1", 120.50, 0.0);
        row.truncate(6);
        rows.push(row);

        let err = parse(rows).unwrap_err();
        match &err {
            Error::MissingColumn {
                row,
                field,
                column,
                width,
            } => {
                assert_eq!(*row, 5);
                assert_eq!(*field, "currency");
                assert_eq!(*column, 6);
                assert_eq!(*width, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("row 5"));
    }

    #[test]
    fn test_wrong_cell_kind_is_reported() {
        let mut rows = header_rows();
        let mut row = body_row("REF1", 120.50, 0.0);
        row[0] = Cell::from("05.01.2023");
        rows.push(row);

        assert!(matches!(
            parse(rows).unwrap_err(),
            Error::InvalidCell { row: 5, field: "date", .. }
        ));
    }

    #[test]
    fn test_header_order_and_boilerplate_do_not_matter() {
        let rows = vec![
            text_row("Zagrebačka banka d.d."),
            vec![],
            text_row("Valuta: EUR"),
            vec![Cell::Empty, Cell::from("Account: IGNORED")],
            text_row("Račun: HR1723600001101234565"),
            text_row("Prometi za razdoblje od 01.02.2023. do 28.02.2023."),
            text_row("Datum"),
            body_row("0001", 12.0, 0.0),
        ];

        let statement = parse(rows).unwrap();
        assert_eq!(
            statement.header.account_id.as_deref(),
            Some("HR1723600001101234565")
        );
        assert_eq!(statement.header.currency_code.as_deref(), Some("EUR"));
        assert_eq!(statement.header.period_end, NaiveDate::from_ymd_opt(2023, 2, 28));
        assert_eq!(statement.transactions[0].id, "HR17236000011012345650001");
    }

    #[test]
    fn test_mode_switches_only_at_end_of_header() {
        let parser = parser();
        let mut state = ParserState::new(DateMode::Excel1900);

        for row in header_rows().iter().take(3) {
            assert_eq!(parser.parse_row(&mut state, row).unwrap(), None);
            assert_eq!(state.mode, Mode::Header);
        }
        assert_eq!(parser.parse_row(&mut state, &text_row("Date")).unwrap(), None);
        assert_eq!(state.mode, Mode::Body);
        assert_eq!(state.row_index, 4);

        let record = parser
            .parse_row(&mut state, &body_row("REF1", 1.0, 0.0))
            .unwrap();
        assert!(record.is_some());
        assert_eq!(state.row_index, 5);
    }

    #[test]
    fn test_header_is_frozen_in_body() {
        let mut rows = header_rows();
        rows.push(body_row("Account: OTHER", 1.0, 0.0));

        let statement = parse(rows).unwrap();
        assert_eq!(statement.header.account_id.as_deref(), Some("HR1234567890"));
        assert_eq!(statement.transactions[0].id, "HR1234567890Account: OTHER");
    }

    #[test]
    fn test_bad_period_date_is_not_fatal() {
        let rows = vec![
            text_row("Period from 32.01.2023. to 31.01.2023."),
            text_row("Account: HR1"),
            text_row("Date"),
            body_row("REF1", 1.0, 0.0),
        ];

        let statement = parse(rows).unwrap();
        assert_eq!(statement.header.period_start, None);
        assert_eq!(statement.header.period_end, None);
        assert_eq!(statement.warnings.len(), 1);
        assert!(statement.warnings[0].contains("32.01.2023."));
        assert_eq!(statement.transactions.len(), 1);
    }

    #[test]
    fn test_ids_follow_reference_numbers() {
        let mut rows = header_rows();
        rows.push(body_row("REF1", 1.0, 0.0));
        rows.push(body_row("REF2", 2.0, 0.0));
        rows.push(body_row("REF1", 3.0, 0.0));

        let ids: Vec<_> = parse(rows)
            .unwrap()
            .transactions
            .into_iter()
            .map(|tx| tx.id)
            .collect();
        assert_eq!(ids, vec!["HR1234567890REF1", "HR1234567890REF2", "HR1234567890REF1"]);
    }

    #[test]
    fn test_numeric_reference_numbers() {
        let mut rows = header_rows();
        let mut row = body_row("", 1.0, 0.0);
        row[1] = Cell::Number(20230105.0);
        rows.push(row);

        let tx = &parse(rows).unwrap().transactions[0];
        assert_eq!(tx.reference_number, "20230105");
        assert_eq!(tx.id, "HR123456789020230105");
    }

    #[test]
    fn test_date_serials_use_date_mode() {
        let mut rows = header_rows();
        let mut row = body_row("REF1", 1.0, 0.0);
        row[0] = Cell::Date(43469.0);
        rows.push(row);

        let statement = parser().parse(rows, DateMode::Excel1904).unwrap();
        assert_eq!(statement.transactions[0].date, datetime(2023, 1, 5));
    }

    #[test]
    fn test_records_before_failure_are_kept() {
        let mut rows = header_rows();
        rows.push(body_row("REF1", 1.0, 0.0));
        rows.push(vec![Cell::DateTime(datetime(2023, 1, 6))]);
        rows.push(body_row("REF3", 3.0, 0.0));

        let parser = parser();
        let results: Vec<_> = parser.transactions(rows, DateMode::Excel1900).collect();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().id, "HR1234567890REF1");
        assert!(matches!(
            results[1],
            Err(Error::MissingColumn { row: 6, column: 1, width: 1, .. })
        ));
    }

    #[test]
    fn test_sheet_without_table() {
        let rows = vec![text_row("Account: HR1"), text_row("Currency: EUR")];

        let statement = parse(rows).unwrap();
        assert!(statement.transactions.is_empty());
        assert_eq!(statement.header.account_id.as_deref(), Some("HR1"));
    }

    #[test]
    fn test_custom_bank_id() {
        let parser = StatementParser::new(ParserOptions {
            bank_id: "TESTHR2X".into(),
        })
        .unwrap();
        let statement = parser.parse(header_rows(), DateMode::Excel1900).unwrap();
        assert_eq!(statement.bank_id, "TESTHR2X");
    }
}
