//! Load a bank-export CSV into typed transactions.
//!
//! Expected header (case-insensitive, surrounding whitespace ignored, any
//! column order, extra columns ignored):
//!   date,description,amount[,category]
//!
//! A file with no header row at all is an empty export, not an error.

use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tally_core::{FileFormatError, RowErrorKind, RowParseError, TallyError, Transaction};
use tracing::{debug, warn};

use crate::parsers::{parse_amount, parse_date};
use crate::types::{LoadOptions, LoadReport, RowPolicy};

const DATE: &str = "date";
const DESCRIPTION: &str = "description";
const AMOUNT: &str = "amount";
const CATEGORY: &str = "category";

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, FileFormatError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| FileFormatError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: require(DATE)?,
            description: require(DESCRIPTION)?,
            amount: require(AMOUNT)?,
            category: find(CATEGORY),
        })
    }
}

fn csv_error(err: csv::Error) -> FileFormatError {
    let line = err.position().map(|p| p.line());
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => FileFormatError::Io(io),
        _ => FileFormatError::Csv { line, message },
    }
}

fn parse_row(
    record: &StringRecord,
    cols: &Columns,
    line: u64,
    options: &LoadOptions,
) -> Result<Transaction, RowParseError> {
    let field = |idx: usize, name: &str| {
        record
            .get(idx)
            .ok_or_else(|| RowParseError::new(line, RowErrorKind::MissingField(name.to_string())))
    };

    let date_raw = field(cols.date, DATE)?;
    let date = parse_date(date_raw, options.date_formats.as_slice())
        .ok_or_else(|| RowParseError::new(line, RowErrorKind::InvalidDate(date_raw.to_string())))?;

    let description = field(cols.description, DESCRIPTION)?.trim();
    if description.is_empty() {
        return Err(RowParseError::new(line, RowErrorKind::EmptyDescription));
    }

    let amount_raw = field(cols.amount, AMOUNT)?;
    let amount = parse_amount(amount_raw).ok_or_else(|| {
        RowParseError::new(line, RowErrorKind::InvalidAmount(amount_raw.to_string()))
    })?;

    let mut txn = Transaction::new(date, description, amount).with_line(line);
    if let Some(raw) = cols
        .category
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        txn = txn.with_raw_category(raw);
    }
    Ok(txn)
}

/// Load transactions from any reader.
///
/// Fails with [`FileFormatError`] when the header lacks a required column or
/// the stream cannot be read. Row-level failures follow `options.policy`.
pub fn load_transactions<R: Read>(reader: R, options: &LoadOptions) -> Result<LoadReport, TallyError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        debug!("transaction file is empty");
        return Ok(LoadReport::default());
    }
    let cols = Columns::locate(&headers)?;

    let mut report = LoadReport::default();
    let mut raw = ByteRecord::new();
    loop {
        match rdr.read_byte_record(&mut raw) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => return Err(csv_error(err).into()),
        }
        let line = raw.position().map(|p| p.line()).unwrap_or_default();

        // Decode per row so one mis-encoded description only costs that row.
        let parsed = StringRecord::from_byte_record(raw.clone())
            .map_err(|_| RowParseError::new(line, RowErrorKind::InvalidEncoding))
            .and_then(|record| parse_row(&record, &cols, line, options));

        match parsed {
            Ok(txn) => report.transactions.push(txn),
            Err(err) => match options.policy {
                RowPolicy::Skip => {
                    warn!(line = err.line, error = %err.kind, "skipping malformed row");
                    report.skipped.push(err);
                }
                RowPolicy::Abort => return Err(err.into()),
            },
        }
    }

    debug!(
        parsed = report.parsed_count(),
        skipped = report.skipped_count(),
        "loaded transactions"
    );
    Ok(report)
}

pub fn load_transactions_str(text: &str, options: &LoadOptions) -> Result<LoadReport, TallyError> {
    load_transactions(text.as_bytes(), options)
}

pub fn load_transactions_path(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<LoadReport, TallyError> {
    let file = File::open(path.as_ref()).map_err(FileFormatError::Io)?;
    load_transactions(file, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn load(text: &str) -> LoadReport {
        load_transactions_str(text, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_loads_basic_rows() {
        let report = load(
            "date,description,amount\n\
             2024-01-05,Coffee Shop,-4.50\n\
             2024-01-10,Paycheck,2000.00\n",
        );
        assert_eq!(report.parsed_count(), 2);
        assert_eq!(report.skipped_count(), 0);
        let first = &report.transactions[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(first.description, "Coffee Shop");
        assert_eq!(first.amount, dec!(-4.50));
        assert_eq!(first.raw_category, None);
        assert_eq!(first.line, 2);
    }

    #[test]
    fn test_header_is_case_insensitive_and_reorderable() {
        let report = load(
            " Amount , Date ,Description,Category\n\
             -12.00,01/15/2024,Grocer,Food\n",
        );
        assert_eq!(report.parsed_count(), 1);
        let t = &report.transactions[0];
        assert_eq!(t.amount, dec!(-12.00));
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(t.raw_category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let err = load_transactions_str("date,amount\n2024-01-05,-4.50\n", &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TallyError::FileFormat(FileFormatError::MissingColumn(ref c)) if c == "description"
        ));
    }

    #[test]
    fn test_malformed_date_is_skipped_and_counted() {
        let report = load(
            "date,description,amount\n\
             2024-13-40,Bad Date,-1.00\n\
             2024-01-05,Coffee Shop,-4.50\n",
        );
        assert_eq!(report.parsed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].line, 2);
        assert_eq!(
            report.skipped[0].kind,
            RowErrorKind::InvalidDate("2024-13-40".to_string())
        );
    }

    #[test]
    fn test_row_problems_are_classified() {
        let report = load(
            "date,description,amount\n\
             2024-01-05,Lunch,twelve\n\
             2024-01-06,,-3.00\n\
             2024-01-07,Short row\n\
             2024-01-08,Fine,1.00\n",
        );
        assert_eq!(report.parsed_count(), 1);
        let kinds: Vec<_> = report.skipped.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                RowErrorKind::InvalidAmount("twelve".to_string()),
                RowErrorKind::EmptyDescription,
                RowErrorKind::MissingField("amount".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_utf8_row_is_skipped() {
        let bytes: &[u8] = b"date,description,amount\n\
            2024-01-05,Coffee Shop,-4.50\n\
            2024-01-06,CAF\xC9,-3.00\n\
            2024-01-10,Paycheck,2000.00\n";
        let report = load_transactions(bytes, &LoadOptions::default()).unwrap();
        assert_eq!(report.parsed_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].line, 3);
        assert_eq!(report.skipped[0].kind, RowErrorKind::InvalidEncoding);
    }

    #[test]
    fn test_oversized_amounts_are_skipped() {
        let report = load(
            "date,description,amount\n\
             2024-01-05,Huge,79228162514264337593543950335\n\
             2024-01-06,Small,1\n",
        );
        assert_eq!(report.parsed_count(), 1);
        assert_eq!(
            report.skipped[0].kind,
            RowErrorKind::InvalidAmount("79228162514264337593543950335".to_string())
        );
    }

    #[test]
    fn test_bad_header_encoding_is_readable_format_error() {
        let bytes: &[u8] = b"date,descr\xFFiption,amount\n2024-01-05,Coffee,-4.50\n";
        let err = load_transactions(bytes, &LoadOptions::default()).unwrap_err();
        match err {
            TallyError::FileFormat(FileFormatError::Csv { message, .. }) => {
                assert!(message.contains("UTF-8"), "message: {message}");
                assert!(!message.contains("Utf8 {"), "message: {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_strict_policy_aborts() {
        let err = load_transactions_str(
            "date,description,amount\n2024-13-40,Bad,-1\n2024-01-01,Ok,1\n",
            &LoadOptions::default().strict(),
        )
        .unwrap_err();
        assert!(matches!(err, TallyError::Row(ref e) if e.line == 2));
    }

    #[test]
    fn test_empty_input_is_empty_report() {
        assert_eq!(load(""), LoadReport::default());
        let header_only = load("date,description,amount\n");
        assert_eq!(header_only.parsed_count(), 0);
        assert_eq!(header_only.skipped_count(), 0);
    }

    #[test]
    fn test_blank_category_is_none() {
        let report = load("date,description,amount,category\n2024-01-05,Coffee,-4.50,  \n");
        assert_eq!(report.transactions[0].raw_category, None);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Date,Description,Amount\n07/20/2025,H-E-B,-5.82\n")
            .unwrap();
        let report = load_transactions_path(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(report.parsed_count(), 1);
        assert_eq!(report.transactions[0].amount, dec!(-5.82));
    }

    #[test]
    fn test_missing_path_is_io_error() {
        let err = load_transactions_path("/definitely/not/here.csv", &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, TallyError::FileFormat(FileFormatError::Io(_))));
    }
}
