//! Source table acquisition.
//!
//! The three input tables arrive as CSV files with the column names of the
//! payroll export:
//!
//! | Table         | Columns                                        |
//! |---------------|------------------------------------------------|
//! | Payslips      | `employee_code`, `code`, `amount`, `end`       |
//! | PayCodes      | `pay_code`, `ote_treatment`                    |
//! | Disbursements | `employee_code`, `payment_made`, `sgc_amount`  |
//!
//! The field names of the typed models are accepted as aliases, and so is
//! the `ote_treament` spelling found in existing exports. Extra columns are
//! ignored. Any row that cannot be converted fails the load with the file
//! name and 1-based line number.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{DisbursementRecord, PayCodeRule, PayslipLine};

/// Default file names inside a data directory.
pub const DEFAULT_PAYSLIPS_FILE: &str = "payslips.csv";
/// See [`DEFAULT_PAYSLIPS_FILE`].
pub const DEFAULT_PAY_CODES_FILE: &str = "paycodes.csv";
/// See [`DEFAULT_PAYSLIPS_FILE`].
pub const DEFAULT_DISBURSEMENTS_FILE: &str = "disbursements.csv";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// The three logical input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTable {
    /// Payslip earnings lines.
    Payslips,
    /// Pay code classification rules.
    PayCodes,
    /// SG contribution payments.
    Disbursements,
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceTable::Payslips => "Payslips",
            SourceTable::PayCodes => "PayCodes",
            SourceTable::Disbursements => "Disbursements",
        };
        f.write_str(name)
    }
}

/// All rows of the three input tables, already typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTables {
    /// Payslip earnings lines.
    pub payslips: Vec<PayslipLine>,
    /// Pay code classification rules.
    pub pay_codes: Vec<PayCodeRule>,
    /// SG contribution payments.
    pub disbursements: Vec<DisbursementRecord>,
}

impl SourceTables {
    /// Fails with `EmptySource` for the first table that has no rows.
    pub fn ensure_non_empty(&self) -> EngineResult<()> {
        let empty = if self.payslips.is_empty() {
            Some(SourceTable::Payslips)
        } else if self.pay_codes.is_empty() {
            Some(SourceTable::PayCodes)
        } else if self.disbursements.is_empty() {
            Some(SourceTable::Disbursements)
        } else {
            None
        };

        match empty {
            Some(table) => Err(EngineError::EmptySource {
                table: table.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Where to find each source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    /// Payslips CSV.
    pub payslips: PathBuf,
    /// Pay codes CSV.
    pub pay_codes: PathBuf,
    /// Disbursements CSV.
    pub disbursements: PathBuf,
}

impl SourcePaths {
    /// Uses the default file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            payslips: dir.join(DEFAULT_PAYSLIPS_FILE),
            pay_codes: dir.join(DEFAULT_PAY_CODES_FILE),
            disbursements: dir.join(DEFAULT_DISBURSEMENTS_FILE),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PayslipRow {
    employee_code: String,
    #[serde(alias = "pay_code")]
    code: String,
    amount: String,
    #[serde(alias = "period_end_date")]
    end: String,
}

#[derive(Debug, Deserialize)]
struct PayCodeRow {
    #[serde(alias = "code")]
    pay_code: String,
    #[serde(default, alias = "ote_treament")]
    ote_treatment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DisbursementRow {
    employee_code: String,
    #[serde(alias = "payment_made_date")]
    payment_made: String,
    sgc_amount: String,
}

/// Reads all three tables and checks none is empty.
///
/// # Example
///
/// ```no_run
/// use sg_reconciliation::sources::{SourcePaths, load_tables};
///
/// let tables = load_tables(&SourcePaths::in_dir("./data"))?;
/// println!("{} payslip lines", tables.payslips.len());
/// # Ok::<(), sg_reconciliation::error::EngineError>(())
/// ```
pub fn load_tables(paths: &SourcePaths) -> EngineResult<SourceTables> {
    let tables = SourceTables {
        payslips: read_payslips(open(&paths.payslips)?, &paths.payslips.display().to_string())?,
        pay_codes: read_pay_codes(
            open(&paths.pay_codes)?,
            &paths.pay_codes.display().to_string(),
        )?,
        disbursements: read_disbursements(
            open(&paths.disbursements)?,
            &paths.disbursements.display().to_string(),
        )?,
    };
    tables.ensure_non_empty()?;

    info!(
        payslip_lines = tables.payslips.len(),
        pay_code_rules = tables.pay_codes.len(),
        disbursement_records = tables.disbursements.len(),
        "Loaded source tables"
    );

    Ok(tables)
}

fn open(path: &Path) -> EngineResult<File> {
    File::open(path).map_err(|_| EngineError::SourceNotFound {
        path: path.display().to_string(),
    })
}

/// Reads payslip lines from CSV. `source` names the input in errors.
pub fn read_payslips<R: Read>(reader: R, source: &str) -> EngineResult<Vec<PayslipLine>> {
    read_rows(reader, source, |row: PayslipRow, line| {
        Ok(PayslipLine {
            amount: parse_amount(&row.amount, source, line)?,
            period_end_date: parse_date(&row.end, source, line)?,
            employee_code: row.employee_code,
            pay_code: row.code,
        })
    })
}

/// Reads pay code rules from CSV. `source` names the input in errors.
pub fn read_pay_codes<R: Read>(reader: R, source: &str) -> EngineResult<Vec<PayCodeRule>> {
    read_rows(reader, source, |row: PayCodeRow, _| {
        Ok(PayCodeRule {
            code: row.pay_code,
            ote_treatment: row.ote_treatment,
        })
    })
}

/// Reads disbursement records from CSV. `source` names the input in errors.
pub fn read_disbursements<R: Read>(
    reader: R,
    source: &str,
) -> EngineResult<Vec<DisbursementRecord>> {
    read_rows(reader, source, |row: DisbursementRow, line| {
        Ok(DisbursementRecord {
            payment_made_date: parse_date(&row.payment_made, source, line)?,
            sgc_amount: parse_amount(&row.sgc_amount, source, line)?,
            employee_code: row.employee_code,
        })
    })
}

fn read_rows<Row, T, F>(reader: impl Read, source: &str, convert: F) -> EngineResult<Vec<T>>
where
    Row: serde::de::DeserializeOwned,
    F: Fn(Row, usize) -> EngineResult<T>,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<Row>().enumerate() {
        let line = idx + 2; // header is line 1
        let row = result.map_err(|e| EngineError::SourceFormat {
            path: source.to_string(),
            line: e.position().map_or(line, |p| p.line() as usize),
            message: e.to_string(),
        })?;
        rows.push(convert(row, line)?);
    }
    Ok(rows)
}

fn format_error(source: &str, line: usize, message: String) -> EngineError {
    EngineError::SourceFormat {
        path: source.to_string(),
        line,
        message,
    }
}

fn parse_amount(raw: &str, source: &str, line: usize) -> EngineResult<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| format_error(source, line, format!("invalid amount '{}'", raw)))
}

/// Parses a date cell; a time component, if present, is discarded.
///
/// # Example
///
/// ```
/// use sg_reconciliation::sources::parse_date_cell;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2023, 10, 31);
/// assert_eq!(parse_date_cell("2023-10-31"), expected);
/// assert_eq!(parse_date_cell("2023-10-31 00:00:00"), expected);
/// assert_eq!(parse_date_cell("31/10/2023"), expected);
/// assert_eq!(parse_date_cell("31 Oct"), None);
/// ```
pub fn parse_date_cell(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|datetime| datetime.date())
        })
}

fn parse_date(raw: &str, source: &str, line: usize) -> EngineResult<NaiveDate> {
    parse_date_cell(raw).ok_or_else(|| format_error(source, line, format!("invalid date '{}'", raw)))
}
