//! Rendering of reconciliation results.
//!
//! Amounts are kept unrounded in [`ReconciliationResult`]; rounding to two
//! decimal places happens here, at display time only.

use std::fmt::Write;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};
use crate::models::ReconciliationResult;

const HEADERS: [&str; 6] = [
    "Employee",
    "Quarter",
    "Total OTE",
    "Super Payable",
    "Disbursed",
    "Variance",
];

/// Formats an amount with exactly two decimal places.
///
/// # Example
///
/// ```
/// use sg_reconciliation::report::display_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(display_amount(Decimal::new(1172775, 5)), "11.73");
/// assert_eq!(display_amount(Decimal::new(95, 0)), "95.00");
/// assert_eq!(display_amount(Decimal::new(-5, 0)), "-5.00");
/// ```
pub fn display_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Renders the result as a plain-text report.
///
/// The variance table comes first, followed by a totals row and then the
/// unmatched lines and unreconciled disbursements as separate sections.
pub fn render_table(result: &ReconciliationResult) -> String {
    let rows: Vec<[String; 6]> = result
        .records
        .iter()
        .map(|record| {
            [
                record.employee_code.clone(),
                record.fiscal_quarter.to_string(),
                display_amount(record.total_ote),
                display_amount(record.total_super_payable),
                display_amount(record.total_disbursed),
                display_amount(record.variance),
            ]
        })
        .collect();
    let totals = [
        "TOTAL".to_string(),
        String::new(),
        display_amount(result.totals.total_ote),
        display_amount(result.totals.total_super_payable),
        display_amount(result.totals.total_disbursed),
        display_amount(result.totals.total_variance),
    ];

    let mut widths = HEADERS.map(str::len);
    for row in rows.iter().chain(std::iter::once(&totals)) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "SG reconciliation {} (rate {})",
        result.reconciliation_id,
        result.sg_rate.normalize()
    );
    let _ = writeln!(out);

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    push_row(&mut out, &rule, &widths);
    push_row(&mut out, &totals, &widths);

    if !result.unmatched_lines.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Unmatched pay codes ({} lines, excluded from OTE):",
            result.unmatched_lines.len()
        );
        for unmatched in &result.unmatched_lines {
            let _ = writeln!(
                out,
                "  {} {} {} {} ({:?})",
                unmatched.line.employee_code,
                unmatched.normalized_code,
                display_amount(unmatched.line.amount),
                unmatched.line.period_end_date,
                unmatched.reason
            );
        }
    }

    if !result.unreconciled_disbursements.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Unreconciled disbursements ({} groups with no OTE liability):",
            result.unreconciled_disbursements.len()
        );
        for group in &result.unreconciled_disbursements {
            let _ = writeln!(
                out,
                "  {} {} {}",
                group.employee_code,
                group.fiscal_quarter,
                display_amount(group.total_disbursed)
            );
        }
    }

    out
}

// First two columns are text and left-aligned; amounts are right-aligned.
fn push_row(out: &mut String, cells: &[String], widths: &[usize; 6]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (cell, width))| {
            if idx < 2 {
                format!("{:<width$}", cell, width = *width)
            } else {
                format!("{:>width$}", cell, width = *width)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// Renders the full result, audit trace included, as pretty JSON.
pub fn render_json(result: &ReconciliationResult) -> EngineResult<String> {
    serde_json::to_string_pretty(result)
        .map_err(|e| EngineError::computation("report", e.to_string()))
}
