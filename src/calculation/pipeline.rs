//! The reconciliation pipeline.
//!
//! Stages run strictly in sequence, each consuming the complete output of the
//! one before. A fatal error in any stage aborts the run; no partial result
//! is returned.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::config::ReconciliationConfig;
use crate::error::EngineResult;
use crate::models::{AuditStep, AuditTrace, AuditWarning, ReconciliationResult};
use crate::sources::SourceTables;

use super::disbursement_aggregator::aggregate_disbursements;
use super::liability_aggregator::{aggregate_ote, to_liability};
use super::ote_classifier::classify;
use super::quarter_resolver::QuarterResolver;
use super::variance_calculator::{combine, summarize, unreconciled};

/// The version stamped on every result.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs reconciliations under one validated configuration.
///
/// # Example
///
/// ```
/// use sg_reconciliation::calculation::ReconciliationEngine;
/// use sg_reconciliation::config::ReconciliationConfig;
/// use sg_reconciliation::models::{DisbursementRecord, PayCodeRule, PayslipLine};
/// use sg_reconciliation::sources::SourceTables;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let engine = ReconciliationEngine::new(ReconciliationConfig::default()).unwrap();
/// let tables = SourceTables {
///     payslips: vec![PayslipLine {
///         employee_code: "E1".to_string(),
///         pay_code: "ORD".to_string(),
///         amount: Decimal::new(1000, 0),
///         period_end_date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
///     }],
///     pay_codes: vec![PayCodeRule {
///         code: "ORD".to_string(),
///         ote_treatment: Some("OTE".to_string()),
///     }],
///     disbursements: vec![DisbursementRecord {
///         employee_code: "E1".to_string(),
///         payment_made_date: NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
///         sgc_amount: Decimal::new(90, 0),
///     }],
/// };
///
/// let result = engine.reconcile(&tables).unwrap();
/// assert_eq!(result.records[0].variance, Decimal::new(5, 0));
/// ```
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: ReconciliationConfig,
    resolver: QuarterResolver,
}

impl ReconciliationEngine {
    /// Validates the configuration and builds the engine.
    pub fn new(config: ReconciliationConfig) -> EngineResult<Self> {
        config.validate_rules()?;
        let resolver = QuarterResolver::new(&config.quarters)?;
        Ok(Self { config, resolver })
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Returns the quarter resolver built from the configuration.
    pub fn resolver(&self) -> &QuarterResolver {
        &self.resolver
    }

    /// Reconciles SG liability against disbursements for the given tables.
    ///
    /// # Errors
    ///
    /// Fails on conflicting pay code rules, unresolvable payment dates and
    /// arithmetic overflow. Unmatched pay codes are not errors; they are
    /// returned in [`ReconciliationResult::unmatched_lines`].
    pub fn reconcile(&self, tables: &SourceTables) -> EngineResult<ReconciliationResult> {
        let start_time = Instant::now();
        let reconciliation_id = Uuid::new_v4();
        let sg_rate = self.config.sg_rate;
        let mut trace = TraceBuilder::default();

        info!(
            reconciliation_id = %reconciliation_id,
            payslip_lines = tables.payslips.len(),
            pay_code_rules = tables.pay_codes.len(),
            disbursement_records = tables.disbursements.len(),
            "Starting reconciliation"
        );

        let outcome = classify(&tables.payslips, &tables.pay_codes, &self.config.ote_marker)?;
        trace.record(
            "ote_classification",
            "OTE Classification",
            serde_json::json!({
                "payslip_lines": tables.payslips.len(),
                "pay_code_rules": tables.pay_codes.len(),
                "ote_marker": self.config.ote_marker,
            }),
            serde_json::json!({
                "ote_lines": outcome.ote_lines.len(),
                "excluded_lines": outcome.excluded.len(),
                "unmatched_lines": outcome.unmatched.len(),
            }),
            format!(
                "Joined {} payslip lines on normalized pay code: {} OTE, {} other treatment, {} unmatched",
                tables.payslips.len(),
                outcome.ote_lines.len(),
                outcome.excluded.len(),
                outcome.unmatched.len()
            ),
        );

        let ote_totals = aggregate_ote(&outcome.ote_lines)?;
        trace.record(
            "ote_aggregation",
            "OTE Aggregation",
            serde_json::json!({ "ote_lines": outcome.ote_lines.len() }),
            serde_json::json!({ "groups": ote_totals.len() }),
            format!(
                "Grouped OTE lines into {} employee/quarter totals by period-end calendar quarter",
                ote_totals.len()
            ),
        );

        let liability = to_liability(&ote_totals, sg_rate)?;
        let total_liability = sum_of(liability.iter().map(|l| l.total_super_payable), "liability")?;
        trace.record(
            "sg_liability",
            "SG Liability",
            serde_json::json!({
                "groups": ote_totals.len(),
                "sg_rate": sg_rate.normalize().to_string(),
            }),
            serde_json::json!({ "total_super_payable": total_liability.normalize().to_string() }),
            format!(
                "Applied SG rate {} to each OTE total: ${} payable",
                sg_rate.normalize(),
                total_liability.normalize()
            ),
        );

        let disbursed = aggregate_disbursements(&tables.disbursements, &self.resolver)?;
        let total_paid = sum_of(disbursed.iter().map(|d| d.total_disbursed), "disbursement")?;
        trace.record(
            "disbursement_aggregation",
            "Disbursement Aggregation",
            serde_json::json!({ "disbursement_records": tables.disbursements.len() }),
            serde_json::json!({
                "groups": disbursed.len(),
                "total_disbursed": total_paid.normalize().to_string(),
            }),
            format!(
                "Resolved payment dates to quarter windows and summed {} records into {} groups",
                tables.disbursements.len(),
                disbursed.len()
            ),
        );

        let records = combine(&liability, &disbursed)?;
        let unreconciled_disbursements = unreconciled(&liability, &disbursed);
        let totals = summarize(&records)?;
        trace.record(
            "variance",
            "Variance Calculation",
            serde_json::json!({
                "liability_groups": liability.len(),
                "disbursement_groups": disbursed.len(),
            }),
            serde_json::json!({
                "records": records.len(),
                "unreconciled_groups": unreconciled_disbursements.len(),
                "total_variance": totals.total_variance.normalize().to_string(),
            }),
            format!(
                "Left-joined {} liability groups onto disbursements; {} disbursement groups had no liability",
                liability.len(),
                unreconciled_disbursements.len()
            ),
        );

        let mut warnings: Vec<AuditWarning> = outcome
            .unmatched
            .iter()
            .map(|unmatched| AuditWarning {
                code: "UNMATCHED_PAY_CODE".to_string(),
                message: format!(
                    "Line for employee '{}' with pay code '{}' ({} on {}) has no OTE treatment",
                    unmatched.line.employee_code,
                    unmatched.line.pay_code,
                    unmatched.line.amount,
                    unmatched.line.period_end_date
                ),
                severity: "medium".to_string(),
            })
            .collect();
        warnings.extend(unreconciled_disbursements.iter().map(|group| AuditWarning {
            code: "UNRECONCILED_DISBURSEMENT".to_string(),
            message: format!(
                "Employee '{}' was paid {} in {} with no OTE liability",
                group.employee_code, group.total_disbursed, group.fiscal_quarter
            ),
            severity: "low".to_string(),
        }));

        let duration_us = start_time.elapsed().as_micros() as u64;
        info!(
            reconciliation_id = %reconciliation_id,
            records = records.len(),
            unmatched_lines = outcome.unmatched.len(),
            unreconciled_groups = unreconciled_disbursements.len(),
            total_variance = %totals.total_variance,
            duration_us,
            "Reconciliation completed"
        );

        Ok(ReconciliationResult {
            reconciliation_id,
            timestamp: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            sg_rate,
            records,
            unmatched_lines: outcome.unmatched,
            excluded_line_count: outcome.excluded.len(),
            unreconciled_disbursements,
            totals,
            audit_trace: AuditTrace {
                steps: trace.steps,
                warnings,
                duration_us,
            },
        })
    }
}

fn sum_of(amounts: impl Iterator<Item = Decimal>, stage: &str) -> EngineResult<Decimal> {
    let mut total = Decimal::ZERO;
    for amount in amounts {
        total = total.checked_add(amount).ok_or_else(|| {
            crate::error::EngineError::computation(stage, "stage total overflowed")
        })?;
    }
    Ok(total)
}

#[derive(Default)]
struct TraceBuilder {
    steps: Vec<AuditStep>,
}

impl TraceBuilder {
    fn record(
        &mut self,
        stage_id: &str,
        stage_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        self.steps.push(AuditStep {
            step_number: self.steps.len() as u32 + 1,
            stage_id: stage_id.to_string(),
            stage_name: stage_name.to_string(),
            input,
            output,
            reasoning,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MonthDay, QuarterWindow};
    use crate::error::EngineError;
    use crate::models::{
        DisbursementRecord, PayCodeRule, PayslipLine, UnmatchedReason, VarianceStatus,
    };
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn payslip(employee: &str, code: &str, amount: &str, end: &str) -> PayslipLine {
        PayslipLine {
            employee_code: employee.to_string(),
            pay_code: code.to_string(),
            amount: dec(amount),
            period_end_date: date(end),
        }
    }

    fn rule(code: &str, treatment: Option<&str>) -> PayCodeRule {
        PayCodeRule {
            code: code.to_string(),
            ote_treatment: treatment.map(str::to_string),
        }
    }

    fn disbursement(employee: &str, paid: &str, amount: &str) -> DisbursementRecord {
        DisbursementRecord {
            employee_code: employee.to_string(),
            payment_made_date: date(paid),
            sgc_amount: dec(amount),
        }
    }

    fn engine() -> ReconciliationEngine {
        ReconciliationEngine::new(ReconciliationConfig::default()).unwrap()
    }

    #[test]
    fn test_single_employee_underpaid() {
        let tables = SourceTables {
            payslips: vec![payslip("E1", "ORD", "1000", "2024-02-15")],
            pay_codes: vec![rule("ORD", Some("OTE"))],
            disbursements: vec![disbursement("E1", "2024-04-28", "90")],
        };

        let result = engine().reconcile(&tables).unwrap();
        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.employee_code, "E1");
        assert_eq!(record.fiscal_quarter.to_string(), "2024Q1");
        assert_eq!(record.total_ote, dec("1000"));
        assert_eq!(record.total_super_payable, dec("95.00"));
        assert_eq!(record.total_disbursed, dec("90"));
        assert_eq!(record.variance, dec("5.00"));
        assert_eq!(record.status(), VarianceStatus::Underpaid);
        assert!(result.is_clean());
    }

    #[test]
    fn test_payment_after_window_closes_is_unreconciled() {
        // 1 May falls in the Q2 payment window, so it cannot settle Q1 earnings
        let tables = SourceTables {
            payslips: vec![payslip("E1", "ORD", "1000", "2024-02-15")],
            pay_codes: vec![rule("ORD", Some("OTE"))],
            disbursements: vec![disbursement("E1", "2024-05-01", "90")],
        };

        let result = engine().reconcile(&tables).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].total_disbursed, Decimal::ZERO);
        assert_eq!(result.records[0].variance, dec("95"));

        assert_eq!(result.unreconciled_disbursements.len(), 1);
        assert_eq!(
            result.unreconciled_disbursements[0].fiscal_quarter.to_string(),
            "2024Q2"
        );
        assert_eq!(result.totals.total_disbursed, Decimal::ZERO);
    }

    #[test]
    fn test_unmatched_lines_are_reported_and_excluded_from_totals() {
        let tables = SourceTables {
            payslips: vec![
                payslip("E1", "ORD", "1000", "2024-02-15"),
                payslip("E1", "MYSTERY", "5000", "2024-02-15"),
                payslip("E1", "allow", "300", "2024-02-15"),
                payslip("E1", "OT", "700", "2024-02-15"),
            ],
            pay_codes: vec![
                rule("ORD", Some("OTE")),
                rule("ALLOW", None),
                rule("OT", Some("NOT OTE")),
            ],
            disbursements: vec![disbursement("E1", "2024-04-01", "95")],
        };

        let result = engine().reconcile(&tables).unwrap();
        assert_eq!(result.records[0].total_ote, dec("1000"));
        assert_eq!(result.records[0].status(), VarianceStatus::Balanced);
        assert_eq!(result.excluded_line_count, 1);

        assert_eq!(result.unmatched_lines.len(), 2);
        assert_eq!(result.unmatched_lines[0].reason, UnmatchedReason::NoMatchingRule);
        assert_eq!(result.unmatched_lines[1].reason, UnmatchedReason::MissingTreatment);

        let warning_codes: Vec<&str> = result
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(warning_codes, vec!["UNMATCHED_PAY_CODE", "UNMATCHED_PAY_CODE"]);
    }

    #[test]
    fn test_audit_trace_has_one_step_per_stage() {
        let tables = SourceTables {
            payslips: vec![payslip("E1", "ORD", "1000", "2024-02-15")],
            pay_codes: vec![rule("ORD", Some("OTE"))],
            disbursements: vec![disbursement("E1", "2024-04-28", "90")],
        };
        let result = engine().reconcile(&tables).unwrap();

        let stages: Vec<&str> = result
            .audit_trace
            .steps
            .iter()
            .map(|s| s.stage_id.as_str())
            .collect();
        assert_eq!(
            stages,
            vec![
                "ote_classification",
                "ote_aggregation",
                "sg_liability",
                "disbursement_aggregation",
                "variance"
            ]
        );
        let numbers: Vec<u32> = result.audit_trace.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(result.audit_trace.steps[2].input["sg_rate"], "0.095");
        assert_eq!(result.audit_trace.steps[2].output["total_super_payable"], "95");
    }

    #[test]
    fn test_multiple_employees_and_quarters() {
        let tables = SourceTables {
            payslips: vec![
                payslip("E1", "ORD", "1000", "2024-03-31"),
                payslip("E1", "ORD", "2000", "2024-04-01"),
                payslip("E2", "ORD", "500", "2023-12-31"),
            ],
            pay_codes: vec![rule("ORD", Some("OTE"))],
            disbursements: vec![
                disbursement("E1", "2024-04-28", "95"),
                disbursement("E1", "2024-07-28", "200"),
                disbursement("E2", "2024-01-28", "47.50"),
            ],
        };

        let result = engine().reconcile(&tables).unwrap();
        let summary: Vec<String> = result
            .records
            .iter()
            .map(|r| format!("{}:{}:{}", r.employee_code, r.fiscal_quarter, r.variance.normalize()))
            .collect();
        assert_eq!(summary, vec!["E1:2024Q1:0", "E1:2024Q2:-10", "E2:2023Q4:0"]);
        assert!(result.unreconciled_disbursements.is_empty());
        assert_eq!(result.totals.total_variance, dec("-10"));
    }

    #[test]
    fn test_conflicting_rules_abort_the_run() {
        let tables = SourceTables {
            payslips: vec![payslip("E1", "ORD", "1000", "2024-02-15")],
            pay_codes: vec![rule("ORD", Some("OTE")), rule("ord", Some("NOT OTE"))],
            disbursements: vec![disbursement("E1", "2024-04-28", "90")],
        };
        assert!(matches!(
            engine().reconcile(&tables),
            Err(EngineError::ConflictingPayCodeRule { .. })
        ));
    }

    #[test]
    fn test_custom_rate_from_config() {
        let config = ReconciliationConfig {
            sg_rate: dec("0.115"),
            ..ReconciliationConfig::default()
        };
        let engine = ReconciliationEngine::new(config).unwrap();
        let tables = SourceTables {
            payslips: vec![payslip("E1", "ORD", "1000", "2024-02-15")],
            pay_codes: vec![rule("ORD", Some("OTE"))],
            disbursements: vec![disbursement("E1", "2024-04-28", "115")],
        };
        let result = engine.reconcile(&tables).unwrap();
        assert_eq!(result.sg_rate, dec("0.115"));
        assert_eq!(result.records[0].variance, Decimal::ZERO);
    }

    #[test]
    fn test_engine_rejects_invalid_quarter_table() {
        let mut config = ReconciliationConfig::default();
        config.quarters[0].end = MonthDay::new(4, 20);
        assert!(matches!(
            ReconciliationEngine::new(config),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_engine_rejects_rate_above_one() {
        let config = ReconciliationConfig {
            sg_rate: dec("9.5"),
            ..ReconciliationConfig::default()
        };
        assert!(matches!(
            ReconciliationEngine::new(config),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_engine_exposes_its_windows() {
        let windows: Vec<QuarterWindow> = engine().resolver().windows().to_vec();
        assert_eq!(windows.len(), 4);
        assert_eq!(engine().config().ote_marker, "OTE");
    }
}
