//! OTE classification of payslip lines.
//!
//! Payslip lines are left-joined onto the pay code table on the normalized
//! code (trimmed, upper case). Lines whose treatment cannot be resolved are
//! returned as unmatched and logged at warn level; they never reach OTE totals.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    ClassifiedLine, PayCodeRule, PayslipLine, UnmatchedLine, UnmatchedReason, normalize_pay_code,
};

/// Pay code rules indexed by normalized code.
#[derive(Debug, Clone, Default)]
pub struct PayCodeIndex {
    treatments: HashMap<String, Option<String>>,
}

impl PayCodeIndex {
    /// Builds the index.
    ///
    /// Rules that normalize to the same code collapse into one when their
    /// treatments agree.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConflictingPayCodeRule`] when two rules share a
    /// normalized code but carry different treatments.
    pub fn build(rules: &[PayCodeRule]) -> EngineResult<Self> {
        let mut treatments: HashMap<String, Option<String>> = HashMap::with_capacity(rules.len());

        for rule in rules {
            let code = normalize_pay_code(&rule.code);
            let treatment = rule.treatment().map(str::to_string);

            match treatments.get(&code) {
                Some(existing) if *existing != treatment => {
                    return Err(EngineError::ConflictingPayCodeRule {
                        code,
                        first: existing.clone(),
                        second: treatment,
                    });
                }
                Some(_) => debug!(code = %code, "Duplicate pay code rule collapsed"),
                None => {
                    treatments.insert(code, treatment);
                }
            }
        }

        Ok(Self { treatments })
    }

    /// Looks up a normalized code.
    ///
    /// Returns `None` when no rule exists, `Some(None)` when the rule has no
    /// treatment.
    pub fn lookup(&self, normalized_code: &str) -> Option<Option<&str>> {
        self.treatments
            .get(normalized_code)
            .map(|treatment| treatment.as_deref())
    }

    /// Number of distinct normalized codes.
    pub fn len(&self) -> usize {
        self.treatments.len()
    }

    /// Returns true if the index holds no rules.
    pub fn is_empty(&self) -> bool {
        self.treatments.is_empty()
    }
}

/// The three-way split produced by [`classify`].
#[derive(Debug, Clone, Default)]
pub struct ClassificationOutcome {
    /// Lines whose treatment is the OTE marker.
    pub ote_lines: Vec<ClassifiedLine>,
    /// Lines with a treatment other than the OTE marker.
    pub excluded: Vec<ClassifiedLine>,
    /// Lines with no rule or a blank treatment.
    pub unmatched: Vec<UnmatchedLine>,
}

/// Classifies payslip lines against the pay code table.
///
/// Only lines whose matched treatment equals `ote_marker` exactly are kept as OTE.
///
/// # Example
///
/// ```
/// use sg_reconciliation::calculation::classify;
/// use sg_reconciliation::models::{PayCodeRule, PayslipLine};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let lines = vec![PayslipLine {
///     employee_code: "E1".to_string(),
///     pay_code: " ord ".to_string(),
///     amount: Decimal::new(1000, 0),
///     period_end_date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
/// }];
/// let rules = vec![PayCodeRule {
///     code: "ORD".to_string(),
///     ote_treatment: Some("OTE".to_string()),
/// }];
///
/// let outcome = classify(&lines, &rules, "OTE").unwrap();
/// assert_eq!(outcome.ote_lines.len(), 1);
/// assert!(outcome.unmatched.is_empty());
/// ```
pub fn classify(
    lines: &[PayslipLine],
    rules: &[PayCodeRule],
    ote_marker: &str,
) -> EngineResult<ClassificationOutcome> {
    let index = PayCodeIndex::build(rules)?;
    Ok(classify_with_index(lines, &index, ote_marker))
}

/// Classifies payslip lines against a prebuilt index.
pub fn classify_with_index(
    lines: &[PayslipLine],
    index: &PayCodeIndex,
    ote_marker: &str,
) -> ClassificationOutcome {
    let mut outcome = ClassificationOutcome::default();

    for line in lines {
        let normalized_code = normalize_pay_code(&line.pay_code);

        let reason = match index.lookup(&normalized_code) {
            Some(Some(treatment)) => {
                let classified = ClassifiedLine {
                    line: line.clone(),
                    treatment: treatment.to_string(),
                };
                if treatment == ote_marker {
                    outcome.ote_lines.push(classified);
                } else {
                    outcome.excluded.push(classified);
                }
                continue;
            }
            Some(None) => UnmatchedReason::MissingTreatment,
            None => UnmatchedReason::NoMatchingRule,
        };

        warn!(
            employee_code = %line.employee_code,
            pay_code = %line.pay_code,
            amount = %line.amount,
            period_end_date = %line.period_end_date,
            reason = ?reason,
            "Payslip line has no matching OTE treatment"
        );
        outcome.unmatched.push(UnmatchedLine {
            line: line.clone(),
            normalized_code,
            reason,
        });
    }

    outcome
}
