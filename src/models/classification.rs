//! Outcome types of pay code classification.

use serde::{Deserialize, Serialize};

use super::PayslipLine;

/// A payslip line joined to the treatment of its pay code rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    /// The original payslip line.
    pub line: PayslipLine,
    /// The treatment of the matched rule.
    pub treatment: String,
}

/// Why a payslip line has no usable OTE treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// No rule exists for the normalized pay code.
    NoMatchingRule,
    /// A rule exists but its treatment is blank.
    MissingTreatment,
}

/// A payslip line excluded from OTE because its treatment could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedLine {
    /// The original payslip line.
    pub line: PayslipLine,
    /// The code used for the join lookup.
    pub normalized_code: String,
    /// Why the lookup failed.
    pub reason: UnmatchedReason,
}
