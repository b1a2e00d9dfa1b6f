//! Pay code classification rules.

use serde::{Deserialize, Serialize};

/// Maps a pay code to its OTE treatment.
///
/// A `None` treatment means the pay code is known but unclassified; lines
/// carrying it cannot be counted as OTE and are reported as unmatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayCodeRule {
    /// The pay code as it appears in the classification table.
    pub code: String,
    /// The OTE treatment, e.g. `OTE` or `NOT OTE`.
    #[serde(default)]
    pub ote_treatment: Option<String>,
}

impl PayCodeRule {
    /// Returns the treatment, treating blank strings as absent.
    pub fn treatment(&self) -> Option<&str> {
        self.ote_treatment
            .as_deref()
            .filter(|treatment| !treatment.trim().is_empty())
    }
}

/// Normalizes a pay code for joining: surrounding whitespace removed, upper case.
///
/// # Example
///
/// ```
/// use sg_reconciliation::models::normalize_pay_code;
///
/// assert_eq!(normalize_pay_code(" ote "), "OTE");
/// assert_eq!(normalize_pay_code("Salary"), "SALARY");
/// ```
pub fn normalize_pay_code(code: &str) -> String {
    code.trim().to_uppercase()
}
