//! Key-indexed summation shared by the aggregators.
//!
//! Rows are folded into an ordered map keyed by (employee code, quarter), so
//! output order is deterministic and independent of input order.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::FiscalQuarter;

/// The composite key every aggregate is grouped by.
pub type GroupKey = (String, FiscalQuarter);

/// Running per-key sums for one pipeline stage.
#[derive(Debug)]
pub(crate) struct GroupedSums {
    stage: &'static str,
    sums: BTreeMap<GroupKey, Decimal>,
}

impl GroupedSums {
    pub(crate) fn new(stage: &'static str) -> Self {
        Self {
            stage,
            sums: BTreeMap::new(),
        }
    }

    /// Adds `amount` to the group, failing on decimal overflow.
    pub(crate) fn add(
        &mut self,
        employee_code: &str,
        quarter: FiscalQuarter,
        amount: Decimal,
    ) -> EngineResult<()> {
        let stage = self.stage;
        let total = self
            .sums
            .entry((employee_code.to_string(), quarter))
            .or_insert(Decimal::ZERO);
        *total = total.checked_add(amount).ok_or_else(|| {
            EngineError::computation(
                stage,
                format!(
                    "sum overflowed for employee '{}' in {}",
                    employee_code, quarter
                ),
            )
        })?;
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.sums.len()
    }

    pub(crate) fn into_groups(self) -> impl Iterator<Item = (GroupKey, Decimal)> {
        self.sums.into_iter()
    }
}
