//! Application state for the SG Reconciliation API.

use std::sync::Arc;

use crate::calculation::ReconciliationEngine;

/// Shared application state.
///
/// Holds the engine built from the loaded configuration. It is immutable;
/// every request runs its own reconciliation over its own tables.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<ReconciliationEngine>,
}

impl AppState {
    /// Creates a new application state around the given engine.
    pub fn new(engine: ReconciliationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Returns the reconciliation engine.
    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconciliationConfig;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_the_engine() {
        let state = AppState::new(ReconciliationEngine::new(ReconciliationConfig::default()).unwrap());
        let other = state.clone();
        assert!(std::ptr::eq(state.engine(), other.engine()));
    }
}
