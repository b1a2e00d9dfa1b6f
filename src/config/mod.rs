//! Configuration loading and management for SG reconciliation.
//!
//! This module loads the SG rate, the OTE marker and the disbursement quarter
//! windows from YAML. Built-in defaults match the Australian rules.
//!
//! # Example
//!
//! ```no_run
//! use sg_reconciliation::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/sg").unwrap();
//! println!("Loaded rules: {}", config.jurisdiction().name);
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::{
    DEFAULT_OTE_MARKER, DEFAULT_SG_RATE, JurisdictionMetadata, MonthDay, QuarterWindow,
    ReconciliationConfig, default_quarter_windows,
};
