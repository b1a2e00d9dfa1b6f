//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading reconciliation
//! rules from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{JurisdictionMetadata, QuarterWindow, ReconciliationConfig};

/// The file read from a configuration directory.
pub const CONFIG_FILE_NAME: &str = "reconciliation.yaml";

/// Loads and provides access to reconciliation configuration.
///
/// # Directory Structure
///
/// ```text
/// config/sg/
/// └── reconciliation.yaml   # SG rate, OTE marker, quarter windows
/// ```
///
/// # Example
///
/// ```no_run
/// use sg_reconciliation::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/sg").unwrap();
/// println!("SG rate: {}", loader.sg_rate());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: ReconciliationConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `reconciliation.yaml` is missing
    /// - The file contains invalid YAML or is missing required fields
    /// - The SG rate, OTE marker or quarter table fails validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let config_path = path.as_ref().join(CONFIG_FILE_NAME);
        let config = Self::load_yaml::<ReconciliationConfig>(&config_path)?;
        Self::from_config(config)
    }

    /// Wraps an in-memory configuration after validating it.
    pub fn from_config(config: ReconciliationConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> ReconciliationConfig {
        self.config
    }

    /// Returns the jurisdiction metadata.
    pub fn jurisdiction(&self) -> &JurisdictionMetadata {
        &self.config.jurisdiction
    }

    /// Returns the SG rate.
    pub fn sg_rate(&self) -> Decimal {
        self.config.sg_rate
    }

    /// Returns the treatment value that marks OTE.
    pub fn ote_marker(&self) -> &str {
        &self.config.ote_marker
    }

    /// Returns the configured quarter windows.
    pub fn quarters(&self) -> &[QuarterWindow] {
        &self.config.quarters
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            config: ReconciliationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MonthDay, default_quarter_windows};
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/sg"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sg-reconciliation-config-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.jurisdiction().code, "AU-SG");
        assert_eq!(loader.sg_rate(), dec("0.095"));
        assert_eq!(loader.ote_marker(), "OTE");
    }

    #[test]
    fn test_shipped_configuration_matches_defaults() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.quarters(), default_quarter_windows().as_slice());
        assert_eq!(loader.config(), ConfigLoader::default().config());
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("reconciliation.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_load_malformed_yaml_returns_parse_error() {
        let dir = scratch_dir("malformed");
        fs::write(dir.join(CONFIG_FILE_NAME), "sg_rate: [unclosed").unwrap();

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.contains("reconciliation.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_overlapping_windows() {
        let dir = scratch_dir("overlap");
        let yaml = r#"
jurisdiction:
  code: TEST
  name: Overlapping windows
  source_url: https://example.com
sg_rate: "0.095"
quarters:
  - { quarter: 1, start: { month: 1, day: 1 }, end: { month: 6, day: 30 } }
  - { quarter: 2, start: { month: 6, day: 1 }, end: { month: 12, day: 31 } }
"#;
        fs::write(dir.join(CONFIG_FILE_NAME), yaml).unwrap();

        assert!(matches!(
            ConfigLoader::load(&dir),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_from_config_validates() {
        let mut config = ReconciliationConfig::default();
        config.quarters[1].start = MonthDay::new(2, 30);
        assert!(ConfigLoader::from_config(config).is_err());
    }

    #[test]
    fn test_into_config_returns_owned_config() {
        let config = ConfigLoader::default().into_config();
        assert_eq!(config.quarters.len(), 4);
    }
}
