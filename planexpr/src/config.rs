//! Environment configuration.
//!
//! ```toml
//! [compatibility]
//! integer_to_real = true
//! integer_to_real_in_equality = false
//! check_bounds = true
//! ```
//!
//! Every key is optional; missing keys take their default value.
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::{error::Result, types::CompatibilityRules};

/// Settings applied when building an [`Environment`](crate::env::Environment).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Type compatibility matrix used by the type manager.
    pub compatibility: CompatibilityRules,
}

impl EnvironmentConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        debug!("Loaded environment configuration: {:?}.", config);
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_the_default() {
        assert_eq!(
            EnvironmentConfig::from_toml_str("").unwrap(),
            EnvironmentConfig::default()
        );
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = EnvironmentConfig::from_toml_str(
            "[compatibility]\ninteger_to_real_in_equality = false\n",
        )
        .unwrap();
        assert!(config.compatibility.integer_to_real);
        assert!(!config.compatibility.integer_to_real_in_equality);
        assert!(config.compatibility.check_bounds);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let err = EnvironmentConfig::from_toml_str("[compatibility]\ncheck_bounds = 3\n").unwrap_err();
        assert!(err.is_config_parse());
        assert!(EnvironmentConfig::from_toml_str("unknown = 1").is_err());
        assert!(
            EnvironmentConfig::load_from_toml(Path::new("/definitely/not/here.toml"))
                .unwrap_err()
                .is_io_error()
        );
    }
}
