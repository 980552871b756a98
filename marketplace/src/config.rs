//! Marketplace configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use xskill_types::MarketParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Deployment configuration for the marketplace core.
///
/// Can be loaded from a TOML file via [`MarketConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Unset fields fall back to the
/// XSkill defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Marketplace rules (credit cost, session bounds, score weights).
    #[serde(default)]
    pub params: MarketParams,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl MarketConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            params: MarketParams::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = MarketConfig::from_toml_str("").unwrap();
        assert_eq!(config.params.credit_block_minutes, 30);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_params_override() {
        let config = MarketConfig::from_toml_str(
            r#"
            log_level = "debug"

            [params]
            credit_block_minutes = 15
            min_session_minutes = 15
            max_session_minutes = 240
            pending_confirm_window_secs = 3600
            max_experience_years = 40
            teach_weight_bps = 12000
            learn_weight_bps = 3000
            reliability_weight_bps = 20000
            unrated_session_value_bps = 6000
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.params.credit_block_minutes, 15);
        assert_eq!(config.params.session_cost(45), 3);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = MarketConfig::from_toml_str("log_level = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
