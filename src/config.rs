//! # Engine configuration
//!
//! Optional, layered configuration: an `sqlcsv.toml` in the database
//! directory, overlaid with `SQLCSV_*` environment variables, falling back
//! to built-in defaults. Every CLI invocation works with zero configuration
//! — this only tunes ambient behavior, never query semantics.

use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub csv: CsvConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// CSV dialect options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Field delimiter. The spec fixes this at `,`; exposed for
    /// completeness, not because query semantics depend on it.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

/// Logging options, consumed by the CLI binary when installing the
/// `tracing-subscriber` filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `RUST_LOG`-style filter when the environment variable itself
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_delimiter() -> char {
    ','
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig {
            delimiter: default_delimiter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Load configuration for a database directory: `<db>/sqlcsv.toml`
    /// layered under `SQLCSV_*` environment variables, falling back to
    /// defaults when neither is present.
    pub fn load(db_dir: &Path) -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(
            EngineConfig::default(),
        ))
        .merge(Toml::file(db_dir.join("sqlcsv.toml")))
        .merge(Env::prefixed("SQLCSV_").split("__"))
        .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_no_file_present() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(dir.path()).unwrap();
        assert_eq!(config.csv.delimiter, ',');
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sqlcsv.toml"), "[logging]\nlevel = \"debug\"\n").unwrap();
        let config = EngineConfig::load(dir.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
    }
}
