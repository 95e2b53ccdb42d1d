//! Configuration structures for the reconciliation pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::NfcheckError;

/// Main configuration for nfcheck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NfcheckConfig {
    /// Reconciliation engine configuration.
    pub reconcile: ReconcileConfig,

    /// Input gathering configuration (used by hosts).
    pub input: InputConfig,

    /// Report output configuration (used by hosts).
    pub output: OutputConfig,
}

/// How fields are looked up inside a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    /// Structured parse, text scanning when the document is not well-formed.
    #[default]
    Auto,
    /// Structured parse only; malformed documents are reported as errors.
    Structured,
    /// Text-pattern scanning only.
    TextScan,
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Absolute tolerance under which declared and paid values are equal.
    pub tolerance: Decimal,

    /// Emit a progress event every this many documents.
    pub progress_interval: usize,

    /// Field lookup strategy.
    pub lookup: LookupStrategy,

    /// Reject documents larger than this many bytes.
    pub max_document_bytes: Option<usize>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(9, 3),
            progress_interval: 100,
            lookup: LookupStrategy::Auto,
            max_document_bytes: None,
        }
    }
}

/// Input gathering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Accepted file extensions, compared case-insensitively.
    pub extensions: Vec<String>,

    /// Warn when a batch holds more documents than this.
    pub large_batch_warning: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            large_batch_warning: 20_000,
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl NfcheckConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, NfcheckError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| NfcheckError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), NfcheckError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| NfcheckError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), NfcheckError> {
        if self.reconcile.progress_interval == 0 {
            return Err(NfcheckError::Config(
                "reconcile.progress_interval must be at least 1".to_string(),
            ));
        }
        if self.reconcile.tolerance.is_sign_negative() {
            return Err(NfcheckError::Config(
                "reconcile.tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a file name carries one of the accepted extensions.
    pub fn accepts_extension(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.input
            .extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext.to_lowercase())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NfcheckConfig::default();
        assert_eq!(config.reconcile.tolerance, Decimal::new(9, 3));
        assert_eq!(config.reconcile.progress_interval, 100);
        assert_eq!(config.reconcile.lookup, LookupStrategy::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: NfcheckConfig =
            serde_json::from_str(r#"{"reconcile": {"lookup": "text_scan"}}"#).unwrap();
        assert_eq!(config.reconcile.lookup, LookupStrategy::TextScan);
        assert_eq!(config.reconcile.progress_interval, 100);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = NfcheckConfig::default();
        config.reconcile.progress_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_accepts_extension() {
        let config = NfcheckConfig::default();
        assert!(config.accepts_extension("nota-001.XML"));
        assert!(config.accepts_extension("a.xml"));
        assert!(!config.accepts_extension("a.pdf"));
        assert!(!config.accepts_extension("xml"));
    }
}
