//! Transformer configuration
//!
//! One immutable value per run. It is threaded into every transformation
//! and never mutated, so concurrent class transformations stay independent.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Annotation that marks a class for lifecycle logging
pub const DEFAULT_MARKER_ANNOTATION: &str = "com.github.stephanenicolas.loglifecycle.LogLifeCycle";

/// Configuration for [`crate::transformer::LifecycleTransformer`]
///
/// # Example
/// ```
/// use loglifecycle::config::TransformerConfig;
///
/// let config = TransformerConfig::default();
/// assert!(!config.debug);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformerConfig {
    /// Log full error chains for failures instead of one-line summaries
    ///
    /// Only changes diagnostic output, never which methods get instrumented.
    pub debug: bool,

    /// Fully qualified name of the marker annotation
    pub marker_annotation: String,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            marker_annotation: DEFAULT_MARKER_ANNOTATION.to_string(),
        }
    }
}

impl TransformerConfig {
    /// Default configuration with verbose failure logging
    pub fn debug() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file; missing keys take defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TransformerConfig = toml::from_str(contents).context("Invalid TOML")?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let fqn = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
            .map_err(|e| e.to_string())?;
        if !fqn.is_match(&self.marker_annotation) {
            return Err(format!(
                "marker_annotation must be a fully qualified Java name, got {:?}",
                self.marker_annotation
            ));
        }
        Ok(())
    }
}
