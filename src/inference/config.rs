//! Configuration for type inference

use serde::{Deserialize, Serialize};

use super::error::InferenceError;

/// Configuration for per-column type inference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceConfig {
    /// Maximum number of non-null values sampled per column (0 = all)
    pub sample_size: usize,

    /// Columns whose name contains this text (case-insensitive) skip literal
    /// evaluation and go straight to date detection
    pub date_name_hint: String,

    /// Treat the literal text `None` as a missing value
    pub none_text_is_null: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 0, // All values
            date_name_hint: "date".to_string(),
            none_text_is_null: true,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.date_name_hint.trim().is_empty() {
            return Err(InferenceError::InvalidConfig(
                "date_name_hint must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a column name carries the date hint
    pub fn is_date_named(&self, column: &str) -> bool {
        column
            .to_lowercase()
            .contains(&self.date_name_hint.to_lowercase())
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the sample size (0 = all values)
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    /// Set the column-name hint that marks date columns
    pub fn date_name_hint(mut self, hint: impl Into<String>) -> Self {
        self.config.date_name_hint = hint.into();
        self
    }

    pub fn none_text_is_null(mut self, enabled: bool) -> Self {
        self.config.none_text_is_null = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> InferenceConfig {
        self.config
    }
}
