//! Pipeline configuration types

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};
use crate::flatten::{FlattenConfig, RecordLayout};
use crate::inference::InferenceConfig;

/// Batch assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Catalog table the batch is written to
    pub table_name: String,
    /// Primary key attribute copied into the key section
    pub partition_key: String,
    /// Infer a schema when the catalog has none
    pub auto_schema: bool,
    /// Attribute holding the last-update epoch used for the `date` partition
    pub updated_at_attribute: String,
    /// Value of the optional `event_source` column
    pub event_source: Option<String>,
    /// Drop columns that carry no value in the batch
    pub drop_empty_columns: bool,
    /// Change-record section names
    pub layout: RecordLayout,
    /// Flattening options
    pub flatten: FlattenConfig,
    /// Type inference options for auto-schema mode
    pub inference: InferenceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            partition_key: String::new(),
            auto_schema: false,
            updated_at_attribute: "updatedAt".to_string(),
            event_source: None,
            drop_empty_columns: true,
            layout: RecordLayout::default(),
            flatten: FlattenConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config for a table and its partition key
    pub fn new(table_name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            partition_key: partition_key.into(),
            ..Self::default()
        }
    }

    /// Load a config file; the format follows the extension
    pub fn from_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "toml" => Self::from_toml_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "json" => serde_json::from_str(&content).map_err(PipelineError::config),
            other => Err(PipelineError::Config(format!(
                "Unsupported configuration format: {other}"
            ))),
        }
    }

    pub fn from_toml_str(content: &str) -> PipelineResult<Self> {
        toml::from_str(content).map_err(PipelineError::config)
    }

    pub fn from_yaml_str(content: &str) -> PipelineResult<Self> {
        serde_yaml::from_str(content).map_err(PipelineError::config)
    }

    /// Enable or disable schema inference on catalog misses
    pub fn with_auto_schema(mut self, enabled: bool) -> Self {
        self.auto_schema = enabled;
        self
    }

    /// Set the last-update attribute name
    pub fn with_updated_at_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.updated_at_attribute = attribute.into();
        self
    }

    /// Tag every row with an event source, e.g. `aws:backfill`
    pub fn with_event_source(mut self, source: impl Into<String>) -> Self {
        self.event_source = Some(source.into());
        self
    }

    pub fn with_drop_empty_columns(mut self, enabled: bool) -> Self {
        self.drop_empty_columns = enabled;
        self
    }

    pub fn with_layout(mut self, layout: RecordLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_flatten(mut self, flatten: FlattenConfig) -> Self {
        self.flatten = flatten;
        self
    }

    /// Set the path separator used for flattening and naming
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.flatten.separator = separator.into();
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    /// The separator as a single character
    pub fn separator_char(&self) -> Option<char> {
        let mut chars = self.flatten.separator.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.table_name.trim().is_empty() {
            return Err("Table name is required".to_string());
        }
        if self.partition_key.trim().is_empty() {
            return Err("Partition key is required".to_string());
        }
        if self.separator_char().is_none() {
            return Err(format!(
                "Separator must be a single character, got '{}'",
                self.flatten.separator
            ));
        }
        if self.updated_at_attribute.trim().is_empty() {
            return Err("Updated-at attribute must not be empty".to_string());
        }
        self.inference.validate().map_err(|e| e.to_string())
    }
}
