//! Decompiler options

use crate::types::OutputKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options controlling one decompile run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecompileOptions {
    /// Skip tables that are neither standard nor claimed by an extension
    #[serde(default)]
    pub suppress_custom_tables: bool,

    /// Keep empty tables (as EnsureTable elements) instead of dropping them
    #[serde(default)]
    pub suppress_dropping_empty_tables: bool,

    /// Always emit literal sequence numbers
    #[serde(default)]
    pub suppress_relative_sequencing: bool,

    /// Drop the UI tables before decoding
    #[serde(default)]
    pub suppress_ui: bool,

    /// Decompile a package as though it were a merge module
    #[serde(default)]
    pub treat_product_as_module: bool,

    /// Prefix for computed File/@Source paths
    #[serde(default = "default_base_source_path")]
    pub base_source_path: String,

    #[serde(default)]
    pub output_kind: OutputKind,
}

fn default_base_source_path() -> String {
    "SourceDir".to_string()
}

impl Default for DecompileOptions {
    fn default() -> Self {
        Self {
            suppress_custom_tables: false,
            suppress_dropping_empty_tables: false,
            suppress_relative_sequencing: false,
            suppress_ui: false,
            treat_product_as_module: false,
            base_source_path: default_base_source_path(),
            output_kind: OutputKind::Package,
        }
    }
}

impl DecompileOptions {
    /// Load options from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Sequence tables are written in module form
    pub fn module_sequencing(&self) -> bool {
        self.output_kind == OutputKind::Module || self.treat_product_as_module
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },
}
