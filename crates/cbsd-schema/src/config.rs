//! # Validator Configuration
//!
//! Where sub-schemas live and what to do about references that cannot be
//! resolved. Read from a YAML or JSON file; every field is optional.
//!
//! ```yaml
//! schema_dir: ./schemas
//! unresolved_refs: strict
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::validate::SchemaValidationError;

/// Treatment of a `$ref` whose target schema has not been loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedRefPolicy {
    /// Substitute the empty schema, which accepts any value.
    #[default]
    Permissive,
    /// Refuse to compile a validator for the schema.
    Strict,
}

/// Configuration of a [`SchemaValidator`](crate::SchemaValidator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Directory holding `*.schema.json` files used to resolve references.
    pub schema_dir: Option<PathBuf>,
    /// Treatment of references with no loaded target.
    pub unresolved_refs: UnresolvedRefPolicy,
}

impl ValidatorConfig {
    /// Load a configuration file.
    ///
    /// `.yaml`/`.yml` files are read as YAML, anything else as JSON. A
    /// relative `schema_dir` is taken relative to the configuration file.
    pub fn from_file(path: &Path) -> Result<Self, SchemaValidationError> {
        let config_error = |reason: String| SchemaValidationError::ConfigError {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("cannot read file: {e}")))?;

        let mut config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| config_error(format!("invalid YAML: {e}")))?,
            _ => serde_json::from_str(&content)
                .map_err(|e| config_error(format!("invalid JSON: {e}")))?,
        };

        if let (Some(dir), Some(parent)) = (config.schema_dir.as_ref(), path.parent()) {
            if dir.is_relative() {
                config.schema_dir = Some(parent.join(dir));
            }
        }

        Ok(config)
    }

    /// Set the schema directory.
    pub fn with_schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = Some(dir.into());
        self
    }

    /// Set the unresolved-reference policy.
    pub fn with_unresolved_refs(mut self, policy: UnresolvedRefPolicy) -> Self {
        self.unresolved_refs = policy;
        self
    }
}
