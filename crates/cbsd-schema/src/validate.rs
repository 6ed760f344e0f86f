//! # Schema Validation
//!
//! Runtime validation of JSON/YAML documents against the CbsdData schema
//! (draft-04) and any sub-schemas loaded alongside it.
//!
//! ## Schema Resolution
//!
//! CbsdData refers to its sub-schemas with `file:` URIs such as
//! `file:GrantRecord.schema.json`. Those are resolved by file name against
//! the loaded schemas, i.e. relative to the schema directory. A reference
//! with no loaded target is handled according to [`UnresolvedRefPolicy`].
//! No reference ever triggers a network request.
//!
//! ## Violations
//!
//! Documents that fail validation are rejected with every violation the
//! validator reports, each carrying the instance path, the schema path, the
//! message and a [`ViolationKind`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use cbsd_core::{CbsdData, CbsdError};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;
use thiserror::Error;

use crate::config::{UnresolvedRefPolicy, ValidatorConfig};
use crate::embedded::{
    cbsd_data_schema, external_references, reference_file_name, CBSD_DATA_SCHEMA_NAME,
};

/// Meta-schemas are bundled with `jsonschema`; anything under this host is
/// never treated as an unresolved sub-schema.
const METASCHEMA_HOST: &str = "json-schema.org/";

/// Local retriever that resolves `$ref` URIs by file name against the
/// loaded schemas.
struct LocalSchemaRetriever {
    /// Map from schema file name to schema value.
    schemas_by_name: HashMap<String, Value>,
    unresolved_refs: UnresolvedRefPolicy,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let name = reference_file_name(uri_str);

        if let Some(value) = self.schemas_by_name.get(name) {
            tracing::debug!(uri = uri_str, schema = name, "resolved schema reference");
            return Ok(value.clone());
        }

        if uri_str.contains(METASCHEMA_HOST) {
            return Ok(serde_json::json!({}));
        }

        match self.unresolved_refs {
            UnresolvedRefPolicy::Permissive => {
                tracing::warn!(
                    uri = uri_str,
                    "unresolved schema reference; substituting permissive schema"
                );
                Ok(serde_json::json!({}))
            }
            UnresolvedRefPolicy::Strict => {
                Err(format!("unresolved schema reference '{uri_str}'").into())
            }
        }
    }
}

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (invalid schema or a
    /// strictly unresolved reference).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// The configuration file could not be loaded.
    #[error("config error for '{path}': {reason}")]
    ConfigError {
        /// Path to the configuration file.
        path: String,
        /// Reason the configuration could not be loaded.
        reason: String,
    },

    /// A schema-valid document could not be turned into a typed record.
    #[error("record error: {0}")]
    Record(#[from] CbsdError),

    /// IO error reading schema or document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classification of a single violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required property is absent.
    MissingField {
        /// Name of the missing property.
        field: String,
    },
    /// A string does not match a `pattern`.
    PatternMismatch {
        /// The pattern the string failed.
        pattern: String,
    },
    /// A value has the wrong JSON type.
    TypeMismatch,
    /// Any other keyword failure.
    Other,
}

impl ViolationKind {
    fn from_error_kind(kind: &ValidationErrorKind) -> Self {
        match kind {
            ValidationErrorKind::Required { property } => Self::MissingField {
                field: property
                    .as_str()
                    .map(str::to_owned)
                    .unwrap_or_else(|| property.to_string()),
            },
            ValidationErrorKind::Pattern { pattern } => Self::PatternMismatch {
                pattern: pattern.clone(),
            },
            ValidationErrorKind::Type { .. } => Self::TypeMismatch,
            _ => Self::Other,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
    /// What kind of constraint was violated.
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations, in the order the validator
/// reported them.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Names of all missing required properties.
    pub fn missing_fields(&self) -> Vec<&str> {
        self.violations
            .iter()
            .filter_map(|v| match &v.kind {
                ViolationKind::MissingField { field } => Some(field.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A schema compiled once and reusable for any number of documents.
pub struct CompiledSchema {
    schema_name: String,
    validator: Validator,
}

impl CompiledSchema {
    /// Name of the schema this validator was compiled from.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Validate a parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` with every violation
    /// if the document is invalid.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        let errors: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                kind: ViolationKind::from_error_kind(&e.kind),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_name: self.schema_name.clone(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }

    /// Validate a candidate CbsdData document and convert it to a typed record.
    pub fn parse_cbsd_data(&self, instance: &Value) -> Result<CbsdData, SchemaValidationError> {
        self.validate(instance)?;
        Ok(CbsdData::from_value(instance.clone())?)
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("schema_name", &self.schema_name)
            .finish_non_exhaustive()
    }
}

/// A schema validator backed by the `jsonschema` crate.
///
/// Always holds the embedded CbsdData schema. When configured with a schema
/// directory it also loads every `*.schema.json` found there so that the
/// CbsdData references can resolve; a `CbsdData.schema.json` in that
/// directory is ignored in favour of the embedded copy.
///
/// `SchemaValidator` is `Send + Sync`. Schema loading happens once at
/// construction. The `validate_*` convenience methods compile a fresh
/// validator per call; callers checking many documents should
/// [`compile`](Self::compile) once and reuse the [`CompiledSchema`].
#[derive(Debug)]
pub struct SchemaValidator {
    /// Directory the sub-schemas were loaded from, if any.
    schema_dir: Option<PathBuf>,
    /// Map from schema filename (e.g. "GrantRecord.schema.json") to parsed JSON value.
    schemas: HashMap<String, Value>,
    unresolved_refs: UnresolvedRefPolicy,
    /// Number of validators compiled so far.
    compilations: AtomicUsize,
}

impl SchemaValidator {
    /// A validator holding only the embedded CbsdData schema, with
    /// permissive handling of its unresolved references.
    pub fn embedded() -> Self {
        let mut schemas = HashMap::new();
        schemas.insert(
            CBSD_DATA_SCHEMA_NAME.to_string(),
            cbsd_data_schema().clone(),
        );
        Self {
            schema_dir: None,
            schemas,
            unresolved_refs: UnresolvedRefPolicy::Permissive,
            compilations: AtomicUsize::new(0),
        }
    }

    /// Create a validator from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the schema
    /// directory cannot be read or a schema file is not valid JSON.
    pub fn new(config: &ValidatorConfig) -> Result<Self, SchemaValidationError> {
        let mut validator = Self::embedded();
        validator.unresolved_refs = config.unresolved_refs;

        if let Some(dir) = &config.schema_dir {
            validator.load_dir(dir)?;
            validator.schema_dir = Some(dir.clone());
        }

        Ok(validator)
    }

    fn load_dir(&mut self, schema_dir: &Path) -> Result<(), SchemaValidationError> {
        let entries = std::fs::read_dir(schema_dir).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_dir.display().to_string(),
                reason: format!("cannot read schema directory: {e}"),
            }
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".schema.json") {
                continue;
            }
            if name == CBSD_DATA_SCHEMA_NAME {
                tracing::debug!(path = %path.display(), "keeping embedded CbsdData schema");
                continue;
            }

            let content = std::fs::read_to_string(&path)?;
            let value: Value = serde_json::from_str(&content).map_err(|e| {
                SchemaValidationError::SchemaLoadError {
                    schema_name: name.to_string(),
                    reason: format!("invalid JSON: {e}"),
                }
            })?;
            tracing::debug!(schema = name, "loaded schema");
            self.schemas.insert(name.to_string(), value);
        }

        Ok(())
    }

    /// Returns the schema directory path, if one was configured.
    pub fn schema_dir(&self) -> Option<&Path> {
        self.schema_dir.as_deref()
    }

    /// Returns the unresolved-reference policy.
    pub fn unresolved_ref_policy(&self) -> UnresolvedRefPolicy {
        self.unresolved_refs
    }

    /// Returns the number of loaded schemas, the embedded one included.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Number of validators compiled by this instance.
    pub fn compilation_count(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Look up a loaded schema by filename.
    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// References in loaded schemas whose target schema is not loaded,
    /// sorted and deduplicated. Internal `#...` references are skipped.
    pub fn unresolved_references(&self) -> Vec<String> {
        let mut unresolved = BTreeSet::new();
        for schema in self.schemas.values() {
            for reference in external_references(schema) {
                if reference.starts_with('#') {
                    continue;
                }
                if !self.schemas.contains_key(reference_file_name(reference)) {
                    unresolved.insert(reference.to_string());
                }
            }
        }
        unresolved.into_iter().collect()
    }

    /// Build `ValidationOptions` for draft-04 with a local retriever over
    /// all loaded schemas.
    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft4);

        let retriever = LocalSchemaRetriever {
            schemas_by_name: self.schemas.clone(),
            unresolved_refs: self.unresolved_refs,
        };
        opts.with_retriever(retriever);

        opts
    }

    /// Build a compiled `Validator` for a specific schema by filename.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the schema is not loaded.
    /// Returns `SchemaValidationError::ValidatorBuildError` if the validator cannot
    /// be compiled, including when a reference is unresolved under
    /// [`UnresolvedRefPolicy::Strict`].
    pub fn build_validator(&self, schema_name: &str) -> Result<Validator, SchemaValidationError> {
        let schema_value = self.schemas.get(schema_name).ok_or_else(|| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_name.to_string(),
                reason: match &self.schema_dir {
                    Some(dir) => format!("schema not found in {}", dir.display()),
                    None => "schema not loaded".to_string(),
                },
            }
        })?;

        if self.unresolved_refs == UnresolvedRefPolicy::Strict {
            let missing: Vec<String> = external_references(schema_value)
                .into_iter()
                .filter(|r| !r.starts_with('#'))
                .filter(|r| !self.schemas.contains_key(reference_file_name(r)))
                .map(str::to_owned)
                .collect();
            if !missing.is_empty() {
                return Err(SchemaValidationError::ValidatorBuildError {
                    schema_name: schema_name.to_string(),
                    reason: format!("unresolved schema references: {}", missing.join(", ")),
                });
            }
        }

        self.compilations.fetch_add(1, Ordering::Relaxed);
        let opts = self.build_options();
        opts.build(schema_value).map_err(|e| {
            SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Compile a named schema into a reusable [`CompiledSchema`].
    ///
    /// # Errors
    ///
    /// Same as [`build_validator`](Self::build_validator).
    pub fn compile(&self, schema_name: &str) -> Result<CompiledSchema, SchemaValidationError> {
        Ok(CompiledSchema {
            schema_name: schema_name.to_string(),
            validator: self.build_validator(schema_name)?,
        })
    }

    /// Compile the CbsdData schema.
    pub fn compile_cbsd_data(&self) -> Result<CompiledSchema, SchemaValidationError> {
        self.compile(CBSD_DATA_SCHEMA_NAME)
    }

    /// Validate a parsed JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` with structured
    /// violation details if the document is invalid.
    pub fn validate_document(
        &self,
        instance: &Value,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        self.compile(schema_name)?.validate(instance)
    }

    /// Validate a candidate CbsdData document.
    pub fn validate_cbsd_data(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        self.validate_document(instance, CBSD_DATA_SCHEMA_NAME)
    }

    /// Validate a candidate CbsdData document and convert it to a typed record.
    pub fn parse_cbsd_data(&self, instance: &Value) -> Result<CbsdData, SchemaValidationError> {
        self.compile_cbsd_data()?.parse_cbsd_data(instance)
    }

    /// Validate a YAML or JSON document against a schema, loading from a file path.
    ///
    /// The format is chosen by [`load_document`].
    pub fn validate_file(
        &self,
        document_path: &Path,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let instance = load_document(document_path)?;
        self.validate_document(&instance, schema_name)
            .map_err(|e| match e {
                SchemaValidationError::ValidationFailed { violations, .. } => {
                    SchemaValidationError::ValidationFailed {
                        schema_name: format!("{schema_name} ({})", document_path.display()),
                        violations,
                    }
                }
                other => other,
            })
    }
}

/// Read a JSON or YAML document into a JSON value.
///
/// `.yaml`/`.yml` files are parsed as YAML, everything else as JSON.
pub fn load_document(path: &Path) -> Result<Value, SchemaValidationError> {
    let load_error = |reason: String| SchemaValidationError::DocumentLoadError {
        path: path.display().to_string(),
        reason,
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| load_error(format!("cannot read file: {e}")))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => {
            serde_yaml::from_str(&content).map_err(|e| load_error(format!("invalid YAML: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}
