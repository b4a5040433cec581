//! # Document Validation
//!
//! Applies a [`CompiledValidator`] to a JSON document in all-errors mode and
//! reports every violation with the JSON Pointer of the offending value, the
//! schema keyword that failed, and a human-readable message.
//!
//! Validation is a pure function of (schema, document): the same pair always
//! yields the same violations in the same order. Strings are never coerced to
//! numbers or booleans, and `format` keywords are asserted.

use std::fmt;
use std::path::Path;

use jsonschema::error::ValidationErrorKind;
use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;
use crate::registry::CompiledValidator;

/// The class of constraint a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Value has the wrong JSON type.
    Type,
    /// A required property is missing.
    Required,
    /// A `format` assertion (email, date, uri, ...) failed.
    Format,
    /// A string does not match its `pattern`.
    Pattern,
    /// A number is outside its bounds or not a multiple of `multipleOf`.
    Range,
    /// A string, array, or object is too short or too long.
    Length,
    /// A value is not one of the allowed `enum` / `const` values.
    Enum,
    /// A property is present that the schema forbids.
    AdditionalProperties,
    /// An array contains duplicate items.
    UniqueItems,
    /// An `anyOf` / `oneOf` / `not` combination failed.
    Composition,
    /// Anything else the engine reports.
    Other,
}

impl ViolationKind {
    fn from_error_kind(kind: &ValidationErrorKind) -> Self {
        match kind {
            ValidationErrorKind::Type { .. } => Self::Type,
            ValidationErrorKind::Required { .. } => Self::Required,
            ValidationErrorKind::Format { .. } => Self::Format,
            ValidationErrorKind::Pattern { .. } => Self::Pattern,
            ValidationErrorKind::Minimum { .. }
            | ValidationErrorKind::Maximum { .. }
            | ValidationErrorKind::ExclusiveMinimum { .. }
            | ValidationErrorKind::ExclusiveMaximum { .. }
            | ValidationErrorKind::MultipleOf { .. } => Self::Range,
            ValidationErrorKind::MinLength { .. }
            | ValidationErrorKind::MaxLength { .. }
            | ValidationErrorKind::MinItems { .. }
            | ValidationErrorKind::MaxItems { .. }
            | ValidationErrorKind::MinProperties { .. }
            | ValidationErrorKind::MaxProperties { .. } => Self::Length,
            ValidationErrorKind::Enum { .. } | ValidationErrorKind::Constant { .. } => Self::Enum,
            ValidationErrorKind::AdditionalProperties { .. }
            | ValidationErrorKind::UnevaluatedProperties { .. } => Self::AdditionalProperties,
            ValidationErrorKind::UniqueItems { .. } => Self::UniqueItems,
            ValidationErrorKind::AnyOf { .. }
            | ValidationErrorKind::OneOfNotValid { .. }
            | ValidationErrorKind::OneOfMultipleValid { .. }
            | ValidationErrorKind::Not { .. } => Self::Composition,
            _ => Self::Other,
        }
    }

    /// Stable snake_case name, as used in JSON reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Required => "required",
            Self::Format => "format",
            Self::Pattern => "pattern",
            Self::Range => "range",
            Self::Length => "length",
            Self::Enum => "enum",
            Self::AdditionalProperties => "additional_properties",
            Self::UniqueItems => "unique_items",
            Self::Composition => "composition",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer to the offending value in the document; empty for the root.
    pub instance_path: String,
    /// JSON Pointer to the failing keyword in the schema.
    pub schema_path: String,
    /// Constraint class.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// The instance path for display, with the root shown as `(root)`.
    pub fn location(&self) -> &str {
        if self.instance_path.is_empty() {
            "(root)"
        } else {
            &self.instance_path
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location(), self.message)
    }
}

/// Outcome of validating one document.
///
/// `is_valid()` is true exactly when there are no violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    violations: Vec<Violation>,
}

impl ValidationResult {
    /// Build a result; validity is derived from the violation list.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// True if the document satisfied every constraint.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Violations in engine report order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consume the result, returning the violations.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// True if some violation sits at `instance_path` with the given kind.
    pub fn has_violation(&self, instance_path: &str, kind: ViolationKind) -> bool {
        self.violations
            .iter()
            .any(|v| v.instance_path == instance_path && v.kind == kind)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Validate `document` against a compiled schema, collecting all violations.
pub fn validate(validator: &CompiledValidator, document: &Value) -> ValidationResult {
    let violations = validator
        .inner
        .iter_errors(document)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            kind: ViolationKind::from_error_kind(&e.kind),
            message: e.to_string(),
        })
        .collect();
    ValidationResult::from_violations(violations)
}

/// Read a document to validate.
///
/// `.yaml` / `.yml` files are parsed as YAML into the JSON data model;
/// everything else is parsed as JSON.
///
/// # Errors
///
/// Returns [`SchemaError::DocumentLoad`] naming the file and the cause.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let load_error = |reason: String| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| load_error(format!("cannot read file: {e}")))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .map_err(|e| load_error(format!("invalid YAML: {e}"))),
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}
