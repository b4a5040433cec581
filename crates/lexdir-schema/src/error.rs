//! # Error Types
//!
//! Load-time and link-time failures of the schema registry. Every variant
//! names the offending file or `$id` so the CLI can print a diagnostic
//! without further context.
//!
//! Constraint violations found in a document are *not* errors: they are
//! returned as data in [`crate::ValidationResult`].

use thiserror::Error;

/// Errors returned while loading, registering, or compiling schemas, and
/// while loading documents to validate.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The file is not valid JSON, not an object, or has no string `$id`.
    #[error("malformed schema {path}: {reason}")]
    MalformedSchema {
        /// Path of the schema file.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two schema files declare the same `$id`.
    #[error("duplicate schema $id {id}: declared by {first} and {second}")]
    DuplicateId {
        /// The contested identifier.
        id: String,
        /// File that registered the identifier first.
        first: String,
        /// File that tried to register it again.
        second: String,
    },

    /// No schema is registered under the requested `$id` or file name.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// A `$ref` (possibly several hops away) points at an unregistered `$id`.
    #[error("unresolved $ref in {schema_id}: {reference} is not registered")]
    UnresolvedReference {
        /// The schema containing the dangling reference.
        schema_id: String,
        /// The absolute target the reference resolved to.
        reference: String,
    },

    /// The validation engine rejected the schema.
    #[error("failed to compile schema {schema_id}: {reason}")]
    Compile {
        /// The schema `$id`.
        schema_id: String,
        /// Engine diagnostic.
        reason: String,
    },

    /// A document to validate could not be read or parsed.
    #[error("failed to load document {path}: {reason}")]
    DocumentLoad {
        /// Path to the document.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// I/O error reading a schema file or directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
