//! # lexdir-schema — Schema Registry & Validator
//!
//! Loads the JSON Schema documents that describe the legal directory data
//! model (addresses, certifications, specializations, law firms, lawyers),
//! links them by `$id`, and validates documents against them.
//!
//! ## Pipeline
//!
//! 1. [`load_schema`] parses one schema file into a [`SchemaDocument`].
//! 2. [`SchemaRegistry::register`] indexes it by `$id`, rejecting duplicates.
//! 3. [`SchemaRegistry::compile`] resolves every reachable `$ref` against the
//!    registry and builds a [`CompiledValidator`].
//! 4. [`validate`] applies it to a document and returns a
//!    [`ValidationResult`] listing *every* violation.
//!
//! ## Crate Policy
//!
//! - Load and link errors are [`SchemaError`]s. Constraint violations are
//!   data, never errors.
//! - The registry is an explicit value; there is no global schema state.
//! - `$ref` targets are only ever served from the registry, never fetched.

pub mod error;
pub mod registry;
pub mod validate;

pub use error::SchemaError;
pub use registry::{
    load_schema, CompiledValidator, SchemaDocument, SchemaRegistry, DEFAULT_DRAFT,
};
pub use validate::{load_document, validate, ValidationResult, Violation, ViolationKind};
