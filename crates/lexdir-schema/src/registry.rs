//! # Schema Registry
//!
//! Loads JSON Schema documents, indexes them by their declared `$id`, and
//! compiles executable validators on demand.
//!
//! ## Linking
//!
//! Registration never looks at `$ref`. Cross-schema references are resolved
//! when a schema is compiled: the registry walks every `$ref` reachable from
//! the requested schema, resolves each one against the `$id` of the schema
//! it appears in, and fails with [`SchemaError::UnresolvedReference`] if any
//! target is not registered. Files may therefore be registered in any order.
//! A subschema that declares its own `$id` is a target inside its document
//! and never needs registering.
//!
//! Reference cycles (a schema reaching itself through other schemas) are
//! allowed. The link walk keeps a visited set, and the engine evaluates
//! recursive references lazily.
//!
//! ## Drafts
//!
//! A schema's own `$schema` selects its draft. Schemas without one are
//! compiled as [`DEFAULT_DRAFT`] (draft-07).
//!
//! ## Retrieval
//!
//! The engine only ever sees schemas served from memory by
//! [`LocalSchemaRetriever`]. No network request is made for any `$ref`.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::{Draft, Retrieve, Uri};
use serde_json::Value;

use crate::error::SchemaError;
use crate::validate::{validate, ValidationResult};

/// File-name suffix that marks a schema document on disk.
pub const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Draft used for schemas that do not declare `$schema`.
pub const DEFAULT_DRAFT: Draft = Draft::Draft7;

/// Keywords whose values are instance data, never subschemas.
const DATA_KEYWORDS: [&str; 4] = ["enum", "const", "default", "examples"];

/// Keywords whose values map arbitrary names to subschemas. The names are
/// user data and may collide with [`DATA_KEYWORDS`].
const SCHEMA_MAP_KEYWORDS: [&str; 5] = [
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependencies",
];

/// A parsed schema document with its declared identity.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    id: String,
    path: PathBuf,
    body: Value,
}

impl SchemaDocument {
    /// Build a document from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MalformedSchema`] if the value is not an object
    /// or has no non-empty string `$id`.
    pub fn from_value(path: impl Into<PathBuf>, body: Value) -> Result<Self, SchemaError> {
        let path = path.into();
        let malformed = |reason: &str| SchemaError::MalformedSchema {
            path: path.display().to_string(),
            reason: reason.to_string(),
        };

        let object = body
            .as_object()
            .ok_or_else(|| malformed("schema root must be a JSON object"))?;
        let id = match object.get("$id") {
            Some(Value::String(id)) => normalize_id(id),
            Some(_) => return Err(malformed("$id must be a string")),
            None => return Err(malformed("missing $id")),
        };
        if id.is_empty() {
            return Err(malformed("$id must not be empty"));
        }

        Ok(Self { id, path, body })
    }

    /// The declared `$id`, without any trailing empty fragment.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The file this schema was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed schema body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The file name component of [`Self::path`], if it is valid UTF-8.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Absolute targets of every external `$ref` in this document, sorted
    /// and deduplicated.
    ///
    /// References into the document itself are omitted, including those
    /// that target an embedded subschema declaring its own `$id`. Each
    /// `$ref` resolves against the nearest enclosing `$id`.
    pub fn external_references(&self) -> Vec<String> {
        let mut scan = RefScan::default();
        scan.schema(&self.body, &self.id);

        scan.refs
            .into_iter()
            .filter(|target| !scan.ids.contains(target))
            .collect()
    }
}

/// Read and parse one schema file.
///
/// # Errors
///
/// Returns [`SchemaError::MalformedSchema`] if the file cannot be read, is
/// not valid JSON, or is not an object with a `$id`.
pub fn load_schema(path: impl AsRef<Path>) -> Result<SchemaDocument, SchemaError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| SchemaError::MalformedSchema {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;
    let body: Value = serde_json::from_str(&content).map_err(|e| SchemaError::MalformedSchema {
        path: path.display().to_string(),
        reason: format!("invalid JSON: {e}"),
    })?;
    SchemaDocument::from_value(path, body)
}

/// Serves registered schemas to the engine by absolute URI.
struct LocalSchemaRetriever {
    schemas: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = normalize_id(uri.as_str());
        self.schemas
            .get(&uri_str)
            .cloned()
            .ok_or_else(|| format!("schema not registered for URI: {uri_str}").into())
    }
}

/// An executable validator for one registered schema.
pub struct CompiledValidator {
    schema_id: String,
    linked: Vec<String>,
    pub(crate) inner: jsonschema::Validator,
}

impl fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("schema_id", &self.schema_id)
            .field("linked", &self.linked)
            .finish()
    }
}

impl CompiledValidator {
    /// `$id` of the schema this validator enforces.
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Every other `$id` reachable through `$ref`, in breadth-first order.
    pub fn linked(&self) -> &[String] {
        &self.linked
    }

    /// Validate a document, collecting every violation.
    pub fn validate(&self, document: &Value) -> ValidationResult {
        validate(self, document)
    }
}

/// Registry of schema documents keyed by `$id`.
///
/// Populated once at startup and read-only afterwards. Passed explicitly to
/// whatever needs to compile or validate.
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, SchemaDocument>,
    by_file: HashMap<String, String>,
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schema_count", &self.schemas.len())
            .field("ids", &self.schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and register the named files from `dir`, in the given order.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be loaded or registered. No
    /// partially populated registry is returned.
    pub fn load_dir<S: AsRef<str>>(dir: &Path, files: &[S]) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for file in files {
            registry.register(load_schema(dir.join(file.as_ref()))?)?;
        }
        tracing::info!(
            dir = %dir.display(),
            schema_count = registry.len(),
            "loaded schema registry"
        );
        Ok(registry)
    }

    /// Load and register every `*.schema.json` file directly inside `dir`,
    /// sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the directory cannot be listed, or the
    /// first load/register error.
    pub fn load_all(dir: &Path) -> Result<Self, SchemaError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(SCHEMA_FILE_SUFFIX) && path.is_file() {
                    files.push(name.to_string());
                }
            }
        }
        files.sort();
        Self::load_dir(dir, &files)
    }

    /// Add a schema under its `$id`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateId`] if the `$id` is already taken.
    pub fn register(&mut self, schema: SchemaDocument) -> Result<(), SchemaError> {
        if let Some(existing) = self.schemas.get(schema.id()) {
            return Err(SchemaError::DuplicateId {
                id: schema.id().to_string(),
                first: existing.path().display().to_string(),
                second: schema.path().display().to_string(),
            });
        }

        tracing::debug!(id = schema.id(), path = %schema.path().display(), "registered schema");

        if let Some(name) = schema.file_name() {
            self.by_file.insert(name.to_string(), schema.id().to_string());
        }
        self.schemas.insert(schema.id().to_string(), schema);
        Ok(())
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All registered `$id`s, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Iterate registered schemas in `$id` order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.schemas.values()
    }

    /// Look up a schema by `$id` or by file name.
    pub fn get(&self, name: &str) -> Option<&SchemaDocument> {
        self.resolve_name(name).and_then(|id| self.schemas.get(id))
    }

    /// Map a `$id` or a registered file name to its canonical `$id`.
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        let normalized = normalize_id(name);
        if let Some((id, _)) = self.schemas.get_key_value(&normalized) {
            return Some(id.as_str());
        }
        self.by_file.get(name).map(String::as_str)
    }

    /// Direct external `$ref` targets of one schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaNotFound`] if `name` is not registered.
    pub fn references(&self, name: &str) -> Result<Vec<String>, SchemaError> {
        self.get(name)
            .map(SchemaDocument::external_references)
            .ok_or_else(|| SchemaError::SchemaNotFound(name.to_string()))
    }

    /// Resolve every `$ref` reachable from `root_id`, returning the linked
    /// `$id`s in breadth-first order (excluding `root_id` itself).
    fn link(&self, root_id: &str) -> Result<Vec<String>, SchemaError> {
        let mut linked = Vec::new();
        let mut visited = BTreeSet::from([root_id.to_string()]);
        let mut queue = VecDeque::from([root_id.to_string()]);

        while let Some(id) = queue.pop_front() {
            let schema = self
                .schemas
                .get(&id)
                .ok_or_else(|| SchemaError::SchemaNotFound(id.clone()))?;
            for target in schema.external_references() {
                if !self.schemas.contains_key(&target) {
                    return Err(SchemaError::UnresolvedReference {
                        schema_id: id.clone(),
                        reference: target,
                    });
                }
                if visited.insert(target.clone()) {
                    linked.push(target.clone());
                    queue.push_back(target);
                }
            }
        }

        Ok(linked)
    }

    /// Link and compile the schema named by `$id` or file name.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::SchemaNotFound`] if `name` is not registered.
    /// - [`SchemaError::UnresolvedReference`] if any reachable `$ref` target
    ///   is missing from the registry.
    /// - [`SchemaError::Compile`] if the engine rejects the schema, including
    ///   an unrecognised `$schema`.
    ///
    /// The draft comes from the root schema's `$schema` when present, and
    /// is [`DEFAULT_DRAFT`] otherwise.
    pub fn compile(&self, name: &str) -> Result<CompiledValidator, SchemaError> {
        let schema_id = self
            .resolve_name(name)
            .ok_or_else(|| SchemaError::SchemaNotFound(name.to_string()))?
            .to_string();
        let linked = self.link(&schema_id)?;

        let schemas: HashMap<String, Value> = std::iter::once(&schema_id)
            .chain(linked.iter())
            .filter_map(|id| self.schemas.get(id).map(|s| (id.clone(), s.body().clone())))
            .collect();
        let root = self
            .schemas
            .get(&schema_id)
            .ok_or_else(|| SchemaError::SchemaNotFound(schema_id.clone()))?;

        let mut opts = jsonschema::options();
        if root.body().get("$schema").is_none() {
            opts.with_draft(DEFAULT_DRAFT);
        }
        opts.should_validate_formats(true);
        opts.with_retriever(LocalSchemaRetriever { schemas });

        let inner = opts.build(root.body()).map_err(|e| SchemaError::Compile {
            schema_id: schema_id.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(id = %schema_id, linked = linked.len(), "compiled schema");

        Ok(CompiledValidator {
            schema_id,
            linked,
            inner,
        })
    }

    /// Compile every registered schema, keyed by `$id`.
    ///
    /// Used as an up-front link check: a dangling `$ref` anywhere in the
    /// registry fails here, before any document is looked at.
    ///
    /// # Errors
    ///
    /// The first error from [`Self::compile`], in `$id` order.
    pub fn compile_all(&self) -> Result<BTreeMap<String, CompiledValidator>, SchemaError> {
        self.schemas
            .keys()
            .map(|id| self.compile(id).map(|validator| (id.clone(), validator)))
            .collect()
    }

    /// Compile the named schema and validate one document against it.
    ///
    /// # Errors
    ///
    /// Only compile-time errors; violations are reported in the result.
    pub fn validate_value(
        &self,
        name: &str,
        document: &Value,
    ) -> Result<ValidationResult, SchemaError> {
        Ok(self.compile(name)?.validate(document))
    }
}

/// Strip an empty trailing fragment (`...schema.json#`).
fn normalize_id(id: &str) -> String {
    id.strip_suffix('#').unwrap_or(id).to_string()
}

/// `$id`s declared inside one document and the absolute `$ref` targets
/// found in it.
#[derive(Default)]
struct RefScan {
    ids: BTreeSet<String>,
    refs: BTreeSet<String>,
}

impl RefScan {
    /// Walk a value in schema position, with `base` as the in-scope `$id`.
    fn schema(&mut self, value: &Value, base: &str) {
        match value {
            Value::Object(map) => {
                let base = match map.get("$id") {
                    Some(Value::String(id)) => resolve_reference(base, id),
                    _ => base.to_string(),
                };
                self.ids.insert(base.clone());

                for (key, child) in map {
                    match key.as_str() {
                        "$ref" => {
                            if let Value::String(reference) = child {
                                self.refs.insert(resolve_reference(&base, reference));
                            }
                        }
                        k if DATA_KEYWORDS.contains(&k) => {}
                        k if SCHEMA_MAP_KEYWORDS.contains(&k) => {
                            if let Value::Object(named) = child {
                                for subschema in named.values() {
                                    self.schema(subschema, &base);
                                }
                            }
                        }
                        _ => self.schema(child, &base),
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.schema(item, base);
                }
            }
            _ => {}
        }
    }
}

/// Resolve a `$ref` against the `$id` of the schema containing it and drop
/// the fragment. A reference with no document part resolves to `base`.
fn resolve_reference(base: &str, reference: &str) -> String {
    let target = reference.split('#').next().unwrap_or_default();
    if target.is_empty() {
        return base.to_string();
    }
    if target.contains("://") || target.starts_with("urn:") {
        return target.to_string();
    }

    if let Some(rest) = target.strip_prefix('/') {
        if let Some(scheme_end) = base.find("://") {
            let authority_start = scheme_end + 3;
            let authority_end = base[authority_start..]
                .find('/')
                .map_or(base.len(), |i| authority_start + i);
            return format!("{}/{rest}", &base[..authority_end]);
        }
        return target.to_string();
    }

    let mut dir = match base.rfind('/') {
        Some(i) => base[..i].to_string(),
        None => String::new(),
    };
    let mut rest = target;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            if let Some(i) = dir.rfind('/') {
                if !dir[..i].ends_with('/') {
                    dir.truncate(i);
                }
            }
            rest = stripped;
        } else {
            break;
        }
    }

    if dir.is_empty() {
        rest.to_string()
    } else {
        format!("{dir}/{rest}")
    }
}
