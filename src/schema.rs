//! Profile schema loading and document validation
//!
//! Loads the composed profile schema from the per-user cache, following
//! `xs:include`/`xs:import` references, and validates parsed metadata
//! documents at the element-declaration level: the root must be a
//! globally declared element and every element must be declared for its
//! namespace. The profile's deeper XSD semantics live in the schema
//! bundle itself, which is not redefined here.

use crate::cache::CacheLayout;
use crate::documents::{Document, Element};
use crate::error::{Error, Result, ValidationError};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// XSD namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Validation strictness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Fail on the first violation
    #[default]
    Strict,
    /// Collect all violations
    Lax,
}

/// Validation context: mode plus collected diagnostics
#[derive(Debug, Default)]
pub struct ValidationContext {
    /// Current validation mode
    pub mode: ValidationMode,
    /// Collected validation errors (lax mode)
    pub errors: Vec<ValidationError>,
}

impl ValidationContext {
    /// Create a new strict validation context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a specific mode
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check if there are any collected errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the collected error count
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Raise or collect an error based on validation mode
    fn raise_or_collect(&mut self, error: ValidationError) -> Result<()> {
        match self.mode {
            ValidationMode::Strict => Err(Error::Validation(error)),
            ValidationMode::Lax => {
                self.errors.push(error);
                Ok(())
            }
        }
    }
}

/// Element declarations harvested from the composed profile schema.
/// Read-only after load; safely shareable across validation calls.
#[derive(Debug, Default)]
pub struct ProfileSchema {
    /// All declared element names, per namespace
    declarations: IndexMap<String, IndexSet<String>>,
    /// Globally declared (root-eligible) element names, per namespace
    globals: IndexMap<String, IndexSet<String>>,
    /// Schema files loaded, in load order
    sources: Vec<PathBuf>,
}

impl ProfileSchema {
    /// Load the composed profile schema from the cache.
    ///
    /// Fails with an I/O error when the cache root does not exist.
    pub fn load(cache: &CacheLayout) -> Result<Self> {
        if !cache.exists() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", cache.root().display()),
            )));
        }

        let entry = cache.profile_schema();
        debug!("loading composed schema {}", entry.display());

        let mut schema = Self::default();
        let mut visited = HashSet::new();
        schema.load_schema_file(&entry, &mut visited)?;
        Ok(schema)
    }

    fn load_schema_file(&mut self, path: &Path, visited: &mut HashSet<PathBuf>) -> Result<()> {
        let canonical = fs::canonicalize(path)?;
        if !visited.insert(canonical.clone()) {
            return Ok(());
        }
        self.sources.push(canonical.clone());

        let text = fs::read_to_string(&canonical)?;
        let doc = roxmltree::Document::parse(&text).map_err(|e| {
            Error::Resource(format!(
                "failed to parse schema {}: {}",
                canonical.display(),
                e
            ))
        })?;

        let root = doc.root_element();
        if root.tag_name().namespace() != Some(XSD_NAMESPACE) || root.tag_name().name() != "schema"
        {
            return Err(Error::Resource(format!(
                "{} is not an XML Schema document",
                canonical.display()
            )));
        }

        let target_ns = root.attribute("targetNamespace").unwrap_or("").to_string();
        let qualified = root.attribute("elementFormDefault") == Some("qualified");
        let base_dir = canonical.parent().map(Path::to_path_buf).unwrap_or_default();

        for node in root
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().namespace() == Some(XSD_NAMESPACE))
        {
            match node.tag_name().name() {
                "element" => {
                    if let Some(name) = node.attribute("name") {
                        let global = node.parent() == Some(root);
                        // Unqualified local elements carry no namespace
                        let namespace = if global || qualified { &target_ns } else { "" };
                        self.declare(namespace, name, global);
                    }
                }
                "include" | "import" | "redefine" => {
                    if let Some(location) = node.attribute("schemaLocation") {
                        if location.starts_with("http://") || location.starts_with("https://") {
                            warn!("skipping remote schema location {}", location);
                        } else {
                            self.load_schema_file(&base_dir.join(location), visited)?;
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn declare(&mut self, namespace: &str, name: &str, global: bool) {
        self.declarations
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string());
        if global {
            self.globals
                .entry(namespace.to_string())
                .or_default()
                .insert(name.to_string());
        }
    }

    /// Whether an element name is declared for a namespace
    pub fn is_declared(&self, namespace: Option<&str>, name: &str) -> bool {
        self.declarations
            .get(namespace.unwrap_or(""))
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    /// Whether an element name is a global declaration for a namespace
    pub fn is_global(&self, namespace: Option<&str>, name: &str) -> bool {
        self.globals
            .get(namespace.unwrap_or(""))
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    /// The schema files loaded, in load order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Validate a parsed document; the first violation fails with the
    /// engine's diagnostic. The document is not mutated.
    pub fn validate(&self, document: &Document) -> Result<()> {
        let mut context = ValidationContext::new();
        self.validate_with(document, &mut context)
    }

    /// Validate raw text, parsed first
    pub fn validate_str(&self, xml: &str) -> Result<()> {
        let document = Document::from_string(xml)?;
        self.validate(&document)
    }

    /// Whether a document validates, collecting rather than raising
    pub fn is_valid(&self, document: &Document) -> bool {
        let mut context = ValidationContext::new().with_mode(ValidationMode::Lax);
        self.validate_with(document, &mut context).is_ok() && !context.has_errors()
    }

    /// Validate into a caller-supplied context
    pub fn validate_with(&self, document: &Document, context: &mut ValidationContext) -> Result<()> {
        let root = document.root();

        if !self.is_global(root.namespace(), root.local_name()) {
            context.raise_or_collect(
                ValidationError::new(format!("unknown root element: {}", root.tag()))
                    .with_reason("no matching global element declaration"),
            )?;
        }

        self.validate_element(root, "", context)
    }

    fn validate_element(
        &self,
        element: &Element,
        path: &str,
        context: &mut ValidationContext,
    ) -> Result<()> {
        let here = format!("{}/{}", path, element.local_name());

        if !self.is_declared(element.namespace(), element.local_name()) {
            context.raise_or_collect(
                ValidationError::new(format!(
                    "element '{}' is not declared in the profile schema",
                    element.tag()
                ))
                .with_path(here.clone()),
            )?;
        }

        for child in &element.children {
            self.validate_element(child, &here, context)?;
        }

        Ok(())
    }
}
