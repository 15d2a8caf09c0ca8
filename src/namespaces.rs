//! XML namespace handling
//!
//! Qualified names (QNames), per-element namespace scopes, the fixed
//! WCMP prefix table and path-expression resolution.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// ISO 19139 gco namespace
pub const GCO_NAMESPACE: &str = "http://www.isotc211.org/2005/gco";
/// ISO 19139 gmd namespace
pub const GMD_NAMESPACE: &str = "http://www.isotc211.org/2005/gmd";
/// GML 3.2 namespace
pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml/3.2";
/// ISO 19139 gmx namespace
pub const GMX_NAMESPACE: &str = "http://www.isotc211.org/2005/gmx";
/// XLink namespace
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Fixed prefix table used by every path expression in the profile.
/// Immutable after initialization; every prefix used in a path expression
/// must exist here or resolution fails.
static NAMESPACES: Lazy<IndexMap<&'static str, &'static str>> = Lazy::new(|| {
    IndexMap::from([
        ("gco", GCO_NAMESPACE),
        ("gmd", GMD_NAMESPACE),
        ("gml", GML_NAMESPACE),
        ("gmx", GMX_NAMESPACE),
        ("xlink", XLINK_NAMESPACE),
    ])
});

/// Look up the namespace URI for one of the profile's fixed prefixes
pub fn namespace_uri(prefix: &str) -> Option<&'static str> {
    NAMESPACES.get(prefix).copied()
}

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Check against an `{uri}local` or bare `local` path segment
    pub fn matches_segment(&self, segment: &str) -> bool {
        if let Some(rest) = segment.strip_prefix('{') {
            if let Some((ns, local)) = rest.split_once('}') {
                return self.namespace.as_deref() == Some(ns) && self.local_name == local;
            }
            false
        } else {
            self.namespace.is_none() && self.local_name == segment
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// One element's namespace declarations, used as a scope stack entry
/// while building the document tree
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<String, String>,
    /// Default namespace (no prefix), None when not declared at this scope
    default_namespace: Option<String>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix declared at this scope
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace declared at this scope
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }
}

/// Split a path expression on '/' while leaving `{uri}` spans intact,
/// so namespace URIs containing slashes survive
pub fn split_path_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in path.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&path[start..]);
    segments
}

/// Expand a '/'-separated path expression with `prefix:localname` segments
/// into the fully qualified `{namespace-uri}localname` form.
///
/// Unprefixed segments and already-qualified segments pass through
/// unchanged, which makes resolution idempotent. An unknown prefix fails
/// with a namespace error.
pub fn resolve_path(path: &str) -> Result<String> {
    let mut out = Vec::new();

    for segment in split_path_segments(path) {
        if segment.starts_with('{') {
            out.push(segment.to_string());
        } else if let Some((prefix, local)) = segment.split_once(':') {
            let uri = namespace_uri(prefix)
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            out.push(format!("{{{}}}{}", uri, local));
        } else {
            out.push(segment.to_string());
        }
    }

    Ok(out.join("/"))
}
