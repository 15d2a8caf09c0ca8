//! XML document handling
//!
//! Parses raw metadata content into a navigable, namespace-resolved
//! element tree and verifies that a record is rooted at the profile's
//! metadata element. Extraction routines operate on borrowed references
//! into this tree and never mutate it.

use crate::error::{Error, ParseError, Result};
use crate::namespaces::{split_path_segments, NamespaceContext, QName, GMD_NAMESPACE};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::Path;
use tracing::error;

/// Fully qualified tag of a WCMP metadata record's root element
pub const WCMP_ROOT_TAG: &str = "{http://www.isotc211.org/2005/gmd}MD_Metadata";

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes, with prefixed attribute names resolved
    pub attributes: HashMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements, in document order
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: HashMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get the fully qualified `{namespace}local` tag
    pub fn tag(&self) -> String {
        self.qname.to_string()
    }

    /// Get the text content
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get an attribute value by local name, regardless of namespace
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Get an attribute value by namespace and local name
    pub fn attribute_qualified(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| {
                qname.namespace.as_deref() == Some(namespace) && qname.local_name == name
            })
            .map(|(_, value)| value.as_str())
    }

    /// Find all descendants matching a resolved path expression, relative
    /// to this element's children, in document order.
    ///
    /// Segments are the `{namespace-uri}localname` / bare `localname` forms
    /// produced by [`crate::namespaces::resolve_path`].
    pub fn findall(&self, path: &str) -> Vec<&Element> {
        if path.is_empty() {
            return Vec::new();
        }

        let mut current: Vec<&Element> = vec![self];
        for segment in split_path_segments(path) {
            let mut next = Vec::new();
            for element in current {
                for child in &element.children {
                    if child.qname.matches_segment(segment) {
                        next.push(child);
                    }
                }
            }
            current = next;
        }
        current
    }

    /// Find the first descendant matching a resolved path expression
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.findall(path).into_iter().next()
    }
}

/// Parsed XML document, exclusively owned by the caller
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse an XML document from bytes.
    ///
    /// Malformed input fails with a parse classification; the underlying
    /// parser diagnostic is preserved in the log only. No partial result
    /// is returned on failure.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_inner(xml).map_err(|err| match err {
            Error::Xml(detail) => {
                error!("{}", detail);
                Error::Parse(ParseError::new("Syntax error"))
            }
            other => other,
        })
    }

    fn parse_inner(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);

        let mut element_stack: Vec<Element> = Vec::new();
        let mut scopes: Vec<NamespaceContext> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let (element, scope) = Self::parse_element(&e, &scopes)?;
                    scopes.push(scope);
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    scopes.pop();
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.children.push(current);
                        } else if root.is_none() {
                            root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let (element, _scope) = Self::parse_element(&e, &scopes)?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.children.push(element);
                    } else if root.is_none() {
                        root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("failed to unescape text: {}", e)))?;
                        if !text.trim().is_empty() {
                            current.text.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        if !text.trim().is_empty() {
                            current.text.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // comments, processing instructions, declarations
            }
            buf.clear();
        }

        match root {
            Some(root) => Ok(Self { root }),
            None => Err(Error::Xml("document has no root element".to_string())),
        }
    }

    /// Build an element from a start tag, resolving its name and attribute
    /// names against the enclosing namespace scopes
    fn parse_element(
        start: &BytesStart,
        scopes: &[NamespaceContext],
    ) -> Result<(Element, NamespaceContext)> {
        let mut scope = NamespaceContext::new();
        let mut plain_attributes: Vec<(String, String)> = Vec::new();

        // Namespace declarations first, so they apply to this element
        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("failed to parse attribute: {}", e)))?;

            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("invalid attribute name: {}", e)))?;
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("failed to unescape attribute value: {}", e)))?
                .to_string();

            if key == "xmlns" {
                scope.set_default_namespace(&value);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.add_prefix(prefix, &value);
            } else {
                plain_attributes.push((key.to_string(), value));
            }
        }

        let name_ref = start.name();
        let name = std::str::from_utf8(name_ref.as_ref())
            .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?;

        let qname = if let Some((prefix, local)) = name.split_once(':') {
            let uri = Self::lookup_prefix(prefix, &scope, scopes).ok_or_else(|| {
                Error::Xml(format!("unbound namespace prefix '{}' on <{}>", prefix, name))
            })?;
            QName::namespaced(uri, local)
        } else {
            match Self::lookup_default(&scope, scopes) {
                Some(uri) => QName::namespaced(uri, name),
                None => QName::local(name),
            }
        };

        let mut element = Element::new(qname);

        for (key, value) in plain_attributes {
            // Unprefixed attributes carry no namespace
            let attr_qname = if let Some((prefix, local)) = key.split_once(':') {
                let uri = Self::lookup_prefix(prefix, &scope, scopes).ok_or_else(|| {
                    Error::Xml(format!("unbound namespace prefix '{}' on @{}", prefix, key))
                })?;
                QName::namespaced(uri, local)
            } else {
                QName::local(key)
            };
            element.attributes.insert(attr_qname, value);
        }

        Ok((element, scope))
    }

    fn lookup_prefix(
        prefix: &str,
        scope: &NamespaceContext,
        scopes: &[NamespaceContext],
    ) -> Option<String> {
        scope
            .get_namespace(prefix)
            .or_else(|| scopes.iter().rev().find_map(|s| s.get_namespace(prefix)))
            .map(str::to_string)
    }

    fn lookup_default(scope: &NamespaceContext, scopes: &[NamespaceContext]) -> Option<String> {
        scope
            .get_default_namespace()
            .or_else(|| {
                scopes
                    .iter()
                    .rev()
                    .find_map(|s| s.get_default_namespace())
            })
            // xmlns="" undeclares the default namespace
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
    }

    /// Get the root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Find all elements matching a resolved path, relative to the root
    pub fn findall(&self, path: &str) -> Vec<&Element> {
        self.root.findall(path)
    }

    /// Find the first element matching a resolved path, relative to the root
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.root.find(path)
    }
}

/// Parse a buffer into a [`Document`] and require the WCMP metadata root.
///
/// A document whose root is not `gmd:MD_Metadata` fails with
/// [`Error::NotRecognized`].
pub fn parse_wcmp(content: &str) -> Result<Document> {
    let document = Document::from_string(content)?;
    check_wcmp_root(&document)?;
    Ok(document)
}

/// [`parse_wcmp`] for on-disk records
pub fn parse_wcmp_file(path: impl AsRef<Path>) -> Result<Document> {
    let document = Document::from_file(path)?;
    check_wcmp_root(&document)?;
    Ok(document)
}

fn check_wcmp_root(document: &Document) -> Result<()> {
    let root = document.root();
    if root.namespace() != Some(GMD_NAMESPACE) || root.local_name() != "MD_Metadata" {
        return Err(Error::NotRecognized(format!(
            "root element is <{}>, not a WCMP metadata record",
            root.tag()
        )));
    }
    Ok(())
}
