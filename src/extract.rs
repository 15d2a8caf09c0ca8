//! Field extraction from parsed metadata records
//!
//! Pure extraction routines over borrowed element subtrees: free-text
//! values in either of the profile's two interchangeable encodings,
//! keyword groups, and coded values. Nothing here mutates the tree or
//! raises on malformed field content.

use crate::documents::Element;
use crate::namespaces::{resolve_path, GCO_NAMESPACE, GMX_NAMESPACE, XLINK_NAMESPACE};
use once_cell::sync::Lazy;

static KEYWORD_PATH: Lazy<String> = Lazy::new(|| resolve_path("gmd:keyword").unwrap());
static KEYWORD_TYPE_PATH: Lazy<String> =
    Lazy::new(|| resolve_path("gmd:type/gmd:MD_KeywordTypeCode").unwrap());
static THESAURUS_PATH: Lazy<String> =
    Lazy::new(|| resolve_path("gmd:thesaurusName/gmd:CI_Citation/gmd:title").unwrap());

/// A text-bearing child node in one of the profile's two encodings.
///
/// A plain character string and an anchor carry the same logical value;
/// extraction treats both identically through [`TextValue::display`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextValue {
    /// `gco:CharacterString` encoding
    Plain(String),
    /// `gmx:Anchor` encoding, additionally carrying a hyperlink
    Anchored {
        /// Display text of the anchor
        text: String,
        /// The `xlink:href` target, when present
        href: Option<String>,
    },
}

impl TextValue {
    /// The display value, identical for both encodings
    pub fn display(&self) -> &str {
        match self {
            TextValue::Plain(text) => text,
            TextValue::Anchored { text, .. } => text,
        }
    }
}

/// Collect the text-bearing children of an element, in document order
pub fn text_values(parent: &Element) -> Vec<TextValue> {
    let mut values = Vec::new();

    for child in &parent.children {
        let ns = child.namespace();
        if ns == Some(GCO_NAMESPACE) && child.local_name() == "CharacterString" {
            values.push(TextValue::Plain(
                child.text().unwrap_or_default().to_string(),
            ));
        } else if ns == Some(GMX_NAMESPACE) && child.local_name() == "Anchor" {
            values.push(TextValue::Anchored {
                text: child.text().unwrap_or_default().to_string(),
                href: child
                    .attribute_qualified(XLINK_NAMESPACE, "href")
                    .map(str::to_string),
            });
        }
    }

    values
}

/// Texts of every `gco:CharacterString` or `gmx:Anchor` child of an
/// element, in document order. Both encodings of the same logical value
/// count identically; multiplicities are preserved.
pub fn string_or_anchor_values(parent: &Element) -> Vec<String> {
    text_values(parent)
        .into_iter()
        .map(|value| value.display().to_string())
        .collect()
}

/// [`string_or_anchor_values`] over a sequence of parents, concatenated
/// in input order
pub fn string_or_anchor_values_many(parents: &[&Element]) -> Vec<String> {
    parents
        .iter()
        .flat_map(|parent| string_or_anchor_values(parent))
        .collect()
}

/// Keywords, decoded keyword-type codes and thesaurus titles of one
/// `gmd:MD_Keywords` group. Borrowed from the parsed tree, transient.
#[derive(Debug)]
pub struct KeywordInfo<'a> {
    /// `gmd:keyword` elements, in document order
    pub keywords: Vec<&'a Element>,
    /// Decoded `gmd:MD_KeywordTypeCode` values
    pub type_codes: Vec<String>,
    /// `gmd:thesaurusName/gmd:CI_Citation/gmd:title` elements
    pub thesauruses: Vec<&'a Element>,
}

/// Extract the keyword/type/thesaurus triple from a keyword group.
///
/// Multiplicities in the source are preserved; nothing is deduplicated.
pub fn keyword_info(keywords_element: &Element) -> KeywordInfo<'_> {
    let keywords = keywords_element.findall(&KEYWORD_PATH);
    let type_codes = codelist_values(&keywords_element.findall(&KEYWORD_TYPE_PATH));
    let thesauruses = keywords_element.findall(&THESAURUS_PATH);

    KeywordInfo {
        keywords,
        type_codes,
        thesauruses,
    }
}

/// Decode coded values from a sequence of elements.
///
/// The value is read from the `codeListValue` attribute first, falling
/// back to the element's text; elements yielding neither are skipped, so
/// the result carries no placeholders. Order is preserved.
pub fn codelist_values(elements: &[&Element]) -> Vec<String> {
    let mut values = Vec::new();

    for element in elements {
        let value = element
            .attribute("codeListValue")
            .or_else(|| element.text());
        if let Some(value) = value {
            values.push(value.to_string());
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    const KEYWORDS_XML: &str = r##"<gmd:MD_Keywords
        xmlns:gmd="http://www.isotc211.org/2005/gmd"
        xmlns:gco="http://www.isotc211.org/2005/gco"
        xmlns:gmx="http://www.isotc211.org/2005/gmx"
        xmlns:xlink="http://www.w3.org/1999/xlink">
      <gmd:keyword>
        <gco:CharacterString>precipitation</gco:CharacterString>
      </gmd:keyword>
      <gmd:keyword>
        <gmx:Anchor xlink:href="https://codes.example.org/temperature">temperature</gmx:Anchor>
      </gmd:keyword>
      <gmd:keyword>
        <gco:CharacterString>precipitation</gco:CharacterString>
      </gmd:keyword>
      <gmd:type>
        <gmd:MD_KeywordTypeCode codeList="#MD_KeywordTypeCode" codeListValue="theme"/>
      </gmd:type>
      <gmd:thesaurusName>
        <gmd:CI_Citation>
          <gmd:title>
            <gco:CharacterString>WMO Category Codes</gco:CharacterString>
          </gmd:title>
        </gmd:CI_Citation>
      </gmd:thesaurusName>
    </gmd:MD_Keywords>"##;

    #[test]
    fn test_string_and_anchor_treated_identically() {
        let xml = r#"<gmd:title
            xmlns:gmd="http://www.isotc211.org/2005/gmd"
            xmlns:gco="http://www.isotc211.org/2005/gco"
            xmlns:gmx="http://www.isotc211.org/2005/gmx"
            xmlns:xlink="http://www.w3.org/1999/xlink">
          <gco:CharacterString>first</gco:CharacterString>
          <gmx:Anchor xlink:href="https://example.org/def">second</gmx:Anchor>
          <gco:CharacterString>third</gco:CharacterString>
        </gmd:title>"#;
        let doc = Document::from_string(xml).unwrap();

        let values = string_or_anchor_values(doc.root());
        assert_eq!(values, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_text_values_variants() {
        let xml = r#"<parent
            xmlns:gco="http://www.isotc211.org/2005/gco"
            xmlns:gmx="http://www.isotc211.org/2005/gmx"
            xmlns:xlink="http://www.w3.org/1999/xlink">
          <gco:CharacterString>plain</gco:CharacterString>
          <gmx:Anchor xlink:href="urn:x">linked</gmx:Anchor>
          <other>ignored</other>
        </parent>"#;
        let doc = Document::from_string(xml).unwrap();

        let values = text_values(doc.root());
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], TextValue::Plain("plain".to_string()));
        assert_eq!(
            values[1],
            TextValue::Anchored {
                text: "linked".to_string(),
                href: Some("urn:x".to_string()),
            }
        );
        assert_eq!(values[0].display(), "plain");
        assert_eq!(values[1].display(), "linked");
    }

    #[test]
    fn test_string_or_anchor_values_many_concatenates_in_order() {
        let xml = r#"<root xmlns:gco="http://www.isotc211.org/2005/gco">
          <a><gco:CharacterString>1</gco:CharacterString></a>
          <b><gco:CharacterString>2</gco:CharacterString>
             <gco:CharacterString>3</gco:CharacterString></b>
        </root>"#;
        let doc = Document::from_string(xml).unwrap();

        let a = doc.find("a").unwrap();
        let b = doc.find("b").unwrap();
        let values = string_or_anchor_values_many(&[a, b]);
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_keyword_info_counts_and_order() {
        let doc = Document::from_string(KEYWORDS_XML).unwrap();

        let info = keyword_info(doc.root());
        assert_eq!(info.keywords.len(), 3);
        assert_eq!(info.type_codes, vec!["theme"]);
        assert_eq!(info.thesauruses.len(), 1);

        // Duplicates preserved, document order kept
        let texts = string_or_anchor_values_many(&info.keywords);
        assert_eq!(texts, vec!["precipitation", "temperature", "precipitation"]);

        let titles = string_or_anchor_values_many(&info.thesauruses);
        assert_eq!(titles, vec!["WMO Category Codes"]);
    }

    #[test]
    fn test_codelist_values_attribute_then_text() {
        let xml = r#"<root>
          <code codeListValue="fromAttribute">fromText</code>
          <code>textOnly</code>
          <code/>
          <code codeListValue="attrOnly"/>
        </root>"#;
        let doc = Document::from_string(xml).unwrap();

        let elements = doc.findall("code");
        assert_eq!(elements.len(), 4);

        let values = codelist_values(&elements);
        assert_eq!(values, vec!["fromAttribute", "textOnly", "attrOnly"]);
    }
}
