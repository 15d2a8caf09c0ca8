//! Controlled vocabulary (codelist) loading and lookup
//!
//! Builds the in-memory codelist dictionaries from the two vocabulary
//! files in the per-user cache: the ISO codelists shipped with the
//! schema bundle and the WMO code lists. The store is read-only after
//! loading and may be shared freely across extraction calls.

use crate::cache::CacheLayout;
use crate::documents::Document;
use crate::error::Result;
use crate::namespaces::{resolve_path, GML_NAMESPACE};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::path::Path;
use tracing::{debug, warn};

/// Authority key for the standards-body vocabulary
pub const AUTHORITY_ISO: &str = "iso";
/// Authority key for the domain vocabulary
pub const AUTHORITY_WMO: &str = "wmo";

static DICTIONARY_PATH: Lazy<String> =
    Lazy::new(|| resolve_path("gmx:codelistItem/gmx:CodeListDictionary").unwrap());
static ENTRY_PATH: Lazy<String> =
    Lazy::new(|| resolve_path("gmx:codeEntry/gmx:CodeDefinition/gml:identifier").unwrap());

/// Codes of one dictionary, in declaration order
pub type CodeSequence = Vec<String>;

/// Codelist dictionaries of one authority, keyed by dictionary identifier
pub type AuthorityCodelists = IndexMap<String, CodeSequence>;

/// In-memory store of the ISO and WMO codelists
#[derive(Debug, Clone, Default)]
pub struct CodelistStore {
    codelists: IndexMap<String, AuthorityCodelists>,
}

impl CodelistStore {
    /// Load both vocabulary files from the cache.
    ///
    /// Fails with an I/O error when a cache file is missing; provisioning
    /// the cache is the caller's responsibility. One-shot, no retry.
    pub fn load(cache: &CacheLayout) -> Result<Self> {
        let sources = [
            (AUTHORITY_ISO, cache.iso_codelists()),
            (AUTHORITY_WMO, cache.wmo_codelists()),
        ];

        let mut codelists = IndexMap::new();
        for (authority, path) in sources {
            debug!("loading {} codelists from {}", authority, path.display());
            codelists.insert(authority.to_string(), Self::load_file(&path)?);
        }

        Ok(Self { codelists })
    }

    fn load_file(path: &Path) -> Result<AuthorityCodelists> {
        let document = Document::from_file(path)?;

        let mut dictionaries = AuthorityCodelists::new();
        for dictionary in document.findall(&DICTIONARY_PATH) {
            let identifier = match dictionary
                .attribute_qualified(GML_NAMESPACE, "id")
                .or_else(|| dictionary.attribute("id"))
            {
                Some(id) => id.to_string(),
                None => {
                    warn!(
                        "skipping CodeListDictionary without gml:id in {}",
                        path.display()
                    );
                    continue;
                }
            };

            let codes = dictionary
                .findall(&ENTRY_PATH)
                .iter()
                .map(|entry| entry.text().unwrap_or_default().to_string())
                .collect();

            // A repeated identifier replaces the earlier dictionary
            dictionaries.insert(identifier, codes);
        }

        Ok(dictionaries)
    }

    /// The authority keys present in the store
    pub fn authorities(&self) -> impl Iterator<Item = &str> {
        self.codelists.keys().map(String::as_str)
    }

    /// All dictionaries of one authority
    pub fn authority(&self, authority: &str) -> Option<&AuthorityCodelists> {
        self.codelists.get(authority)
    }

    /// The code sequence of one dictionary, in declaration order
    pub fn codes(&self, authority: &str, codelist: &str) -> Option<&[String]> {
        self.codelists
            .get(authority)?
            .get(codelist)
            .map(Vec::as_slice)
    }

    /// Whether a code is permitted by a dictionary
    pub fn contains(&self, authority: &str, codelist: &str, code: &str) -> bool {
        self.codes(authority, codelist)
            .map(|codes| codes.iter().any(|c| c == code))
            .unwrap_or(false)
    }
}
