//! Per-user cache layout
//!
//! The profile's schema, codelist definitions and topic hierarchy files
//! live in a per-user cache directory provisioned ahead of a validation
//! run (provisioning itself is a separate concern). Components take the
//! cache root as explicit configuration so tests can point them at a
//! scratch directory.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Directory name of the profile bundle inside the cache root
const PROFILE_DIR: &str = "wcmp-1.3";

/// Cache root plus the fixed layout beneath it
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    /// Create a layout rooted at an explicit directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The default per-user location, `$HOME/.wcmp`
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Resource("cannot determine home directory".to_string()))?;
        Ok(Self::new(home.join(".wcmp")))
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the cache root exists on disk
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Directory holding the profile schema bundle
    pub fn profile_dir(&self) -> PathBuf {
        self.root.join(PROFILE_DIR)
    }

    /// The composed top-level schema file
    pub fn profile_schema(&self) -> PathBuf {
        self.profile_dir().join("iso-all.xsd")
    }

    /// The standards-body codelist file shipped with the schema bundle
    pub fn iso_codelists(&self) -> PathBuf {
        self.profile_dir()
            .join("schema")
            .join("resources")
            .join("Codelist")
            .join("gmxCodelists.xml")
    }

    /// The domain codelist file
    pub fn wmo_codelists(&self) -> PathBuf {
        self.profile_dir().join("WMOCodeLists.xml")
    }

    /// Directory holding the topic hierarchy level files
    pub fn topic_hierarchy_dir(&self) -> PathBuf {
        self.root.join("topic-hierarchy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = CacheLayout::new("/tmp/wcmp-cache");

        assert_eq!(layout.root(), Path::new("/tmp/wcmp-cache"));
        assert_eq!(
            layout.profile_schema(),
            Path::new("/tmp/wcmp-cache/wcmp-1.3/iso-all.xsd")
        );
        assert!(layout
            .iso_codelists()
            .ends_with("wcmp-1.3/schema/resources/Codelist/gmxCodelists.xml"));
        assert!(layout.wmo_codelists().ends_with("wcmp-1.3/WMOCodeLists.xml"));
        assert!(layout.topic_hierarchy_dir().ends_with("topic-hierarchy"));
    }

    #[test]
    fn test_exists() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CacheLayout::new(dir.path()).exists());
        assert!(!CacheLayout::new(dir.path().join("missing")).exists());
    }
}
