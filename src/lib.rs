//! # wcmp
//!
//! Validation of WMO Core Metadata Profile (WCMP 1.3) records, the
//! ISO-19139-derived metadata standard used by meteorological data
//! exchange networks.
//!
//! The crate parses an XML metadata record, confirms it is rooted at the
//! profile's metadata element, validates it against the profile schema
//! from a per-user cache, extracts semantically meaningful fields
//! (keywords, thesaurus references, coded values, temporal extents),
//! cross-checks coded values against the ISO and WMO codelists, and
//! probes hyperlinks for reachability.
//!
//! ## Example
//!
//! ```rust,ignore
//! use wcmp::{parse_wcmp_file, CacheLayout, CodelistStore, ProfileSchema};
//!
//! let cache = CacheLayout::default_location()?;
//! let codelists = CodelistStore::load(&cache)?;
//! let schema = ProfileSchema::load(&cache)?;
//!
//! let record = parse_wcmp_file("metadata.xml")?;
//! schema.validate(&record)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod cache;
pub mod error;

// Namespaces and the document tree
pub mod documents;
pub mod namespaces;

// Extraction
pub mod codelists;
pub mod extract;
pub mod temporal;

// Validation and link checking
pub mod links;
pub mod schema;

// Topic hierarchy
pub mod topics;

// Re-exports for convenience
pub use cache::CacheLayout;
pub use codelists::CodelistStore;
pub use documents::{parse_wcmp, parse_wcmp_file, Document, Element};
pub use error::{Error, Result};
pub use extract::{
    codelist_values, keyword_info, string_or_anchor_values, string_or_anchor_values_many,
    KeywordInfo,
};
pub use links::{LinkCheckResult, LinkChecker};
pub use namespaces::resolve_path;
pub use schema::ProfileSchema;
pub use temporal::parse_time_position;
pub use topics::TopicHierarchy;

/// Version of the wcmp library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
