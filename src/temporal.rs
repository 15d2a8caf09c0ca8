//! Temporal value parsing
//!
//! Extracts timezone-aware instants from GML time position elements.
//! Parsing is benevolent: "Zulu" and naive strings may be mixed and
//! embedded offsets are ignored, on the assumption that the profile's
//! instants all refer to UTC. Indeterminate position markers resolve
//! relative to the current instant. Unparseable text degrades to an
//! absent value with a diagnostic, never an error.

use crate::documents::Element;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Symbolic instant carried by an `indeterminatePosition` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndeterminatePosition {
    /// The current instant
    Now,
    /// Unknown, treated as the current instant
    Unknown,
    /// Some instant in the past; resolved as 24 hours before now
    Before,
    /// Some instant in the future; resolved as 24 hours after now
    After,
    /// A marker the profile does not define
    Other(String),
}

impl IndeterminatePosition {
    /// Classify a raw attribute value
    pub fn parse(marker: &str) -> Self {
        match marker {
            "now" => Self::Now,
            "unknown" => Self::Unknown,
            "before" => Self::Before,
            "after" => Self::After,
            other => Self::Other(other.to_string()),
        }
    }

    /// Resolve against an injected current instant.
    ///
    /// Pure function; an unrecognized marker resolves to no value rather
    /// than an error.
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Now | Self::Unknown => Some(now),
            Self::Before => Some(now - Duration::hours(24)),
            Self::After => Some(now + Duration::hours(24)),
            Self::Other(_) => None,
        }
    }
}

/// Extract a UTC instant from a GML time position element
/// (e.g. `gml:beginPosition`), or `None` when no usable value exists.
///
/// An `indeterminatePosition` marker takes precedence over any text
/// content. Parse failures are logged and absorbed.
pub fn parse_time_position(element: &Element) -> Option<DateTime<Utc>> {
    parse_time_position_at(element, Utc::now())
}

/// [`parse_time_position`] with an injected current instant, so the
/// indeterminate-marker arithmetic is deterministic under test
pub fn parse_time_position_at(element: &Element, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(marker) = element.attribute("indeterminatePosition") {
        let position = IndeterminatePosition::parse(marker);
        if let IndeterminatePosition::Other(raw) = &position {
            debug!("time point has unexpected value of indeterminatePosition: {}", raw);
        }
        return position.resolve(now);
    }

    let text = element.text()?;
    match parse_loose(text) {
        Ok(naive) => Some(naive.and_utc()),
        Err(err) => {
            debug!("invalid time string: {}", err);
            None
        }
    }
}

/// Date-time formats accepted before falling back to date-only forms
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

static TRAILING_OFFSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[+-]\d{2}:?\d{2}$").unwrap());
static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());
static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());

/// Permissive date/time parsing: trailing `Z` stripped, trailing numeric
/// offsets ignored, then a fixed ladder of loose formats. Anything that
/// matches no rung is an error — absent beats a wrong guess.
fn parse_loose(text: &str) -> Result<NaiveDateTime, String> {
    let mut stripped = text.trim();
    if let Some(rest) = stripped.strip_suffix('Z') {
        stripped = rest;
    }
    let stripped = TRAILING_OFFSET.replace(stripped, "");
    let stripped = stripped.trim();

    for format in DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(stripped, format) {
            return Ok(value);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(stripped, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    if let Some(caps) = YEAR_MONTH.captures(stripped) {
        let year: i32 = caps[1].parse().map_err(|e| format!("{}", e))?;
        let month: u32 = caps[2].parse().map_err(|e| format!("{}", e))?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    if YEAR_ONLY.is_match(stripped) {
        let year: i32 = stripped.parse().map_err(|e| format!("{}", e))?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, 1, 1) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    Err(format!("unparseable date/time: '{}'", text.trim()))
}
