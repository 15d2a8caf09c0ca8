//! WIS 2.0 topic hierarchy
//!
//! Loads the topic hierarchy level files from the per-user cache and
//! validates dotted topic hierarchy strings against them, level by
//! level.

use crate::cache::CacheLayout;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use tracing::{debug, error, warn};

/// Level files making up the hierarchy, in order
pub const TOPIC_LEVELS: [&str; 8] = [
    "channel",
    "version",
    "wis2",
    "country",
    "centre-id",
    "resource-type",
    "data-policy",
    "earth-system-domain",
];

/// One topic within a level
#[derive(Debug, Clone)]
pub struct Topic {
    /// Topic name, the value used in hierarchy strings
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Name of the child level, when any
    pub child: String,
}

/// One level of the hierarchy, keyed by topic name
#[derive(Debug, Clone)]
pub struct TopicLevel {
    /// Level name, from the file stem
    pub name: String,
    /// Topics at this level, in file order
    pub topics: IndexMap<String, Topic>,
}

/// The loaded topic hierarchy
#[derive(Debug, Clone)]
pub struct TopicHierarchy {
    /// Display name of the hierarchy
    pub name: String,
    /// Levels, in [`TOPIC_LEVELS`] order
    pub levels: Vec<TopicLevel>,
}

impl TopicHierarchy {
    /// Read the level files from the cache
    pub fn load(cache: &CacheLayout) -> Result<Self> {
        let dir = cache.topic_hierarchy_dir();
        debug!("reading topic hierarchy files in {}", dir.display());

        let mut levels = Vec::with_capacity(TOPIC_LEVELS.len());
        for level_name in TOPIC_LEVELS {
            let path = dir.join(format!("{}.csv", level_name));
            debug!("reading topic hierarchy file {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            levels.push(parse_level(level_name, &content)?);
        }

        Ok(Self {
            name: "WIS 2.0 Topic Hierarchy".to_string(),
            levels,
        })
    }

    /// List children at a given level of a topic hierarchy.
    ///
    /// With no hierarchy given, returns the root level `/` and the level
    /// names. Otherwise the hierarchy must validate, and the level below
    /// its last step is returned with its topic names.
    pub fn list_children(&self, topic_hierarchy: Option<&str>) -> Result<(String, Vec<String>)> {
        let th = match topic_hierarchy {
            None => {
                let names = self.levels.iter().map(|l| l.name.clone()).collect();
                return Ok(("/".to_string(), names));
            }
            Some(th) => th,
        };

        if !self.validate(Some(th))? {
            let msg = "topic hierarchy is not valid";
            error!("{}", msg);
            return Err(Error::Value(msg.to_string()));
        }

        let step = th.split('.').count();
        let level = self.levels.get(step).ok_or_else(|| {
            Error::Value(format!("no level below step {} of '{}'", step, th))
        })?;

        Ok((level.name.clone(), level.topics.keys().cloned().collect()))
    }

    /// Validate a dotted topic hierarchy string.
    ///
    /// Each step must name a topic at its level; an empty or unknown
    /// step makes the hierarchy invalid.
    pub fn validate(&self, topic_hierarchy: Option<&str>) -> Result<bool> {
        let th = match topic_hierarchy {
            Some(th) if !th.is_empty() => th,
            _ => {
                let msg = "topic hierarchy is empty";
                error!("{}", msg);
                return Err(Error::Value(msg.to_string()));
            }
        };

        for (step, topic) in th.split('.').enumerate() {
            let level = match self.levels.get(step) {
                Some(level) => level,
                None => {
                    error!("no level defined at step={}", step);
                    return Ok(false);
                }
            };

            debug!("validating step={}, level={}", step, level.name);

            if topic.is_empty() {
                error!("topic at step={}, level={} is empty", step, level.name);
                return Ok(false);
            }

            if !level.topics.contains_key(topic) {
                error!(
                    "topic {} at step={}, level={} not in {:?}",
                    topic,
                    step,
                    level.name,
                    level.topics.keys().collect::<Vec<_>>()
                );
                return Ok(false);
            }
        }

        Ok(true)
    }
}

fn parse_level(name: &str, content: &str) -> Result<TopicLevel> {
    let mut lines = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| Error::Value(format!("topic hierarchy file '{}' is empty", name)))?;
    let columns = split_csv_line(header);

    let column = |wanted: &str| {
        columns.iter().position(|c| c == wanted).ok_or_else(|| {
            Error::Value(format!(
                "missing '{}' column in topic hierarchy file '{}'",
                wanted, name
            ))
        })
    };
    let name_idx = column("Name")?;
    let description_idx = column("Description")?;
    let child_idx = column("Child")?;

    let mut topics = IndexMap::new();
    for line in lines {
        let fields = split_csv_line(line);
        let field = |idx: usize| fields.get(idx).cloned().unwrap_or_default();

        let topic = Topic {
            name: field(name_idx),
            description: field(description_idx),
            child: field(child_idx),
        };
        if topic.name.is_empty() {
            warn!("skipping unnamed topic row in '{}'", name);
            continue;
        }
        topics.insert(topic.name.clone(), topic);
    }

    Ok(TopicLevel {
        name: name.to_string(),
        topics,
    })
}

/// Split one CSV line, honoring double-quoted fields
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
