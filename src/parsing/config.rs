//! Decoding of the `ROSTERS` and `COURSESECTIONS` environment variables.
//!
//! Both use the same flat encoding: `key:value:key:value...`.
//!
//! ```text
//! ROSTERS=CS160-3:/home/me/Labs/CS160/roster3.csv:CS160-4:/home/me/Labs/CS160/roster4.csv
//! COURSESECTIONS=CS160-03:CS160-3:CS160-04:CS160-4
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable listing roster files
pub const ROSTERS_ENV: &str = "ROSTERS";

/// Environment variable mapping registrar sections to course labels
pub const COURSE_SECTIONS_ENV: &str = "COURSESECTIONS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must alternate key:value pairs but has {count} fields")]
    OddFieldCount { var: &'static str, count: usize },

    #[error("{var} has an empty key at pair {pair}")]
    EmptyKey { var: &'static str, pair: usize },

    #[error("{var} is empty")]
    Empty { var: &'static str },
}

/// A configured (course label, roster file) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSource {
    pub label: String,
    pub path: PathBuf,
}

impl RosterSource {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

fn parse_pairs<'a>(
    var: &'static str,
    encoded: &'a str,
) -> Result<Vec<(&'a str, &'a str)>, ConfigError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(ConfigError::Empty { var });
    }

    let fields: Vec<&str> = encoded.split(':').collect();
    if fields.len() % 2 != 0 {
        return Err(ConfigError::OddFieldCount {
            var,
            count: fields.len(),
        });
    }

    fields
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            if pair[0].is_empty() {
                Err(ConfigError::EmptyKey { var, pair: i + 1 })
            } else {
                Ok((pair[0], pair[1]))
            }
        })
        .collect()
}

/// Decode `label:path:label:path...` into roster sources, keeping their order
///
/// # Errors
///
/// Returns `ConfigError` if the value is empty, has an odd number of fields,
/// or contains an empty label.
pub fn parse_roster_sources(encoded: &str) -> Result<Vec<RosterSource>, ConfigError> {
    Ok(parse_pairs(ROSTERS_ENV, encoded)?
        .into_iter()
        .map(|(label, path)| RosterSource::new(label, path))
        .collect())
}

/// Decode `section:courseLabel:...` into a lookup table
///
/// # Errors
///
/// Same as [`parse_roster_sources`].
pub fn parse_course_sections(encoded: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    Ok(parse_pairs(COURSE_SECTIONS_ENV, encoded)?
        .into_iter()
        .map(|(section, label)| (section.to_string(), label.to_string()))
        .collect())
}
