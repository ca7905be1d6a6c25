use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::registry::StudentRegistry;
use crate::core::course::Course;
use crate::core::student::Student;

/// Why a submission filename could not be matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    /// Fewer than two underscores, so no user token / remainder split
    MalformedName,
    /// Well-formed, but the user token names nobody in the course
    NoStudent { user_token: String },
}

impl std::fmt::Display for MissReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedName => write!(f, "not an LMS submission name"),
            Self::NoStudent { user_token } => write!(f, "no student matches '{user_token}'"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("couldn't match {filename}: {reason}")]
    NotFound { filename: String, reason: MissReason },
}

/// The parts of an LMS submission filename
///
/// `<userToken>_<id>_<id>_<remainder>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionName<'a> {
    /// Text before the first underscore, normally "lastfirst"
    pub user_token: &'a str,
    /// Text after the third underscore; the whole name when there is no third underscore
    pub remainder: &'a str,
}

impl<'a> SubmissionName<'a> {
    /// Split a raw filename; `None` when it has fewer than two underscores
    pub fn parse(raw: &'a str) -> Option<Self> {
        let mut underscores = raw.match_indices('_').map(|(i, _)| i);
        let first = underscores.next()?;
        underscores.next()?;
        let remainder = underscores.next().map_or(raw, |third| &raw[third + 1..]);

        Some(Self {
            user_token: &raw[..first],
            remainder,
        })
    }

    /// Remainder with any resubmission suffix removed
    pub fn canonical_filename(&self) -> Cow<'a, str> {
        strip_resubmission_suffix(self.remainder)
    }
}

fn resubmission_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| {
        Regex::new(r"^(.+?)-([0-9]+)(\.[^.]*)?$").expect("resubmission suffix pattern is valid")
    })
}

/// Remove a `-<digits>` resubmission counter placed just before the extension.
///
/// ```
/// use roster_match::matching::submission::strip_resubmission_suffix;
///
/// assert_eq!(strip_resubmission_suffix("essay-2.docx"), "essay.docx");
/// assert_eq!(strip_resubmission_suffix("essay.docx"), "essay.docx");
/// assert_eq!(strip_resubmission_suffix("lab-1-3.py"), "lab-1.py");
/// ```
pub fn strip_resubmission_suffix(name: &str) -> Cow<'_, str> {
    match resubmission_suffix().captures(name) {
        Some(caps) => {
            let stem = caps.get(1).map_or("", |m| m.as_str());
            let ext = caps.get(3).map_or("", |m| m.as_str());
            Cow::Owned(format!("{stem}{ext}"))
        }
        None => Cow::Borrowed(name),
    }
}

/// The resubmission counter of a name, 0 for a first submission.
///
/// ```
/// use roster_match::matching::submission::resubmission_number;
///
/// assert_eq!(resubmission_number("essay-2.docx"), 2);
/// assert_eq!(resubmission_number("essay.docx"), 0);
/// ```
pub fn resubmission_number(name: &str) -> u32 {
    resubmission_suffix()
        .captures(name)
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// A submission file resolved to a student
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionMatch<'a> {
    pub student: &'a Student,

    /// Lowercased user token that identified the student
    pub user_token: String,

    /// Destination filename with resubmission suffixes removed
    pub canonical_filename: String,

    /// Resubmission counter stripped from the filename, 0 if none
    pub revision: u32,
}

/// Outcome of matching a batch of filenames
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome<'a> {
    /// (raw filename, match) in input order
    pub matched: Vec<(String, SubmissionMatch<'a>)>,

    /// Filenames that matched nobody, in input order
    pub unmatched: Vec<String>,
}

/// Matches submission filenames against one course
pub struct SubmissionMatcher<'a> {
    registry: &'a StudentRegistry,
    course: &'a Course,
}

impl<'a> SubmissionMatcher<'a> {
    pub fn new(registry: &'a StudentRegistry, course: &'a Course) -> Self {
        Self { registry, course }
    }

    pub fn course(&self) -> &'a Course {
        self.course
    }

    pub fn registry(&self) -> &'a StudentRegistry {
        self.registry
    }

    /// Resolve one raw filename to a student and canonical filename
    ///
    /// # Errors
    ///
    /// Returns `MatchError::NotFound` when the name has fewer than two
    /// underscores or its user token matches nobody in the course. Failures
    /// are logged; they never panic.
    pub fn find_submission_match(&self, raw_filename: &str) -> Result<SubmissionMatch<'a>, MatchError> {
        let not_found = |reason: MissReason| {
            warn!("couldn't match {raw_filename}: {reason}");
            MatchError::NotFound {
                filename: raw_filename.to_string(),
                reason,
            }
        };

        let Some(name) = SubmissionName::parse(raw_filename) else {
            return Err(not_found(MissReason::MalformedName));
        };

        let user_token = name.user_token.to_lowercase();
        match self.course.match_by_name_token(self.registry, &user_token) {
            Some(student) => {
                let canonical_filename = name.canonical_filename().into_owned();
                debug!("{raw_filename} -> {}/{canonical_filename}", student.email);
                Ok(SubmissionMatch {
                    student,
                    user_token,
                    canonical_filename,
                    revision: resubmission_number(name.remainder),
                })
            }
            None => Err(not_found(MissReason::NoStudent { user_token })),
        }
    }

    /// Match every filename; one bad file never stops the batch
    pub fn match_all<I, S>(&self, filenames: I) -> BatchOutcome<'a>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcome = BatchOutcome::default();
        for raw in filenames {
            let raw = raw.as_ref();
            match self.find_submission_match(raw) {
                Ok(found) => outcome.matched.push((raw.to_string(), found)),
                Err(_) => outcome.unmatched.push(raw.to_string()),
            }
        }
        outcome
    }
}
