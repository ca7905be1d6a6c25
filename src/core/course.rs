use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::catalog::registry::StudentRegistry;
use crate::core::student::Student;
use crate::core::types::{course_prefix, grade_prefix, StudentId, MERGED_LABEL_SEPARATOR};
use crate::matching::submission::{MatchError, SubmissionMatch, SubmissionMatcher};

/// A course section loaded from one roster file
#[derive(Debug, Clone, Serialize)]
pub struct Course {
    /// Course-with-section label, e.g. `CS261-9`
    pub label: String,

    /// Roster file this course was loaded from
    pub roster_path: PathBuf,

    /// Enrolled students in roster order
    students: Vec<StudentId>,

    /// Index: lowercased last name -> students with that last name
    #[serde(skip)]
    by_last_name: HashMap<String, Vec<StudentId>>,
}

impl Course {
    pub fn new(label: impl Into<String>, roster_path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            roster_path: roster_path.into(),
            students: Vec::new(),
            by_last_name: HashMap::new(),
        }
    }

    /// Enroll a student. Enrolling the same student twice keeps both entries.
    pub fn add_student(&mut self, student: &Student) {
        self.students.push(student.id);
        self.by_last_name
            .entry(student.last_name.to_lowercase())
            .or_default()
            .push(student.id);
    }

    /// Append every student of `other` and extend the label with `other`'s label
    pub(crate) fn absorb(&mut self, other: &Course, registry: &StudentRegistry) {
        self.label.push_str(MERGED_LABEL_SEPARATOR);
        self.label.push_str(&other.label);
        for &id in &other.students {
            self.add_student(registry.get(id));
        }
    }

    pub fn student_ids(&self) -> &[StudentId] {
        &self.students
    }

    pub fn students<'r>(
        &'r self,
        registry: &'r StudentRegistry,
    ) -> impl Iterator<Item = &'r Student> + 'r {
        self.students.iter().map(move |&id| registry.get(id))
    }

    /// Students whose last name matches, ignoring case
    pub fn students_with_last_name(&self, last_name: &str) -> &[StudentId] {
        self.by_last_name
            .get(&last_name.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Course prefix of this course's label; for a merged course, of its first section
    pub fn prefix(&self) -> &str {
        course_prefix(self.first_section())
    }

    /// Name of this course's directory under the labs root
    pub fn grade_prefix(&self) -> &str {
        grade_prefix(self.first_section())
    }

    fn first_section(&self) -> &str {
        self.label
            .split(MERGED_LABEL_SEPARATOR)
            .next()
            .unwrap_or(&self.label)
    }

    /// Directory holding the roster file
    pub fn roster_directory(&self) -> &Path {
        self.roster_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Find the first enrolled student whose "lastfirst" concatenation prefixes `token`.
    ///
    /// Students are tried in roster order and the first hit wins, so when two
    /// students both fit (`lee` and `leeson`, say) the one enrolled first is
    /// returned regardless of which match is longer.
    pub fn match_by_name_token<'r>(
        &self,
        registry: &'r StudentRegistry,
        token: &str,
    ) -> Option<&'r Student> {
        let token = token.to_lowercase();
        self.students
            .iter()
            .map(|&id| registry.get(id))
            .find(|student| student.matches_name_token(&token))
    }

    /// Resolve a raw submission filename to a student and canonical filename
    ///
    /// # Errors
    ///
    /// Returns `MatchError` when the filename is malformed or names nobody
    /// enrolled in this course.
    pub fn find_submission_match<'r>(
        &'r self,
        registry: &'r StudentRegistry,
        raw_filename: &str,
    ) -> Result<SubmissionMatch<'r>, MatchError> {
        SubmissionMatcher::new(registry, self).find_submission_match(raw_filename)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

impl std::fmt::Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
