use serde::Serialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::registry::StudentRegistry;
use crate::core::course::Course;
use crate::core::student::Student;
use crate::parsing::config::RosterSource;
use crate::parsing::roster::{parse_roster_file, RosterError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to load roster for {label} from {}: {source}", path.display())]
    Roster {
        label: String,
        path: PathBuf,
        #[source]
        source: RosterError,
    },
}

/// Serializable overview of a loaded catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub generated_at: String,
    pub student_count: usize,
    pub courses: Vec<CourseSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseSummary {
    pub label: String,
    pub roster_path: PathBuf,
    pub student_count: usize,
}

/// Every loaded course plus the registry of their students
#[derive(Debug, Default, Clone)]
pub struct RosterCatalog {
    /// Courses in load order
    courses: Vec<Course>,

    registry: StudentRegistry,
}

impl RosterCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every configured roster in order, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the `CatalogError` of the first roster that cannot be loaded.
    pub fn load_rosters(&mut self, sources: &[RosterSource]) -> Result<(), CatalogError> {
        for source in sources {
            self.load_from_csv(&source.label, &source.path)?;
        }
        info!(
            "loaded {} courses with {} students",
            self.courses.len(),
            self.registry.len()
        );
        Ok(())
    }

    /// Load one roster file as the course `label`.
    ///
    /// The whole file is parsed before any student is registered, so a bad
    /// file leaves the catalog untouched.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Roster` if the file is missing, its header lacks
    /// a required column, or a row is too short.
    pub fn load_from_csv(&mut self, label: &str, path: &Path) -> Result<&Course, CatalogError> {
        let rows = parse_roster_file(path).map_err(|source| CatalogError::Roster {
            label: label.to_string(),
            path: path.to_path_buf(),
            source,
        })?;

        if self.course_with_name(label).is_some() {
            warn!("course {label} is configured more than once; lookups use the first");
        }

        let mut course = Course::new(label, path);
        for row in &rows {
            let id =
                self.registry
                    .register_or_fetch(&row.first_name, &row.last_name, &row.email, label);
            course.add_student(self.registry.get(id));
        }

        info!(
            "loaded {label}: {} students from {}",
            course.len(),
            path.display()
        );
        self.courses.push(course);
        Ok(&self.courses[self.courses.len() - 1])
    }

    /// Add an already-built course
    pub fn add_course(&mut self, course: Course) {
        self.courses.push(course);
    }

    pub fn registry(&self) -> &StudentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StudentRegistry {
        &mut self.registry
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Get a course by exact label
    pub fn course_with_name(&self, label: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.label == label)
    }

    /// Combine every course whose label starts with `prefix`.
    ///
    /// One match yields an independent copy of that course. Several yield a
    /// new course labelled `"A + B"` whose students are all of A's followed by
    /// all of B's; a student in both sections appears twice.
    pub fn merged_course(&self, prefix: &str) -> Option<Course> {
        let mut matching = self.courses.iter().filter(|c| c.label.starts_with(prefix));
        let mut merged = matching.next()?.clone();
        for course in matching {
            merged.absorb(course, &self.registry);
        }
        Some(merged)
    }

    /// Exact label if loaded, otherwise the merge of all sections with that prefix
    pub fn resolve_course(&self, name: &str) -> Option<Cow<'_, Course>> {
        self.course_with_name(name)
            .map(Cow::Borrowed)
            .or_else(|| self.merged_course(name).map(Cow::Owned))
    }

    /// The student's first course label that starts with `prefix`
    pub fn course_with_section_for_student<'s>(
        &self,
        prefix: &str,
        student: &'s Student,
    ) -> Option<&'s str> {
        student
            .courses
            .iter()
            .map(String::as_str)
            .find(|label| label.starts_with(prefix))
    }

    pub fn find_student_by_email(&self, email: &str) -> Option<&Student> {
        self.registry.find_by_email(email)
    }

    pub fn find_student_by_name(&self, display_name: &str) -> Option<&Student> {
        self.registry.find_by_name(display_name)
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            generated_at: chrono::Utc::now().to_rfc3339(),
            student_count: self.registry.len(),
            courses: self
                .courses
                .iter()
                .map(|c| CourseSummary {
                    label: c.label.clone(),
                    roster_path: c.roster_path.clone(),
                    student_count: c.len(),
                })
                .collect(),
        }
    }

    /// Export the catalog summary as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.summary())
    }

    /// Number of courses in catalog
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
