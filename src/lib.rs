//! # roster-match
//!
//! A library for sorting LMS submission downloads by student.
//!
//! Instructors download every submission for an assignment as one archive. Each
//! file is named after the student's user token (last name followed by first
//! name) and carries resubmission counters and late markers. `roster-match`
//! loads the course rosters, works out which course the archive belongs to and
//! maps each file to the student who submitted it.
//!
//! ## Features
//!
//! - **Roster loading**: CSV rosters with flexible header names
//! - **Shared students**: one record per student across every section
//! - **Section merging**: sections with a common prefix act as one course
//! - **Course inference**: picks the course from submission filenames alone
//! - **Canonical filenames**: strips resubmission counters and late markers
//!
//! ## Example
//!
//! ```rust,no_run
//! use roster_match::RosterCatalog;
//! use roster_match::parsing::config::parse_roster_sources;
//!
//! let sources = parse_roster_sources("CS160-3:/home/me/Labs/CS160/roster3.csv").unwrap();
//! let mut catalog = RosterCatalog::new();
//! catalog.load_rosters(&sources).unwrap();
//!
//! let names = ["smithjohn_123_456_essay-2.docx", "leeann_123_457_essay.docx"];
//! if let Some(label) = catalog.determine_course_from_names(names) {
//!     let course = catalog.resolve_course(&label).unwrap();
//!     for name in names {
//!         if let Ok(m) = course.find_submission_match(catalog.registry(), name) {
//!             println!("{} -> {}/{}", name, m.student.email, m.canonical_filename);
//!         }
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Student registry, roster catalog and course inference
//! - [`core`]: Core data types for students and courses
//! - [`matching`]: Submission filename matching and batch relocation
//! - [`parsing`]: Parsers for rosters, configuration and registrar exports
//! - [`utils`]: Archive access and path validation
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::inference::{CourseFinder, CourseInference};
pub use catalog::registry::StudentRegistry;
pub use catalog::store::{CatalogError, RosterCatalog};
pub use core::course::Course;
pub use core::student::Student;
pub use core::types::*;
pub use matching::submission::{MatchError, SubmissionMatch, SubmissionMatcher};
