//! Matching submission files to students.
//!
//! This module provides:
//!
//! - [`SubmissionMatcher`]: resolves LMS submission filenames against one course
//! - [`batch`]: turns a directory of extracted submissions into file moves
//!
//! ## Filename Convention
//!
//! LMS exports name each file
//! `<userToken>_<id>_<id>_<original name>`, where the user token is the
//! student's last name followed by their first name, lowercased and without
//! separators. Resubmissions get a `-N` counter before the extension.
//!
//! | Submitted file | Student token | Canonical filename |
//! |----------------|---------------|--------------------|
//! | `smithjohn_123_456_essay.docx` | `smithjohn` | `essay.docx` |
//! | `smithjohn_123_789_essay-2.docx` | `smithjohn` | `essay.docx` |
//! | `leeloo_LATE_1_2_lab.py` | `leeloo` | `lab.py` (after late-marker cleanup) |
//!
//! ## Example
//!
//! ```rust,no_run
//! use roster_match::{RosterCatalog, SubmissionMatcher};
//! use roster_match::parsing::config::RosterSource;
//!
//! let mut catalog = RosterCatalog::new();
//! catalog
//!     .load_rosters(&[RosterSource::new("CS160-3", "rosters/cs160-3.csv")])
//!     .unwrap();
//!
//! let course = catalog.course_with_name("CS160-3").unwrap();
//! let matcher = SubmissionMatcher::new(catalog.registry(), course);
//! match matcher.find_submission_match("smithjohn_123_456_essay-2.docx") {
//!     Ok(m) => println!("{} -> {}", m.student.email, m.canonical_filename),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod batch;
pub mod submission;

pub use submission::{MatchError, SubmissionMatch, SubmissionMatcher};
