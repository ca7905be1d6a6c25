//! Working out which course a batch of submissions belongs to.
//!
//! Every unique user token in the batch is matched against every loaded
//! course. The answer is, in order of preference:
//!
//! 1. the only course with any matched student,
//! 2. the shared prefix when every matching course has the same prefix,
//! 3. the prefix whose sections matched strictly the most distinct students.
//!
//! A tie at step 3 has no answer.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::store::RosterCatalog;
use crate::core::course::Course;
use crate::core::types::{InferenceBasis, StudentId};
use crate::utils::archive::{self, ArchiveError};

/// A course (or course prefix) inferred for a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseInference {
    /// Course label, or course prefix when several sections matched
    pub label: String,

    pub basis: InferenceBasis,

    /// Distinct students matched under `label`
    pub matched: usize,
}

/// User tokens of submission names, lowercased, deduplicated, in first-seen order
pub fn user_tokens<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    let mut tokens = Vec::new();
    for name in names {
        let name = name.as_ref();
        let token = name.split('_').next().unwrap_or(name).to_lowercase();
        if !token.is_empty() && seen.insert(token.clone()) {
            tokens.push(token);
        }
    }
    tokens
}

/// Infers the course of a batch against a loaded catalog
pub struct CourseFinder<'a> {
    catalog: &'a RosterCatalog,
}

impl<'a> CourseFinder<'a> {
    pub fn new(catalog: &'a RosterCatalog) -> Self {
        Self { catalog }
    }

    /// Students in `course` matched by any of `tokens`
    fn matched_students(&self, course: &Course, tokens: &[String]) -> BTreeSet<StudentId> {
        tokens
            .iter()
            .filter_map(|token| course.match_by_name_token(self.catalog.registry(), token))
            .map(|student| student.id)
            .collect()
    }

    /// Infer the course for a batch of submission filenames
    pub fn infer<I, S>(&self, names: I) -> Option<CourseInference>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = user_tokens(names);

        let hits: Vec<(&Course, BTreeSet<StudentId>)> = self
            .catalog
            .courses()
            .iter()
            .map(|course| (course, self.matched_students(course, &tokens)))
            .filter(|(_, matched)| !matched.is_empty())
            .collect();

        for (course, matched) in &hits {
            debug!("{course}: {} students matched", matched.len());
        }

        match hits.as_slice() {
            [] => return None,
            [(course, matched)] => {
                return Some(CourseInference {
                    label: course.label.clone(),
                    basis: InferenceBasis::SingleSection,
                    matched: matched.len(),
                })
            }
            _ => {}
        }

        // Union the matched students of every section sharing a prefix
        let mut groups: Vec<(&str, BTreeSet<StudentId>)> = Vec::new();
        for (course, matched) in &hits {
            let prefix = course.prefix();
            match groups.iter_mut().find(|(p, _)| *p == prefix) {
                Some((_, students)) => students.extend(matched),
                None => groups.push((prefix, matched.clone())),
            }
        }

        if let [(prefix, students)] = groups.as_slice() {
            return Some(CourseInference {
                label: (*prefix).to_string(),
                basis: InferenceBasis::SharedPrefix,
                matched: students.len(),
            });
        }

        let best = groups.iter().map(|(_, s)| s.len()).max().unwrap_or(0);
        let mut leaders = groups.iter().filter(|(_, s)| s.len() == best);
        match (leaders.next(), leaders.next()) {
            (Some((prefix, students)), None) => Some(CourseInference {
                label: (*prefix).to_string(),
                basis: InferenceBasis::Plurality,
                matched: students.len(),
            }),
            _ => {
                let tied: Vec<&str> = groups
                    .iter()
                    .filter(|(_, s)| s.len() == best)
                    .map(|(p, _)| *p)
                    .collect();
                warn!(
                    "submissions match {best} students in each of {}; no course chosen",
                    tied.join(", ")
                );
                None
            }
        }
    }
}

impl RosterCatalog {
    /// Label (or prefix) of the course a batch of submission filenames belongs to
    pub fn determine_course_from_names<I, S>(&self, names: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CourseFinder::new(self).infer(names).map(|found| found.label)
    }

    /// Label (or prefix) of the course a submissions archive belongs to
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError` if the archive cannot be read.
    pub fn determine_course(&self, archive_path: &Path) -> Result<Option<String>, ArchiveError> {
        let names = archive::entry_names(archive_path)?;
        Ok(self.determine_course_from_names(&names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::course::Course;

    fn catalog(sections: &[(&str, &[(&str, &str)])]) -> RosterCatalog {
        let mut catalog = RosterCatalog::new();
        for (label, names) in sections {
            let mut course = Course::new(*label, format!("/r/{label}.csv"));
            for (first, last) in names.iter() {
                let email = format!("{}{}@example.edu", first.to_lowercase(), last.to_lowercase());
                let id = catalog
                    .registry_mut()
                    .register_or_fetch(first, last, &email, label);
                course.add_student(catalog.registry().get(id));
            }
            catalog.add_course(course);
        }
        catalog
    }

    fn sample() -> RosterCatalog {
        catalog(&[
            ("CS160-3", &[("John", "Smith"), ("Ann", "Lee")]),
            ("CS160-4", &[("Bob", "Jones"), ("Sue", "Park")]),
            ("CS261-9", &[("Loo", "Lee"), ("Max", "Ray"), ("Kim", "Fox")]),
        ])
    }

    #[test]
    fn test_user_tokens_dedup_in_order() {
        let tokens = user_tokens([
            "SmithJohn_1_2_a.py",
            "leeann_1_2_b.py",
            "smithjohn_1_3_a-2.py",
            "_1_2_c.py",
        ]);
        assert_eq!(tokens, vec!["smithjohn", "leeann"]);
    }

    #[test]
    fn test_single_section() {
        let catalog = sample();
        let found = CourseFinder::new(&catalog)
            .infer(["smithjohn_1_2_lab.py", "leeann_1_2_lab.py"])
            .unwrap();
        assert_eq!(found.label, "CS160-3");
        assert_eq!(found.basis, InferenceBasis::SingleSection);
        assert_eq!(found.matched, 2);
    }

    #[test]
    fn test_shared_prefix() {
        let catalog = sample();
        let found = CourseFinder::new(&catalog)
            .infer(["smithjohn_1_2_lab.py", "jonesbob_1_2_lab.py"])
            .unwrap();
        assert_eq!(found.label, "CS160");
        assert_eq!(found.basis, InferenceBasis::SharedPrefix);
        assert_eq!(found.matched, 2);
    }

    #[test]
    fn test_plurality() {
        let catalog = sample();
        let found = CourseFinder::new(&catalog)
            .infer([
                "leeloo_1_2_lab.py",
                "rayMax_1_2_lab.py",
                "smithjohn_1_2_lab.py",
            ])
            .unwrap();
        assert_eq!(found.label, "CS261");
        assert_eq!(found.basis, InferenceBasis::Plurality);
        assert_eq!(found.matched, 2);
    }

    #[test]
    fn test_tie_is_none() {
        let catalog = sample();
        assert_eq!(
            catalog.determine_course_from_names(["leeloo_1_2_lab.py", "smithjohn_1_2_lab.py"]),
            None
        );
    }

    #[test]
    fn test_no_match_is_none() {
        let catalog = sample();
        assert_eq!(
            catalog.determine_course_from_names(["nobody_1_2_lab.py", "readme.txt"]),
            None
        );
        assert_eq!(catalog.determine_course_from_names(Vec::<String>::new()), None);
    }

    #[test]
    fn test_determine_course_from_archive() {
        use std::io::Write;
        use zip::write::FileOptions;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submissions.zip");
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        for name in ["jonesbob_1_2_lab.py", "__MACOSX/._parksue_1_2_lab.py", "parksue_1_2_lab.py"] {
            zip.start_file(name, FileOptions::default()).unwrap();
            zip.write_all(b"print(1)").unwrap();
        }
        zip.finish().unwrap();

        let catalog = sample();
        assert_eq!(
            catalog.determine_course(&path).unwrap(),
            Some("CS160-4".to_string())
        );
    }
}
