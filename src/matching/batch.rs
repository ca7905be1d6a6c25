//! Relocating an extracted batch of submissions into per-student directories.
//!
//! Each matched file goes to `<grade_dir>/<student email>/<canonical filename>`.
//! When several files land on the same destination (resubmissions), they are
//! moved in increasing revision order so the newest submission is kept.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::course::Course;
use crate::matching::submission::SubmissionMatcher;
use crate::utils::validation::validate_path_component;

/// Marker some LMS exports insert into late submission names
pub const LATE_MARKER: &str = "_LATE_";

/// Directory name for a course's graded submissions under its labs directory
pub const GRADE_DIR_NAME: &str = "Grade";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BatchError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io { path, source }
    }
}

/// Replace the late-submission marker with a plain underscore
///
/// ```
/// use roster_match::matching::batch::normalize_late_marker;
///
/// assert_eq!(normalize_late_marker("smithjohn_LATE_1_2_lab.py"), "smithjohn_1_2_lab.py");
/// ```
pub fn normalize_late_marker(name: &str) -> Cow<'_, str> {
    if name.contains(LATE_MARKER) {
        Cow::Owned(name.replace(LATE_MARKER, "_"))
    } else {
        Cow::Borrowed(name)
    }
}

/// `<labs_root>/<label up to its first dash>/Grade`
pub fn grade_directory(labs_root: &Path, course: &Course) -> PathBuf {
    labs_root.join(course.grade_prefix()).join(GRADE_DIR_NAME)
}

/// Regular files directly inside `dir`, sorted by name
///
/// # Errors
///
/// Returns `BatchError::Io` if the directory cannot be read.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(BatchError::io(dir))? {
        let entry = entry.map_err(BatchError::io(dir))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// One file relocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub email: String,
    pub revision: u32,
}

/// What to do with every file in an extracted batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct MovePlan {
    /// Moves ordered by destination, then revision
    pub moves: Vec<PlannedMove>,

    /// Files whose names matched no enrolled student
    pub unmatched: Vec<PathBuf>,

    /// Files that matched but whose destination would not be a plain path
    pub rejected: Vec<(PathBuf, String)>,
}

impl MovePlan {
    /// Number of distinct students receiving files
    pub fn student_count(&self) -> usize {
        let mut emails: Vec<&str> = self.moves.iter().map(|m| m.email.as_str()).collect();
        emails.sort_unstable();
        emails.dedup();
        emails.len()
    }
}

/// Match every file in `source_dir` and decide where it goes
///
/// # Errors
///
/// Returns `BatchError::Io` if `source_dir` cannot be listed. Unmatched or
/// unsafe files are recorded in the plan, not returned as errors.
pub fn plan_moves(
    matcher: &SubmissionMatcher<'_>,
    source_dir: &Path,
    grade_dir: &Path,
) -> Result<MovePlan, BatchError> {
    Ok(plan_files(matcher, list_files(source_dir)?, grade_dir))
}

/// Decide where each of `files` goes; the files need not exist yet
pub fn plan_files<I>(matcher: &SubmissionMatcher<'_>, files: I, grade_dir: &Path) -> MovePlan
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut plan = MovePlan::default();

    for source in files {
        let Some(raw) = source
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
        else {
            warn!("skipping non UTF-8 filename {}", source.display());
            plan.unmatched.push(source);
            continue;
        };
        let name = normalize_late_marker(&raw);

        let found = match matcher.find_submission_match(&name) {
            Ok(found) => found,
            Err(_) => {
                plan.unmatched.push(source);
                continue;
            }
        };

        let destination = validate_path_component(&found.student.email)
            .and_then(|email| {
                validate_path_component(&found.canonical_filename)
                    .map(|file| grade_dir.join(email).join(file))
            });

        match destination {
            Ok(destination) => plan.moves.push(PlannedMove {
                source,
                destination,
                email: found.student.email.clone(),
                revision: found.revision,
            }),
            Err(e) => {
                warn!("not moving {raw}: {e}");
                plan.rejected.push((source, e.to_string()));
            }
        }
    }

    plan.moves
        .sort_by(|a, b| (&a.destination, a.revision).cmp(&(&b.destination, b.revision)));
    plan
}

/// Empty `dir`, creating it if needed
///
/// # Errors
///
/// Returns `BatchError::Io` if the directory cannot be removed or created.
pub fn reset_directory(dir: &Path) -> Result<(), BatchError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(BatchError::io(dir))?;
    }
    std::fs::create_dir_all(dir).map_err(BatchError::io(dir))
}

/// Remove `dir` if it is empty, returning whether it was removed
///
/// # Errors
///
/// Returns `BatchError::Io` if the directory cannot be listed or removed.
pub fn remove_if_empty(dir: &Path) -> Result<bool, BatchError> {
    let mut entries = std::fs::read_dir(dir).map_err(BatchError::io(dir))?;
    if entries.next().is_some() {
        return Ok(false);
    }
    std::fs::remove_dir(dir).map_err(BatchError::io(dir))?;
    Ok(true)
}

fn subdirectory_names(dir: &Path) -> Result<Vec<std::ffi::OsString>, BatchError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(BatchError::io(dir))? {
        let entry = entry.map_err(BatchError::io(dir))?;
        if entry.path().is_dir() {
            names.push(entry.file_name());
        }
    }
    Ok(names)
}

/// Delete every student directory in `grade_dir` that also exists in `early_dir`.
///
/// Work already graded from an early batch is dropped from the regular one.
/// Returns the removed directories, sorted.
///
/// # Errors
///
/// Returns `BatchError::Io` if either directory cannot be listed or a
/// matching directory cannot be removed.
pub fn remove_early(grade_dir: &Path, early_dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let early = subdirectory_names(early_dir)?;
    let mut removed: Vec<PathBuf> = subdirectory_names(grade_dir)?
        .into_iter()
        .filter(|name| early.contains(name))
        .map(|name| grade_dir.join(name))
        .collect();
    removed.sort();

    for dir in &removed {
        std::fs::remove_dir_all(dir).map_err(BatchError::io(dir))?;
        debug!("removed {}", dir.display());
    }
    info!(
        "removed {} directories from {} already in {}",
        removed.len(),
        grade_dir.display(),
        early_dir.display()
    );
    Ok(removed)
}

fn move_file(source: &Path, destination: &Path) -> Result<(), BatchError> {
    if std::fs::rename(source, destination).is_ok() {
        return Ok(());
    }
    // rename fails across filesystems
    std::fs::copy(source, destination).map_err(BatchError::io(destination))?;
    std::fs::remove_file(source).map_err(BatchError::io(source))
}

/// Carry out a plan, returning the number of files moved.
///
/// Later moves to the same destination overwrite earlier ones.
///
/// # Errors
///
/// Returns `BatchError::Io` on the first directory or file that cannot be
/// created or moved.
pub fn apply(plan: &MovePlan) -> Result<usize, BatchError> {
    for planned in &plan.moves {
        if let Some(parent) = planned.destination.parent() {
            std::fs::create_dir_all(parent).map_err(BatchError::io(parent))?;
        }
        move_file(&planned.source, &planned.destination)?;
        debug!(
            "moved {} -> {}",
            planned.source.display(),
            planned.destination.display()
        );
    }
    info!(
        "moved {} files for {} students",
        plan.moves.len(),
        plan.student_count()
    );
    Ok(plan.moves.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::registry::StudentRegistry;

    fn setup() -> (StudentRegistry, Course) {
        let mut registry = StudentRegistry::new();
        let mut course = Course::new("CS160-3", "/r/cs160-3.csv");
        for (first, last, email) in [
            ("John", "Smith", "jsmith@example.edu"),
            ("Ann", "Lee", "alee@example.edu"),
            ("Evil", "Hacker", "../escape"),
        ] {
            let id = registry.register_or_fetch(first, last, email, "CS160-3");
            course.add_student(registry.get(id));
        }
        (registry, course)
    }

    fn touch(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_grade_directory() {
        let course = Course::new("CS160-3", "/r/a.csv");
        assert_eq!(
            grade_directory(Path::new("/home/me/Labs"), &course),
            PathBuf::from("/home/me/Labs/CS160/Grade")
        );

        let merged = Course::new("CS261-9 + CS261-10", "/r/b.csv");
        assert_eq!(
            grade_directory(Path::new("/labs"), &merged),
            PathBuf::from("/labs/CS261/Grade")
        );

        let dashed = Course::new("MATH-150-2", "/r/c.csv");
        assert_eq!(dashed.prefix(), "MATH-150");
        assert_eq!(
            grade_directory(Path::new("/labs"), &dashed),
            PathBuf::from("/labs/MATH/Grade")
        );
    }

    #[test]
    fn test_plan_and_apply() {
        let (registry, course) = setup();
        let matcher = SubmissionMatcher::new(&registry, &course);
        let source = tempfile::tempdir().unwrap();
        let grade = tempfile::tempdir().unwrap();

        touch(source.path(), "smithjohn_1_2_essay.docx", "first");
        touch(source.path(), "smithjohn_1_3_essay-2.docx", "second");
        touch(source.path(), "leeann_LATE_1_2_lab.py", "late");
        touch(source.path(), "hackerevil_1_2_lab.py", "x");
        touch(source.path(), "readme.txt", "?");

        let plan = plan_moves(&matcher, source.path(), grade.path()).unwrap();
        assert_eq!(plan.moves.len(), 3);
        assert_eq!(plan.student_count(), 2);
        assert_eq!(plan.unmatched, vec![source.path().join("readme.txt")]);
        assert_eq!(plan.rejected.len(), 1);

        let moved = apply(&plan).unwrap();
        assert_eq!(moved, 3);

        let essay = grade.path().join("jsmith@example.edu").join("essay.docx");
        assert_eq!(std::fs::read_to_string(essay).unwrap(), "second");
        assert!(grade
            .path()
            .join("alee@example.edu")
            .join("lab.py")
            .is_file());

        let left = list_files(source.path()).unwrap();
        assert_eq!(left.len(), 2);
        assert!(!remove_if_empty(source.path()).unwrap());
    }

    #[test]
    fn test_plan_files_without_disk() {
        let (registry, course) = setup();
        let matcher = SubmissionMatcher::new(&registry, &course);
        let plan = plan_files(
            &matcher,
            [
                PathBuf::from("x/leeann_1_2_lab-2.py"),
                PathBuf::from("x/leeann_1_2_lab.py"),
            ],
            Path::new("/grade"),
        );
        assert_eq!(plan.moves.len(), 2);
        assert_eq!(plan.moves[0].revision, 0);
        assert_eq!(plan.moves[1].revision, 2);
        assert_eq!(
            plan.moves[1].destination,
            PathBuf::from("/grade/alee@example.edu/lab.py")
        );
    }

    #[test]
    fn test_reset_and_remove_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("Grade");
        std::fs::create_dir_all(dir.join("old@example.edu")).unwrap();
        touch(&dir, "stale.txt", "x");

        reset_directory(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

        assert!(remove_if_empty(&dir).unwrap());
        assert!(!dir.exists());
    }

    #[test]
    fn test_remove_early_keeps_regular_only_students() {
        let root = tempfile::tempdir().unwrap();
        let grade = root.path().join("Grade");
        let early = root.path().join("Early");
        for dir in [
            grade.join("alee@example.edu"),
            grade.join("jsmith@example.edu"),
            early.join("alee@example.edu"),
            early.join("gone@example.edu"),
        ] {
            std::fs::create_dir_all(&dir).unwrap();
        }
        touch(&grade.join("alee@example.edu"), "lab.py", "late");
        // plain files in Early are not student directories
        touch(&early, "jsmith@example.edu", "");

        let removed = remove_early(&grade, &early).unwrap();
        assert_eq!(removed, vec![grade.join("alee@example.edu")]);
        assert!(!grade.join("alee@example.edu").exists());
        assert!(grade.join("jsmith@example.edu").is_dir());
        assert!(early.join("alee@example.edu").is_dir());
    }

    #[test]
    fn test_remove_early_missing_directory_is_error() {
        let root = tempfile::tempdir().unwrap();
        let err = remove_early(&root.path().join("Grade"), root.path()).unwrap_err();
        assert!(err.to_string().contains("Grade"));
    }
}
