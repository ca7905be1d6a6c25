//! Command-line behaviour of the `roster-match` binary.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use zip::write::FileOptions;
use zip::ZipWriter;

const ROSTER: &str = "lastName,firstName,middleName,primaryEmail,identifier,note\n\
    Smith,John,,jsmith@example.edu,1,\n\
    Lee,Ann,,alee@example.edu,2,\n";

const EXPORT: &str = "Student Name,Preferred Email,Student ID,Class Level\n\
    John Smith,jsmith@example.edu,1,Junior\n\
    Ann Marie Lee III,alee@example.edu,2,Senior\n";

struct Fixture {
    dir: tempfile::TempDir,
    rosters: String,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let roster = dir.path().join("cs160-3.csv");
        std::fs::write(&roster, ROSTER).unwrap();
        let rosters = format!("CS160-3:{}", roster.display());
        Self { dir, rosters }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn archive(&self, entries: &[(&str, &str)]) -> PathBuf {
        let path = self.path().join("submissions.zip");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        for (name, body) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("roster-match").unwrap();
        cmd.env("ROSTERS", &self.rosters)
            .env("HOME", self.path())
            .env_remove("COURSESECTIONS");
        cmd
    }
}

#[test]
fn test_identify_prints_course() {
    let fx = Fixture::new();
    let archive = fx.archive(&[
        ("smithjohn_1_2_lab.py", "a"),
        ("leeann_1_2_lab.py", "b"),
    ]);

    fx.cmd()
        .arg("identify")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("CS160-3"))
        .stdout(predicate::str::contains("2 students matched"));
}

#[test]
fn test_identify_json_without_match() {
    let fx = Fixture::new();
    let archive = fx.archive(&[("jonesbob_1_2_lab.py", "a")]);

    fx.cmd()
        .args(["--format", "json", "identify"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"course\": null"));
}

#[test]
fn test_submissions_moves_files() {
    let fx = Fixture::new();
    let archive = fx.archive(&[
        ("smithjohn_1_2_lab.py", "first"),
        ("smithjohn_1_3_lab-2.py", "second"),
        ("leeann_LATE_1_2_lab.py", "late"),
    ]);
    let labs = fx.path().join("Labs");

    fx.cmd()
        .arg("submissions")
        .arg("--archive")
        .arg(&archive)
        .arg("--labs-root")
        .arg(&labs)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 files for 2 students"));

    let grade = labs.join("CS160").join("Grade");
    assert_eq!(
        std::fs::read_to_string(grade.join("jsmith@example.edu").join("lab.py")).unwrap(),
        "second"
    );
    assert!(grade.join("alee@example.edu").join("lab.py").is_file());
    assert!(!archive.exists());
    assert!(!fx.path().join("submissions").exists());
}

#[test]
fn test_submissions_dry_run_touches_nothing() {
    let fx = Fixture::new();
    let archive = fx.archive(&[("smithjohn_1_2_lab.py", "a"), ("stray.txt", "?")]);
    let labs = fx.path().join("Labs");

    fx.cmd()
        .args(["submissions", "CS160-3", "--dry-run", "--keep"])
        .arg("--archive")
        .arg(&archive)
        .arg("--labs-root")
        .arg(&labs)
        .assert()
        .success()
        .stdout(predicate::str::contains("jsmith@example.edu"))
        .stdout(predicate::str::contains("stray.txt"));

    assert!(archive.exists());
    assert!(!labs.exists());
}

#[test]
fn test_submissions_unknown_course() {
    let fx = Fixture::new();
    let archive = fx.archive(&[("smithjohn_1_2_lab.py", "a")]);

    fx.cmd()
        .args(["submissions", "CS999", "--keep"])
        .arg("--archive")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CS999"));
}

#[test]
fn test_roster_find_and_show() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["roster", "find", "Ann Lee (she/her)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alee@example.edu"));

    fx.cmd()
        .args(["--format", "tsv", "roster", "show", "CS160"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Smith\tJohn\tjsmith@example.edu"));
}

#[test]
fn test_malformed_rosters_variable() {
    let fx = Fixture::new();

    fx.cmd()
        .env("ROSTERS", "CS160-3")
        .args(["roster", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid roster configuration"));
}

#[test]
fn test_convert_export_to_output() {
    let fx = Fixture::new();
    let export = fx.path().join("section-rosters CS-160-03.csv");
    std::fs::write(&export, EXPORT).unwrap();
    let output = fx.path().join("roster.csv");

    fx.cmd()
        .args(["convert", "--layout", "roster", "--keep", "--output"])
        .arg(&output)
        .arg(&export)
        .assert()
        .success();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("lastName,firstName,middleName,primaryEmail,identifier,note"));
    assert!(text.contains("Smith,John,,jsmith@example.edu,1,Junior"));
    assert!(text.contains("Lee,Ann,Marie,alee@example.edu,2,Senior"));
    assert!(export.exists());
}

#[test]
fn test_convert_into_configured_roster() {
    let fx = Fixture::new();
    let export = fx.path().join("section-rosters CS-160-03.csv");
    std::fs::write(&export, EXPORT).unwrap();

    fx.cmd()
        .arg("convert")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("CS160-3"));

    let ga = std::fs::read_to_string(fx.path().join("ga.csv")).unwrap();
    assert!(ga.starts_with("Last,First,Middle,Email,ID,Note"));
    let roster = std::fs::read_to_string(fx.path().join("cs160-3.csv")).unwrap();
    assert!(roster.contains("Lee,Ann,Marie,alee@example.edu,2,Senior"));
    assert!(!export.exists());
}

#[test]
fn test_prune_early_removes_shared_directories() {
    let fx = Fixture::new();
    let grade = fx.path().join("Grade");
    let early = fx.path().join("Early");
    for dir in [
        grade.join("alee@example.edu"),
        grade.join("jsmith@example.edu"),
        early.join("alee@example.edu"),
    ] {
        std::fs::create_dir_all(&dir).unwrap();
    }

    fx.cmd()
        .arg("prune-early")
        .arg("--early")
        .arg(&early)
        .arg("--directory")
        .arg(&grade)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 directories"))
        .stdout(predicate::str::contains("alee@example.edu"));

    assert!(!grade.join("alee@example.edu").exists());
    assert!(grade.join("jsmith@example.edu").is_dir());
    assert!(early.join("alee@example.edu").is_dir());
}

#[test]
fn test_prune_early_defaults_to_current_directory() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.path().join("Grade/alee@example.edu")).unwrap();
    std::fs::create_dir_all(fx.path().join("Early/alee@example.edu")).unwrap();

    fx.cmd()
        .current_dir(fx.path())
        .args(["prune-early", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grade/alee@example.edu"));

    assert!(!fx.path().join("Grade/alee@example.edu").exists());
}
