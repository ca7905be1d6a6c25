//! Conversion of registrar ("myCap") section exports into roster CSV files.
//!
//! The registrar export carries one display name per student. Conversion
//! splits it into first / middle / last and writes the columns the roster
//! loader understands, in one of two layouts:
//!
//! | Layout | Header |
//! |--------|--------|
//! | Roster | `lastName,firstName,middleName,primaryEmail,identifier,note` |
//! | Grade assistant | `Last,First,Middle,Email,ID,Note` |

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::core::name::NameParts;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row} has a blank student name")]
    BlankName { row: usize },
}

/// Output layout for converted rosters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RosterLayout {
    /// Layout read by the submission tools
    #[default]
    Roster,
    /// Layout imported by the grade assistant
    Ga,
}

impl RosterLayout {
    pub fn header(self) -> [&'static str; 6] {
        match self {
            Self::Roster => [
                "lastName",
                "firstName",
                "middleName",
                "primaryEmail",
                "identifier",
                "note",
            ],
            Self::Ga => ["Last", "First", "Middle", "Email", "ID", "Note"],
        }
    }

    /// Conventional output filename
    pub fn default_filename(self) -> &'static str {
        match self {
            Self::Roster => "roster.csv",
            Self::Ga => "ga.csv",
        }
    }

    /// Where a converted export for the course rostered at `roster_path` goes.
    ///
    /// A roster layout replaces the configured roster itself; the grade-assistant
    /// file sits beside it. Math sections get `math-` prefixed files so they do
    /// not clobber the CS roster of a cross-listed course.
    pub fn output_path(self, roster_path: &Path, math: bool) -> PathBuf {
        let dir = roster_path.parent().unwrap_or_else(|| Path::new(""));
        match (self, math) {
            (Self::Roster, false) => roster_path.to_path_buf(),
            (_, false) => dir.join(self.default_filename()),
            (_, true) => dir.join(format!("math-{}", self.default_filename())),
        }
    }
}

/// One row of a registrar export
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRecord {
    #[serde(rename = "Student Name")]
    pub name: String,

    #[serde(rename = "Preferred Email")]
    pub email: String,

    #[serde(rename = "Student ID")]
    pub identifier: String,

    #[serde(rename = "Class Level", default)]
    pub note: String,
}

/// Convert a registrar export, returning the number of students written
///
/// # Errors
///
/// Returns `ConvertError::Csv` when the export is malformed or lacks a
/// required column, and `ConvertError::BlankName` for a row without a name.
pub fn convert_export<R: Read, W: Write>(
    input: R,
    output: W,
    layout: RosterLayout,
) -> Result<usize, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(layout.header())?;

    let mut count = 0;
    for (i, record) in reader.deserialize::<ExportRecord>().enumerate() {
        let record = record?;
        let parts = NameParts::parse(&record.name).ok_or(ConvertError::BlankName { row: i + 1 })?;
        let note = record.note.replace(',', " ");
        writer.write_record([
            parts.last.as_str(),
            parts.first.as_str(),
            parts.middle.as_str(),
            record.email.as_str(),
            record.identifier.as_str(),
            note.as_str(),
        ])?;
        count += 1;
    }

    writer.flush()?;
    Ok(count)
}

/// Convert a registrar export file into `output`
///
/// # Errors
///
/// See [`convert_export`].
pub fn convert_export_file(
    input: &Path,
    output: &Path,
    layout: RosterLayout,
) -> Result<usize, ConvertError> {
    let reader = std::fs::File::open(input)?;
    let writer = std::fs::File::create(output)?;
    convert_export(reader, writer, layout)
}

/// A course section code found in a registrar export filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCode {
    /// Subject, e.g. `CS` or `MATH`
    pub subject: String,
    /// Course number, e.g. `261`
    pub number: String,
    /// Section as written in the filename, e.g. `09`
    pub section: String,
}

/// Subjects recognised in export filenames
const SUBJECTS: &[&str] = &["CS", "MATH"];

impl SectionCode {
    /// `CS261`
    pub fn course_number(&self) -> String {
        format!("{}{}", self.subject, self.number)
    }

    /// `CS261-09`, the key used in `COURSESECTIONS`
    pub fn section_label(&self) -> String {
        format!("{}{}-{}", self.subject, self.number, self.section)
    }

    pub fn is_math(&self) -> bool {
        self.subject == "MATH"
    }

    /// Whether a configured course label belongs to this course number.
    ///
    /// Math sections may also be configured under the `MA` or `CS` subject.
    pub fn matches_label(&self, label: &str) -> bool {
        if label.starts_with(&self.course_number()) {
            return true;
        }
        self.is_math()
            && ["MA", "CS"]
                .iter()
                .any(|alt| label.starts_with(&format!("{alt}{}", self.number)))
    }
}

/// Find a `CS-261-09` / `MATH-150-02` style section code in a filename
pub fn section_from_filename(filename: &str) -> Option<SectionCode> {
    SUBJECTS.iter().find_map(|subject| {
        let marker = format!("{subject}-");
        let start = filename.find(&marker)? + marker.len();
        let mut parts = filename[start..].splitn(2, '-');

        let number = parts.next()?;
        let section: String = parts
            .next()?
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect();

        if number.is_empty()
            || !number.chars().all(|c| c.is_ascii_alphanumeric())
            || section.is_empty()
        {
            return None;
        }

        Some(SectionCode {
            subject: (*subject).to_string(),
            number: number.to_string(),
            section,
        })
    })
}

/// Configured course labels that could receive this section's roster
pub fn candidate_courses<'a, I>(code: &SectionCode, labels: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    labels
        .into_iter()
        .filter(|label| code.matches_label(label))
        .collect()
}

/// Pick the course label for a section: the only candidate, or the `COURSESECTIONS` entry
pub fn select_course<'a>(
    code: &SectionCode,
    candidates: &[&'a str],
    sections: &'a BTreeMap<String, String>,
) -> Option<&'a str> {
    match candidates {
        [] => None,
        [only] => Some(*only),
        _ => {
            let chosen = sections.get(&code.section_label()).map(String::as_str);
            if chosen.is_none() {
                warn!(
                    "{} matches {} courses and has no COURSESECTIONS entry",
                    code.section_label(),
                    candidates.len()
                );
            }
            chosen
        }
    }
}
