use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Roster header has no {field} column (expected one of: {expected})")]
    MissingColumn {
        field: RosterField,
        expected: String,
    },

    #[error("Line {line} has {found} fields but the {field} column is field {needed}")]
    ShortRow {
        line: u64,
        field: RosterField,
        found: usize,
        needed: usize,
    },
}

/// Logical roster columns and the header spellings accepted for each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterField {
    FirstName,
    LastName,
    Email,
}

impl RosterField {
    pub const ALL: [RosterField; 3] = [Self::FirstName, Self::LastName, Self::Email];

    /// Accepted header names, lowest priority first. Matching is case-sensitive.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::FirstName => &["firstName", "first", "First"],
            Self::LastName => &["lastName", "last", "Last"],
            Self::Email => &["primaryEmail", "Email", "email1"],
        }
    }
}

impl std::fmt::Display for RosterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstName => write!(f, "first name"),
            Self::LastName => write!(f, "last name"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// Column positions resolved from a roster header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterColumns {
    pub first_name: usize,
    pub last_name: usize,
    pub email: usize,
}

impl RosterColumns {
    /// Resolve every field against the header in one pass.
    ///
    /// For each field the last synonym present in the header wins, so `First`
    /// beats `first` beats `firstName`. A header name that appears more than
    /// once resolves to its last column.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::MissingColumn` for the first field with no
    /// recognised header.
    pub fn resolve(header: &StringRecord) -> Result<Self, RosterError> {
        let position = |field: RosterField| -> Result<usize, RosterError> {
            field
                .synonyms()
                .iter()
                .rev()
                .find_map(|name| last_position(header, name))
                .ok_or_else(|| RosterError::MissingColumn {
                    field,
                    expected: field.synonyms().join(", "),
                })
        };

        Ok(Self {
            first_name: position(RosterField::FirstName)?,
            last_name: position(RosterField::LastName)?,
            email: position(RosterField::Email)?,
        })
    }

    fn index(&self, field: RosterField) -> usize {
        match field {
            RosterField::FirstName => self.first_name,
            RosterField::LastName => self.last_name,
            RosterField::Email => self.email,
        }
    }
}

fn last_position(header: &StringRecord, name: &str) -> Option<usize> {
    header
        .iter()
        .enumerate()
        .filter(|(_, h)| *h == name)
        .map(|(idx, _)| idx)
        .last()
}

/// One student row from a roster file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl RosterRow {
    fn from_record(record: &StringRecord, columns: &RosterColumns) -> Result<Self, RosterError> {
        let get = |field: RosterField| -> Result<String, RosterError> {
            let idx = columns.index(field);
            record
                .get(idx)
                .map(str::to_string)
                .ok_or_else(|| RosterError::ShortRow {
                    line: record.position().map_or(0, csv::Position::line),
                    field,
                    found: record.len(),
                    needed: idx + 1,
                })
        };

        Ok(Self {
            first_name: get(RosterField::FirstName)?,
            last_name: get(RosterField::LastName)?,
            email: get(RosterField::Email)?,
        })
    }
}

/// Parse a roster CSV file
///
/// # Errors
///
/// Returns `RosterError::Io` if the file cannot be opened, or any error from
/// [`parse_roster_reader`].
pub fn parse_roster_file(path: &Path) -> Result<Vec<RosterRow>, RosterError> {
    let file = std::fs::File::open(path)?;
    parse_roster_reader(file)
}

/// Parse roster CSV text
///
/// # Errors
///
/// See [`parse_roster_reader`].
pub fn parse_roster_text(text: &str) -> Result<Vec<RosterRow>, RosterError> {
    parse_roster_reader(text.as_bytes())
}

/// Parse roster CSV from any reader.
///
/// The first row is the header. Blank rows are skipped; fields are trimmed.
///
/// # Errors
///
/// Returns `RosterError::MissingColumn` if the header lacks a field,
/// `RosterError::ShortRow` if a row ends before a needed column, or
/// `RosterError::Csv` for malformed CSV.
pub fn parse_roster_reader<R: Read>(reader: R) -> Result<Vec<RosterRow>, RosterError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = RosterColumns::resolve(reader.headers()?)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(RosterRow::from_record(&record, &columns)?);
    }
    Ok(rows)
}
