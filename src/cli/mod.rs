//! Command-line interface for roster-match.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **identify**: Work out which course a submissions archive belongs to
//! - **submissions**: Extract an archive and file each submission under its student
//! - **roster**: List, show, or search the configured rosters
//! - **convert**: Turn registrar exports into roster CSVs
//! - **prune-early**: Drop Grade directories for students already graded early
//!
//! Rosters come from `--rosters` or the `ROSTERS` environment variable,
//! encoded as `label:path:label:path...`.
//!
//! ## Usage
//!
//! ```text
//! # Which course is ~/Downloads/submissions.zip for?
//! roster-match identify
//!
//! # Sort the submissions for CS160 into ~/Labs/CS160/Grade
//! roster-match submissions CS160
//!
//! # Look up a student
//! roster-match roster find "Ann Lee" --format json
//!
//! # Convert a registrar export
//! roster-match convert ~/Downloads/CS-160-03.csv
//!
//! # From ~/Labs/CS160, drop students whose work is in Early/
//! roster-match prune-early
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::catalog::store::RosterCatalog;
use crate::parsing::config::{parse_roster_sources, RosterSource};

pub mod convert;
pub mod identify;
pub mod prune_early;
pub mod roster;
pub mod submissions;

#[derive(Parser)]
#[command(name = "roster-match")]
#[command(version)]
#[command(about = "Match LMS submission files to the students on your course rosters")]
#[command(
    long_about = "roster-match sorts a downloaded archive of LMS submissions by student.\n\nIt loads the rosters listed in ROSTERS, works out which course the archive belongs to, and moves each file into a directory named after the student's email with resubmission counters removed from its name."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Determine the course a submissions archive belongs to
    Identify(identify::IdentifyArgs),

    /// Extract a submissions archive into per-student directories
    Submissions(submissions::SubmissionsArgs),

    /// Inspect the configured rosters
    Roster(roster::RosterArgs),

    /// Convert registrar exports into roster CSV files
    Convert(convert::ConvertArgs),

    /// Remove student directories from Grade that also exist in Early
    PruneEarly(prune_early::PruneEarlyArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Where the roster files are
#[derive(Args, Debug, Clone)]
pub struct RosterConfig {
    /// Roster files as label:path pairs, e.g. CS160-3:/path/roster3.csv:CS160-4:/path/roster4.csv
    #[arg(long, env = "ROSTERS", value_name = "LABEL:PATH...")]
    pub rosters: String,
}

impl RosterConfig {
    /// Decode the configured roster list
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a well-formed `label:path` list.
    pub fn sources(&self) -> anyhow::Result<Vec<RosterSource>> {
        parse_roster_sources(&self.rosters).context("Invalid roster configuration")
    }

    /// Load every configured roster
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is malformed or any roster fails to load.
    pub fn load(&self, verbose: bool) -> anyhow::Result<RosterCatalog> {
        let sources = self.sources()?;
        let mut catalog = RosterCatalog::new();
        catalog.load_rosters(&sources)?;

        if verbose {
            eprintln!(
                "Loaded {} rosters with {} students",
                catalog.len(),
                catalog.registry().len()
            );
        }
        Ok(catalog)
    }
}

/// The user's home directory, from `HOME`
///
/// # Errors
///
/// Returns an error if `HOME` is not set.
pub fn home_dir() -> anyhow::Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .context("HOME is not set; pass explicit paths instead")
}

/// `$HOME/Downloads/submissions.zip`
///
/// # Errors
///
/// Returns an error if `HOME` is not set.
pub fn default_archive() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?.join("Downloads").join("submissions.zip"))
}
