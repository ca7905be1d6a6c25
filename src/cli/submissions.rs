use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::Args;

use crate::cli::{default_archive, home_dir, OutputFormat, RosterConfig};
use crate::matching::batch::{self, MovePlan};
use crate::matching::SubmissionMatcher;
use crate::utils::archive;

#[derive(Args)]
pub struct SubmissionsArgs {
    /// Course label or prefix, e.g. CS160-3 or CS160 (inferred from the archive if omitted)
    pub course: Option<String>,

    /// Submissions archive (defaults to ~/Downloads/submissions.zip)
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Directory to extract into (defaults to the archive path without its extension)
    #[arg(long)]
    pub extract_dir: Option<PathBuf>,

    /// Root holding one directory per course prefix (defaults to ~/Labs)
    #[arg(long)]
    pub labs_root: Option<PathBuf>,

    /// Show where each file would go without extracting or moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Keep the archive after a successful run
    #[arg(short, long)]
    pub keep: bool,

    /// Add to the existing Grade directory instead of clearing it first
    #[arg(long)]
    pub keep_grade: bool,

    #[command(flatten)]
    pub roster: RosterConfig,
}

/// Execute submissions subcommand
///
/// # Errors
///
/// Returns an error if the rosters cannot be loaded, the course cannot be
/// determined, or the archive cannot be extracted or its files moved.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SubmissionsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = args.roster.load(verbose)?;
    let archive_path = match &args.archive {
        Some(path) => path.clone(),
        None => default_archive()?,
    };
    let extract_dir = args
        .extract_dir
        .clone()
        .unwrap_or_else(|| archive_path.with_extension(""));
    let labs_root = match &args.labs_root {
        Some(path) => path.clone(),
        None => home_dir()?.join("Labs"),
    };

    let course_name = match &args.course {
        Some(name) => name.clone(),
        None => catalog
            .determine_course(&archive_path)?
            .ok_or_else(|| anyhow!("Could not determine the course for {}", archive_path.display()))?,
    };
    let course = catalog
        .resolve_course(&course_name)
        .ok_or_else(|| anyhow!("No roster matches course '{course_name}'"))?;

    let matcher = SubmissionMatcher::new(catalog.registry(), &course);
    let grade_dir = batch::grade_directory(&labs_root, &course);

    if args.dry_run {
        let names = archive::entry_names(&archive_path)?;
        let files = names.iter().map(|name| extract_dir.join(name));
        let plan = batch::plan_files(&matcher, files, &grade_dir);
        return print_plan(&course.label, &grade_dir, &plan, &[], format);
    }

    if format_is_text(format) {
        println!("Sorting submissions for {course}");
    }

    if !archive::ensure_extracted(&archive_path, &extract_dir)? && verbose {
        eprintln!("{} is up to date", extract_dir.display());
    }

    if args.keep_grade {
        std::fs::create_dir_all(&grade_dir)
            .with_context(|| format!("Failed to create {}", grade_dir.display()))?;
    } else {
        batch::reset_directory(&grade_dir)?;
    }

    let plan = batch::plan_moves(&matcher, &extract_dir, &grade_dir)?;
    batch::apply(&plan)?;

    let remaining = if batch::remove_if_empty(&extract_dir)? {
        Vec::new()
    } else {
        remaining_entries(&extract_dir)?
    };

    if !args.keep {
        std::fs::remove_file(&archive_path)
            .with_context(|| format!("Failed to remove {}", archive_path.display()))?;
    }

    print_plan(&course.label, &grade_dir, &plan, &remaining, format)
}

fn format_is_text(format: OutputFormat) -> bool {
    matches!(format, OutputFormat::Text)
}

fn remaining_entries(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

fn print_plan(
    course: &str,
    grade_dir: &Path,
    plan: &MovePlan,
    remaining: &[PathBuf],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "{} files for {} students -> {}",
                plan.moves.len(),
                plan.student_count(),
                grade_dir.display()
            );
            for planned in &plan.moves {
                println!(
                    "  {} -> {}",
                    file_name(&planned.source),
                    planned.destination.display()
                );
            }
            if !plan.unmatched.is_empty() {
                println!("\nCould not match:");
                for path in &plan.unmatched {
                    println!("  {}", file_name(path));
                }
            }
            for (path, reason) in &plan.rejected {
                println!("Skipped {}: {reason}", file_name(path));
            }
            if !remaining.is_empty() {
                println!("\nRemaining files:");
                for path in remaining {
                    println!("  {}", path.display());
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "course": course,
                "grade_directory": grade_dir,
                "moves": plan.moves,
                "unmatched": plan.unmatched,
                "rejected": plan.rejected,
                "remaining": remaining,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("source\tdestination\temail\trevision");
            for planned in &plan.moves {
                println!(
                    "{}\t{}\t{}\t{}",
                    planned.source.display(),
                    planned.destination.display(),
                    planned.email,
                    planned.revision
                );
            }
            for path in &plan.unmatched {
                println!("{}\t\t\t", path.display());
            }
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
