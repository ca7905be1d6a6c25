use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::matching::batch;

/// Run from a course's labs directory, e.g. ~/Labs/CS160
#[derive(Args)]
pub struct PruneEarlyArgs {
    /// Directory of submissions already graded early
    #[arg(short, long, default_value = "Early")]
    pub early: PathBuf,

    /// Grade directory to prune
    #[arg(short = 'd', long, default_value = batch::GRADE_DIR_NAME)]
    pub directory: PathBuf,
}

/// Execute prune-early subcommand
///
/// # Errors
///
/// Returns an error if either directory cannot be read or a student
/// directory cannot be removed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PruneEarlyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let removed = batch::remove_early(&args.directory, &args.early)?;
    if verbose {
        eprintln!(
            "Compared {} against {}",
            args.directory.display(),
            args.early.display()
        );
    }

    match format {
        OutputFormat::Text => {
            println!(
                "Removed {} directories from {}",
                removed.len(),
                args.directory.display()
            );
            for dir in &removed {
                println!("  {}", dir.display());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "directory": args.directory,
                "early": args.early,
                "removed": removed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("removed");
            for dir in &removed {
                println!("{}", dir.display());
            }
        }
    }

    Ok(())
}
