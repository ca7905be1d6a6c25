use std::path::PathBuf;

use clap::Args;

use crate::catalog::inference::CourseFinder;
use crate::cli::{default_archive, OutputFormat, RosterConfig};
use crate::utils::archive;

#[derive(Args)]
pub struct IdentifyArgs {
    /// Submissions archive (defaults to ~/Downloads/submissions.zip)
    pub archive: Option<PathBuf>,

    #[command(flatten)]
    pub roster: RosterConfig,
}

/// Execute identify subcommand
///
/// # Errors
///
/// Returns an error if the rosters or the archive cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: IdentifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = args.roster.load(verbose)?;
    let archive_path = match args.archive {
        Some(path) => path,
        None => default_archive()?,
    };

    let names = archive::entry_names(&archive_path)?;
    if verbose {
        eprintln!("Read {} entries from {}", names.len(), archive_path.display());
    }

    let inference = CourseFinder::new(&catalog).infer(&names);

    match format {
        OutputFormat::Text => match &inference {
            Some(found) => println!(
                "{} ({}, {} students matched)",
                found.label, found.basis, found.matched
            ),
            None => println!("No course found for {}", archive_path.display()),
        },
        OutputFormat::Json => {
            let output = serde_json::json!({
                "archive": archive_path,
                "entries": names.len(),
                "course": inference,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("archive\tcourse\tbasis\tmatched");
            match &inference {
                Some(found) => println!(
                    "{}\t{}\t{}\t{}",
                    archive_path.display(),
                    found.label,
                    found.basis,
                    found.matched
                ),
                None => println!("{}\t\t\t0", archive_path.display()),
            }
        }
    }

    Ok(())
}
