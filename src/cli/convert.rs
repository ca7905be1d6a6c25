use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::Args;
use serde::Serialize;

use crate::cli::{home_dir, OutputFormat};
use crate::parsing::config::{parse_course_sections, parse_roster_sources, RosterSource};
use crate::parsing::mycap::{
    candidate_courses, convert_export_file, section_from_filename, select_course, RosterLayout,
};

/// Prefix of registrar export files in the downloads directory
const EXPORT_PREFIX: &str = "section-rosters";

#[derive(Args)]
pub struct ConvertArgs {
    /// Registrar export files (defaults to ~/Downloads/section-rosters*.csv)
    pub exports: Vec<PathBuf>,

    /// Only write this layout (both are written by default)
    #[arg(long, value_enum)]
    pub layout: Option<RosterLayout>,

    /// Write a single export here instead of beside the configured roster
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep the export files after converting
    #[arg(short, long)]
    pub keep: bool,

    /// Roster files as label:path pairs; decides where converted rosters go
    #[arg(long, env = "ROSTERS", value_name = "LABEL:PATH...")]
    pub rosters: Option<String>,

    /// Registrar section to course label pairs, for sections that fit several courses
    #[arg(long, env = "COURSESECTIONS", value_name = "SECTION:LABEL...")]
    pub course_sections: Option<String>,
}

/// One converted export
#[derive(Debug, Serialize)]
struct Conversion {
    export: PathBuf,
    course: Option<String>,
    outputs: Vec<PathBuf>,
    students: usize,
}

/// Execute convert subcommand
///
/// # Errors
///
/// Returns an error if an export cannot be read, its course cannot be
/// determined, or an output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ConvertArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut exports = if args.exports.is_empty() {
        downloaded_exports()?
    } else {
        args.exports.clone()
    };
    exports.sort();

    if exports.is_empty() {
        bail!("No registrar exports to convert");
    }

    let layouts = match args.layout {
        Some(layout) => vec![layout],
        None => vec![RosterLayout::Roster, RosterLayout::Ga],
    };

    let conversions = if let Some(output) = &args.output {
        if exports.len() != 1 || layouts.len() != 1 {
            bail!("--output needs exactly one export and an explicit --layout");
        }
        let students = convert_export_file(&exports[0], output, layouts[0])
            .with_context(|| format!("Failed to convert {}", exports[0].display()))?;
        vec![Conversion {
            export: exports[0].clone(),
            course: None,
            outputs: vec![output.clone()],
            students,
        }]
    } else {
        convert_into_rosters(&args, &exports, &layouts, verbose)?
    };

    if !args.keep {
        for export in &exports {
            std::fs::remove_file(export)
                .with_context(|| format!("Failed to remove {}", export.display()))?;
        }
    }

    match format {
        OutputFormat::Text => {
            for c in &conversions {
                let target = c.course.as_deref().unwrap_or("(output)");
                println!("{} -> {target} ({} students)", file_name(&c.export), c.students);
                for output in &c.outputs {
                    println!("  wrote {}", output.display());
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&conversions)?);
        }
        OutputFormat::Tsv => {
            println!("export\tcourse\tstudents\toutputs");
            for c in &conversions {
                let outputs: Vec<String> =
                    c.outputs.iter().map(|p| p.display().to_string()).collect();
                println!(
                    "{}\t{}\t{}\t{}",
                    c.export.display(),
                    c.course.as_deref().unwrap_or(""),
                    c.students,
                    outputs.join(",")
                );
            }
        }
    }

    Ok(())
}

/// Convert each export into the directory of the course it belongs to
fn convert_into_rosters(
    args: &ConvertArgs,
    exports: &[PathBuf],
    layouts: &[RosterLayout],
    verbose: bool,
) -> anyhow::Result<Vec<Conversion>> {
    let encoded = args
        .rosters
        .as_deref()
        .context("ROSTERS is not set; pass --rosters or --output")?;
    let sources = parse_roster_sources(encoded).context("Invalid roster configuration")?;
    let sections = match args.course_sections.as_deref() {
        Some(encoded) => {
            parse_course_sections(encoded).context("Invalid course section configuration")?
        }
        None => BTreeMap::new(),
    };

    // A CS section's course is used up once matched; math rosters share theirs
    let mut available: Vec<&RosterSource> = sources.iter().collect();
    let mut conversions = Vec::with_capacity(exports.len());

    for export in exports {
        let name = file_name(export);
        let code = section_from_filename(&name)
            .ok_or_else(|| anyhow!("No CS or MATH section code in {name}"))?;

        let candidates = candidate_courses(
            &code,
            available.iter().copied().map(|s| s.label.as_str()),
        );
        let label = select_course(&code, &candidates, &sections).ok_or_else(|| {
            anyhow!(
                "Cannot choose a course for {name} among [{}]; add {} to COURSESECTIONS",
                candidates.join(", "),
                code.section_label()
            )
        })?;
        let source = sources
            .iter()
            .find(|s| s.label == label)
            .ok_or_else(|| anyhow!("COURSESECTIONS maps {name} to unknown course {label}"))?;

        let mut outputs = Vec::with_capacity(layouts.len());
        let mut students = 0;
        for &layout in layouts {
            let output = layout.output_path(&source.path, code.is_math());
            students = convert_export_file(export, &output, layout)
                .with_context(|| format!("Failed to convert {name}"))?;
            if verbose {
                eprintln!("Wrote {students} students to {}", output.display());
            }
            outputs.push(output);
        }

        let label = source.label.clone();
        if !code.is_math() {
            available.retain(|s| s.label != label);
        }
        conversions.push(Conversion {
            export: export.clone(),
            course: Some(label),
            outputs,
            students,
        });
    }

    Ok(conversions)
}

/// `section-rosters*.csv` files in `$HOME/Downloads`
fn downloaded_exports() -> anyhow::Result<Vec<PathBuf>> {
    let downloads = home_dir()?.join("Downloads");
    let entries = std::fs::read_dir(&downloads)
        .with_context(|| format!("Failed to read {}", downloads.display()))?;

    let mut exports = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read {}", downloads.display()))?
            .path();
        let name = file_name(&path);
        if name.starts_with(EXPORT_PREFIX)
            && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            exports.push(path);
        }
    }
    Ok(exports)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
