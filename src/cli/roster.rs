use anyhow::anyhow;
use clap::{Args, Subcommand};

use crate::catalog::store::RosterCatalog;
use crate::cli::{OutputFormat, RosterConfig};
use crate::core::student::Student;

#[derive(Args)]
pub struct RosterArgs {
    #[command(subcommand)]
    pub command: RosterCommands,

    #[command(flatten)]
    pub roster: RosterConfig,
}

#[derive(Subcommand)]
pub enum RosterCommands {
    /// List every configured course
    List,

    /// Show the students of a course (exact label, or a prefix to merge sections)
    Show {
        /// Course label or prefix, e.g. CS261-9 or CS261
        #[arg(required = true)]
        course: String,
    },

    /// Find a student by email or display name
    Find {
        /// Email address, or a name such as "Ann Lee" or "Lee, Ann (she/her)"
        #[arg(required = true)]
        name: String,
    },
}

/// Execute roster subcommand
///
/// # Errors
///
/// Returns an error if the rosters cannot be loaded or the course or student
/// is not found.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RosterArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = args.roster.load(verbose)?;

    match args.command {
        RosterCommands::List => run_list(&catalog, format),
        RosterCommands::Show { course } => run_show(&catalog, &course, format),
        RosterCommands::Find { name } => run_find(&catalog, &name, format),
    }
}

fn run_list(catalog: &RosterCatalog, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "Rosters ({} courses, {} students)\n",
                catalog.len(),
                catalog.registry().len()
            );
            println!("{:<20} {:>8}  Roster", "Course", "Students");
            println!("{}", "-".repeat(60));
            for course in catalog.courses() {
                println!(
                    "{:<20} {:>8}  {}",
                    course.label,
                    course.len(),
                    course.roster_path.display()
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", catalog.to_json()?);
        }
        OutputFormat::Tsv => {
            println!("course\tstudents\troster");
            for course in catalog.courses() {
                println!(
                    "{}\t{}\t{}",
                    course.label,
                    course.len(),
                    course.roster_path.display()
                );
            }
        }
    }
    Ok(())
}

fn run_show(catalog: &RosterCatalog, name: &str, format: OutputFormat) -> anyhow::Result<()> {
    let course = catalog
        .resolve_course(name)
        .ok_or_else(|| anyhow!("No roster matches course '{name}'"))?;
    let students: Vec<&Student> = course.students(catalog.registry()).collect();

    match format {
        OutputFormat::Text => {
            println!("Course: {}", course.label);
            println!("Roster: {}", course.roster_path.display());
            println!("Students: {}\n", students.len());
            println!("{:<20} {:<20} Email", "Last", "First");
            println!("{}", "-".repeat(70));
            for student in &students {
                println!(
                    "{:<20} {:<20} {}",
                    student.last_name, student.first_name, student.email
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "label": course.label,
                "roster_path": course.roster_path,
                "students": students,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("last_name\tfirst_name\temail");
            for student in &students {
                println!(
                    "{}\t{}\t{}",
                    student.last_name, student.first_name, student.email
                );
            }
        }
    }
    Ok(())
}

fn run_find(catalog: &RosterCatalog, name: &str, format: OutputFormat) -> anyhow::Result<()> {
    let student = catalog
        .find_student_by_email(name)
        .or_else(|| catalog.find_student_by_name(name))
        .ok_or_else(|| anyhow!("No student found for '{name}'"))?;

    match format {
        OutputFormat::Text => {
            println!("{student}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(student)?);
        }
        OutputFormat::Tsv => {
            println!("last_name\tfirst_name\temail\tcourses");
            println!(
                "{}\t{}\t{}\t{}",
                student.last_name,
                student.first_name,
                student.email,
                student.courses.join(",")
            );
        }
    }
    Ok(())
}
