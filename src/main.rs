use clap::Parser;
use tracing_subscriber::EnvFilter;

use roster_match::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("roster_match=debug,info")
    } else {
        EnvFilter::new("roster_match=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Identify(args) => {
            cli::identify::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Submissions(args) => {
            cli::submissions::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Roster(args) => {
            cli::roster::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Convert(args) => {
            cli::convert::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::PruneEarly(args) => {
            cli::prune_early::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
