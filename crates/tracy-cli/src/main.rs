//! Tracy CLI
//!
//! Command-line interface for Tracy

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracy_core::errors::{ExError, ExErrorKind, TracyError};
use tracy_core::logging_facility::{filter_for_verbosity, init_with_filter, profile_from_format};
use tracy_engine::SnapshotService;
use tracy_store::TracyConfig;

mod commands;
mod paths;
mod prompt;

#[derive(Debug, Parser)]
#[command(name = "tracy")]
#[command(about = "Tracy - local snapshots of individual files", long_about = None)]
struct Cli {
    /// State directory (default: $TRACY_HOME, then ~/.tracy)
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Log output format on stderr: pretty or json
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Register a new project
    Init(commands::init::InitArgs),
    /// Snapshot a file into a project
    Create(commands::create::CreateArgs),
    /// Show projects, tracked files or version history
    List(commands::list::ListArgs),
    /// Restore a file to a stored version
    Reset(commands::reset::ResetArgs),
    /// Reveal the directory holding stored versions
    Open(commands::open::OpenArgs),
}

fn main() {
    let cli = Cli::parse();
    init_with_filter(
        profile_from_format(&cli.log_format),
        filter_for_verbosity(cli.verbose),
    );

    if let Err(e) = run(cli) {
        std::process::exit(report(e.as_ref()));
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = TracyConfig::resolve(cli.home)?;
    let service = SnapshotService::open(config)?;

    match cli.command {
        Commands::Init(args) => commands::init::execute(&service, args),
        Commands::Create(args) => commands::create::execute(&service, args),
        Commands::List(args) => commands::list::execute(&service, args),
        Commands::Reset(args) => commands::reset::execute(&service, args),
        Commands::Open(args) => commands::open::execute(&service, args),
    }
}

/// Print an error for the user and pick the process exit code
fn report(err: &(dyn std::error::Error + 'static)) -> i32 {
    let Some(tracy_err) = err.downcast_ref::<TracyError>() else {
        eprintln!("Error: {}", err);
        return 1;
    };

    eprintln!("Error: {}", tracy_err);
    match tracy_err {
        TracyError::AmbiguousHash { candidates, .. } => {
            eprintln!("Multiple matches found:");
            for (idx, candidate) in candidates.iter().enumerate() {
                eprintln!("{}. {}", idx + 1, candidate);
            }
            eprintln!("Narrow the match with a longer hash, --project or --path.");
        }
        TracyError::AmbiguousTrackedPath { candidates, .. } => {
            eprintln!("Multiple matches found:");
            for (idx, path) in candidates.iter().enumerate() {
                eprintln!("{}. {}", idx + 1, path.display());
            }
            eprintln!("Pass the full path instead.");
        }
        _ => {}
    }

    exit_code(ExError::from(tracy_err.clone()).kind())
}

fn exit_code(kind: ExErrorKind) -> i32 {
    match kind {
        ExErrorKind::InvalidInput => 2,
        ExErrorKind::NoSuchProject | ExErrorKind::SourceNotFound | ExErrorKind::NotFound => 3,
        ExErrorKind::AmbiguousHash | ExErrorKind::AmbiguousSelection => 4,
        ExErrorKind::MissingBlob | ExErrorKind::CorruptBlob | ExErrorKind::PartialRestore => 5,
        ExErrorKind::AlreadyExists
        | ExErrorKind::Io
        | ExErrorKind::Serialization
        | ExErrorKind::Internal => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_codes_by_family() {
        assert_eq!(exit_code(ExErrorKind::NotFound), 3);
        assert_eq!(exit_code(ExErrorKind::AmbiguousHash), 4);
        assert_eq!(exit_code(ExErrorKind::MissingBlob), 5);
        assert_eq!(exit_code(ExErrorKind::Io), 1);
    }
}
