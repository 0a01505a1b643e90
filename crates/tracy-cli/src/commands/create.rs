//! Snapshot command

use std::path::PathBuf;

use clap::Args;
use tracy_core::errors::TracyError;
use tracy_core::BumpLevel;
use tracy_engine::{ProjectInit, SnapshotService};

use crate::paths::resolve_source;
use crate::prompt::confirm;

/// Project used when none is given and none was used before
pub const DEFAULT_PROJECT: &str = "default";

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Project to add the version to (default: last used, then "default")
    pub project: Option<String>,

    /// File to snapshot; a bare file name is searched for below the
    /// working directory (default: last used file)
    pub path: Option<PathBuf>,

    /// Version bump: L (launch), S (significant) or M (minor)
    #[arg(short, long, default_value = "M")]
    pub level: String,

    /// Commit message
    #[arg(short, long, default_value = "")]
    pub message: String,

    /// Optional label for the version
    #[arg(long)]
    pub label: Option<String>,

    /// Create a missing project without asking
    #[arg(short, long)]
    pub yes: bool,
}

pub fn execute(
    service: &SnapshotService,
    args: CreateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let last_used = service.last_used()?;

    let project = args
        .project
        .or_else(|| last_used.as_ref().map(|l| l.project.clone()))
        .unwrap_or_else(|| DEFAULT_PROJECT.to_string());

    let path = match args.path {
        Some(arg) => resolve_source(&arg)?,
        None => match last_used {
            Some(last) => last.path,
            None => return Err("no file given and no file used before".into()),
        },
    };

    if !path.is_file() {
        return Err(TracyError::SourceNotFound { path }.into());
    }

    if !service.has_project(&project)? {
        let create = args.yes
            || confirm(&format!(
                "Project '{}' does not exist. Create it?",
                project
            ))?;
        if !create {
            println!("Aborted.");
            return Ok(());
        }
        if service.init_project(&project)? == ProjectInit::Created {
            println!("Project '{}' created.", project);
        }
    }

    let level = BumpLevel::parse(&args.level);
    let entry = service.create_snapshot(
        &project,
        &path,
        level,
        &args.message,
        args.label.as_deref(),
    )?;

    println!(
        "Saved {} as version {} in project '{}' (hash {})",
        entry.tracked_path.display(),
        entry.version,
        project,
        entry.short_hash()
    );
    Ok(())
}
