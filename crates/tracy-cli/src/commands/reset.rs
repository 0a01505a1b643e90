//! Restore command

use std::path::PathBuf;

use clap::Args;
use tracy_core::errors::TracyError;
use tracy_engine::{RestoreScope, SnapshotService};

use crate::paths::scope_path;
use crate::prompt::confirm;

#[derive(Debug, Args)]
pub struct ResetArgs {
    /// Full hash or hash prefix of the version to restore
    pub hash: String,

    /// Only consider versions of this project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Only consider versions of this file (full path or file name)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Overwrite without asking
    #[arg(short, long)]
    pub force: bool,
}

pub fn execute(service: &SnapshotService, args: ResetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.path.as_deref().map(scope_path).transpose()?;
    let scope = RestoreScope::new(args.project, path);

    let target = service.resolve_version(&args.hash, &scope)?;
    let entry = &target.entry;

    if !service.store().contains(&entry.content_hash) {
        return Err(TracyError::MissingBlob {
            digest: entry.content_hash.clone(),
        }
        .into());
    }

    if !args.force {
        let question = format!(
            "Reset {} to version {} ({})? This will overwrite the file.",
            entry.tracked_path.display(),
            entry.version,
            entry.short_hash()
        );
        if !confirm(&question)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    // Pin the exact version that was confirmed.
    let pinned = RestoreScope::new(
        Some(target.project.clone()),
        Some(entry.tracked_path.clone()),
    );
    let restored = service.restore(&entry.content_hash, &pinned)?;

    println!(
        "File {} has been reset to version {} (hash {}...).",
        restored.tracked_path().display(),
        restored.entry.version,
        restored.entry.short_hash()
    );
    Ok(())
}
