//! Project registration command

use clap::Args;
use tracy_engine::{ProjectInit, SnapshotService};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Name of the project to create
    pub project: String,
}

pub fn execute(service: &SnapshotService, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    match service.init_project(&args.project)? {
        ProjectInit::Created => println!("Project '{}' created.", args.project),
        ProjectInit::AlreadyExists => println!("Project '{}' already exists.", args.project),
    }
    Ok(())
}
