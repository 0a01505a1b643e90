//! Reveal the object store in the platform file browser

use std::path::Path;
use std::process::Command;

use clap::Args;
use tracy_engine::SnapshotService;

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Print the directory instead of opening it
    #[arg(long)]
    pub print: bool,
}

pub fn execute(service: &SnapshotService, args: OpenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = service.objects_dir();

    if !path.exists() {
        println!("Storage directory '{}' does not exist.", path.display());
        return Ok(());
    }

    if args.print {
        println!("{}", path.display());
        return Ok(());
    }

    match opener() {
        Some(program) => reveal(program, path),
        None => {
            println!(
                "Don't know how to open folders on this platform ({}).",
                std::env::consts::OS
            );
            println!("Path to storage: {}", path.display());
            Ok(())
        }
    }
}

fn opener() -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        Some("open")
    } else if cfg!(target_os = "windows") {
        Some("explorer")
    } else if cfg!(target_os = "linux") {
        Some("xdg-open")
    } else {
        None
    }
}

fn reveal(program: &str, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    Command::new(program)
        .arg(path)
        .spawn()
        .map(|_| ())
        .map_err(|e| {
            format!(
                "could not run {} ({}); path to storage: {}",
                program,
                e,
                path.display()
            )
            .into()
        })
}
