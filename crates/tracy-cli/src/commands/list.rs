//! History and listing command

use std::path::{Path, PathBuf};

use clap::Args;
use tracy_core::errors::TracyError;
use tracy_core::VersionEntry;
use tracy_engine::SnapshotService;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Project to list
    pub project: Option<String>,

    /// Tracked file (full path or file name)
    pub file: Option<PathBuf>,

    /// Tracked file to look up across all projects
    #[arg(short, long = "file", value_name = "FILE", conflicts_with = "file")]
    pub file_flag: Option<PathBuf>,
}

pub fn execute(service: &SnapshotService, args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file = args.file.or(args.file_flag);

    match (args.project, file) {
        (Some(project), Some(file)) => {
            let (_, versions) = service.history_for_file(&project, &file)?;
            print_versions(&project, &versions);
        }
        (Some(project), None) => list_files(service, &project)?,
        (None, Some(file)) => list_by_file_name(service, &file)?,
        (None, None) => list_projects(service)?,
    }
    Ok(())
}

fn list_files(service: &SnapshotService, project: &str) -> Result<(), TracyError> {
    let files = service.tracked_paths(project)?;
    if files.is_empty() {
        println!("No versions yet in project '{}'.", project);
        return Ok(());
    }
    println!("Files in project '{}':", project);
    for (idx, file) in files.iter().enumerate() {
        println!("{}. {}", idx + 1, file.display());
    }
    Ok(())
}

fn list_by_file_name(service: &SnapshotService, file: &Path) -> Result<(), TracyError> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut matches = service.find_tracked_by_name(&name)?;

    match matches.len() {
        0 => Err(TracyError::FileNameNotFound { name }),
        1 => {
            let (project, path) = matches.remove(0);
            let versions = service.history(&project, &path)?;
            print_versions(&project, &versions);
            Ok(())
        }
        _ => {
            println!("Multiple matches found:");
            for (idx, (project, path)) in matches.iter().enumerate() {
                println!("{}. {}: {}", idx + 1, project, path.display());
            }
            println!("Run `tracy list <project> <file>` to see one history.");
            Ok(())
        }
    }
}

fn list_projects(service: &SnapshotService) -> Result<(), TracyError> {
    let projects = service.list_projects()?;
    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }
    println!("Projects:");
    for (idx, project) in projects.iter().enumerate() {
        println!("{}. {}", idx + 1, project);
    }
    Ok(())
}

fn print_versions(project: &str, versions: &[VersionEntry]) {
    println!("Versions in project '{}':", project);
    for entry in versions {
        println!("  {}", headline(entry));
        println!("    Commit: {}", entry.commit_message);
        println!("    Time:   {}", entry.created_at.to_rfc3339());
        println!("    Hash:   {}", entry.content_hash);
    }
}

fn headline(entry: &VersionEntry) -> String {
    let mut line = format!("{} v{}", entry.tracked_path.display(), entry.version);
    if let Some(label) = &entry.label {
        line.push_str(&format!(" [{}]", label));
    }

    let marks: Vec<&str> = [
        (entry.is_latest, "Latest"),
        (entry.is_current, "Current"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, name)| *name)
    .collect();
    if !marks.is_empty() {
        line.push_str(&format!(" ({})", marks.join(" & ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracy_core::VersionNumber;

    #[test]
    fn test_headline_marks() {
        let mut entry = VersionEntry::new(
            "ab".repeat(32),
            PathBuf::from("/w/a.txt"),
            VersionNumber::new(1, 2, 0),
            String::new(),
            Some("rc".to_string()),
        );
        assert_eq!(headline(&entry), "/w/a.txt v1.2.0 [rc] (Latest)");

        entry.is_current = true;
        assert_eq!(headline(&entry), "/w/a.txt v1.2.0 [rc] (Latest & Current)");

        entry.is_latest = false;
        entry.is_current = false;
        entry.label = None;
        assert_eq!(headline(&entry), "/w/a.txt v1.2.0");
    }
}
