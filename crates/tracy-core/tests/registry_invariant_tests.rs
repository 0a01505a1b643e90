// Property tests for the registry's per-path invariants and the bump rule.

use std::path::{Path, PathBuf};

use proptest::prelude::*;
use tracy_core::{bump, BumpLevel, ProjectRegistry, VersionEntry, VersionNumber};

fn level_strategy() -> impl Strategy<Value = BumpLevel> {
    prop_oneof![
        Just(BumpLevel::Launch),
        Just(BumpLevel::Significant),
        Just(BumpLevel::Minor),
    ]
}

/// Append a snapshot the way the snapshot service does
fn snapshot(registry: &mut ProjectRegistry, path: &Path, hash: String, level: BumpLevel) {
    let previous = registry
        .latest_entry_for("demo", path)
        .unwrap()
        .map(|e| e.version);
    let entry = VersionEntry::new(
        hash,
        path.to_path_buf(),
        bump(previous, level).unwrap(),
        String::new(),
        None,
    );
    registry.append_entry("demo", entry).unwrap();
}

proptest! {
    #[test]
    fn prop_exactly_one_latest_and_it_is_last(
        steps in prop::collection::vec((0usize..3, level_strategy()), 1..40)
    ) {
        let paths: Vec<PathBuf> = ["/p/a.txt", "/p/b.txt", "/q/a.txt"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let mut registry = ProjectRegistry::new();
        registry.create_project("demo").unwrap();

        for (i, (which, level)) in steps.iter().enumerate() {
            let path = &paths[*which];
            snapshot(&mut registry, path, format!("{:064x}", i), *level);

            let entries = registry.entries_for("demo", path).unwrap();
            let latest: Vec<_> = entries.iter().filter(|e| e.is_latest).collect();
            prop_assert_eq!(latest.len(), 1);
            prop_assert_eq!(&latest[0].content_hash, &format!("{:064x}", i));
        }
    }

    #[test]
    fn prop_versions_strictly_increase(
        levels in prop::collection::vec(level_strategy(), 1..30)
    ) {
        let path = Path::new("/p/a.txt");
        let mut registry = ProjectRegistry::new();
        registry.create_project("demo").unwrap();

        for (i, level) in levels.iter().enumerate() {
            snapshot(&mut registry, path, format!("{:064x}", i), *level);
        }

        let versions: Vec<VersionNumber> = registry
            .entries_for("demo", path)
            .unwrap()
            .iter()
            .map(|e| e.version)
            .collect();
        prop_assert_eq!(versions[0], VersionNumber::INITIAL);
        for pair in versions.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn prop_first_version_ignores_level(level in level_strategy()) {
        prop_assert_eq!(bump(None, level).unwrap(), VersionNumber::new(1, 0, 0));
    }

    #[test]
    fn prop_bump_is_strictly_greater(
        major in 0u32..1000,
        minor in 0u32..1000,
        patch in 0u32..1000,
        level in level_strategy(),
    ) {
        let previous = VersionNumber::new(major, minor, patch);
        prop_assert!(bump(Some(previous), level).unwrap() > previous);
    }

    #[test]
    fn prop_unknown_tokens_are_minor(token in "[a-kn-rt-z0-9]{0,6}") {
        // Tokens without l/s/m cannot spell a recognised level.
        prop_assert_eq!(BumpLevel::parse(&token), BumpLevel::Minor);
    }

    #[test]
    fn prop_mark_current_leaves_one_current(
        count in 1usize..10,
        pick in 0usize..10,
    ) {
        let path = Path::new("/p/a.txt");
        let mut registry = ProjectRegistry::new();
        registry.create_project("demo").unwrap();
        for i in 0..count {
            snapshot(&mut registry, path, format!("{:064x}", i), BumpLevel::Minor);
        }

        let target = format!("{:064x}", pick % count);
        registry.mark_current("demo", path, &target).unwrap();

        let entries = registry.entries_for("demo", path).unwrap();
        let current: Vec<_> = entries.iter().filter(|e| e.is_current).collect();
        prop_assert_eq!(current.len(), 1);
        prop_assert_eq!(&current[0].content_hash, &target);
    }
}

#[test]
fn test_bump_table() {
    let v = VersionNumber::new(2, 3, 4);
    assert_eq!(bump(None, BumpLevel::Minor).unwrap(), VersionNumber::new(1, 0, 0));
    assert_eq!(bump(Some(v), BumpLevel::Launch).unwrap(), VersionNumber::new(3, 0, 0));
    assert_eq!(bump(Some(v), BumpLevel::Significant).unwrap(), VersionNumber::new(2, 4, 0));
    assert_eq!(bump(Some(v), BumpLevel::Minor).unwrap(), VersionNumber::new(2, 3, 5));
}

#[test]
fn test_bump_from_persisted_maximum_is_an_error() {
    // A hand-edited registry can hold any u32 component
    let stored: VersionNumber = "4294967295.0.0".parse().unwrap();
    assert!(bump(Some(stored), BumpLevel::Launch).is_err());
    assert_eq!(
        bump(Some(stored), BumpLevel::Minor).unwrap(),
        VersionNumber::new(u32::MAX, 0, 1)
    );
}
