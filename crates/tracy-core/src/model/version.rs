use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::TracyError;

/// Granularity of a version bump
///
/// Mirrors major/minor/patch: a launch starts a new major line, a
/// significant improvement a new minor line, anything else is a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BumpLevel {
    /// New major version: (major+1).0.0
    Launch,
    /// New minor version: major.(minor+1).0
    Significant,
    /// New patch version: major.minor.(patch+1)
    #[default]
    Minor,
}

impl BumpLevel {
    /// Parse a level token; unknown tokens default to `Minor`.
    ///
    /// Accepts the single-letter forms (`L`, `S`, `M`) and the full names,
    /// case-insensitively.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "launch" => BumpLevel::Launch,
            "s" | "significant" => BumpLevel::Significant,
            _ => BumpLevel::Minor,
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BumpLevel::Launch => "launch",
            BumpLevel::Significant => "significant",
            BumpLevel::Minor => "minor",
        };
        f.write_str(name)
    }
}

/// Three-part version identity of a snapshot
///
/// Field order gives the derived `Ord` its lexicographic
/// (major, minor, patch) comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionNumber {
    /// Version assigned to the first snapshot of a path
    pub const INITIAL: VersionNumber = VersionNumber::new(1, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// The version that follows `self` at the given level
    ///
    /// # Errors
    ///
    /// Returns `VersionOverflow` if the bumped component is already at
    /// `u32::MAX`.
    pub fn next(self, level: BumpLevel) -> Result<Self, TracyError> {
        let next = match level {
            BumpLevel::Launch => self.major.checked_add(1).map(|m| Self::new(m, 0, 0)),
            BumpLevel::Significant => self
                .minor
                .checked_add(1)
                .map(|m| Self::new(self.major, m, 0)),
            BumpLevel::Minor => self
                .patch
                .checked_add(1)
                .map(|p| Self::new(self.major, self.minor, p)),
        };
        next.ok_or_else(|| TracyError::VersionOverflow {
            version: self.to_string(),
            level: level.to_string(),
        })
    }
}

impl Default for VersionNumber {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Compute the version of a new snapshot from the previous one
///
/// A path without history always starts at 1.0.0, whatever the level.
///
/// # Errors
///
/// Returns `VersionOverflow` if `previous` cannot be bumped at `level`.
pub fn bump(previous: Option<VersionNumber>, level: BumpLevel) -> Result<VersionNumber, TracyError> {
    match previous {
        None => Ok(VersionNumber::INITIAL),
        Some(prev) => prev.next(level),
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionNumber {
    type Err = TracyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TracyError::InvalidVersion {
            value: s.to_string(),
        };

        let mut parts = s.trim().split('.');
        let mut component = || -> Result<u32, TracyError> {
            parts
                .next()
                .ok_or_else(invalid)?
                .parse::<u32>()
                .map_err(|_| invalid())
        };
        let version = Self::new(component()?, component()?, component()?);

        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

// Persisted as the "major.minor.patch" string.
impl Serialize for VersionNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_table() {
        let v = VersionNumber::new(2, 3, 4);
        assert_eq!(bump(None, BumpLevel::Launch).unwrap(), VersionNumber::INITIAL);
        assert_eq!(bump(Some(v), BumpLevel::Launch).unwrap(), VersionNumber::new(3, 0, 0));
        assert_eq!(
            bump(Some(v), BumpLevel::Significant).unwrap(),
            VersionNumber::new(2, 4, 0)
        );
        assert_eq!(bump(Some(v), BumpLevel::Minor).unwrap(), VersionNumber::new(2, 3, 5));
    }

    #[test]
    fn test_bump_at_component_limit_fails() {
        let top = VersionNumber::new(u32::MAX, u32::MAX, u32::MAX);
        for level in [BumpLevel::Launch, BumpLevel::Significant, BumpLevel::Minor] {
            let err = bump(Some(top), level).unwrap_err();
            assert!(matches!(err, TracyError::VersionOverflow { .. }));
        }

        // Only the bumped component has to have room
        let v = VersionNumber::new(1, u32::MAX, u32::MAX);
        assert_eq!(bump(Some(v), BumpLevel::Launch).unwrap(), VersionNumber::new(2, 0, 0));
        assert!(bump(Some(v), BumpLevel::Significant).is_err());
    }

    #[test]
    fn test_level_tokens() {
        assert_eq!(BumpLevel::parse("L"), BumpLevel::Launch);
        assert_eq!(BumpLevel::parse("launch"), BumpLevel::Launch);
        assert_eq!(BumpLevel::parse("s"), BumpLevel::Significant);
        assert_eq!(BumpLevel::parse("M"), BumpLevel::Minor);
        assert_eq!(BumpLevel::parse(""), BumpLevel::Minor);
        assert_eq!(BumpLevel::parse("whatever"), BumpLevel::Minor);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("1.2".parse::<VersionNumber>().is_err());
        assert!("1.2.3.4".parse::<VersionNumber>().is_err());
        assert!("1.x.3".parse::<VersionNumber>().is_err());
        assert!("-1.0.0".parse::<VersionNumber>().is_err());
        assert_eq!(
            "10.0.7".parse::<VersionNumber>().unwrap(),
            VersionNumber::new(10, 0, 7)
        );
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(VersionNumber::new(1, 10, 0) > VersionNumber::new(1, 9, 99));
        assert!(VersionNumber::new(2, 0, 0) > VersionNumber::new(1, 99, 99));
        assert!(VersionNumber::new(1, 0, 1) > VersionNumber::new(1, 0, 0));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&VersionNumber::new(1, 2, 3)).unwrap();
        assert_eq!(json, "\"1.2.3\"");
        let back: VersionNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, VersionNumber::new(1, 2, 3));
    }
}
