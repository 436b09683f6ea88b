//! Declared Robot Framework version
//!
//!     The version is an input to parsing, never inferred from the data. It gates which
//!     recognizers apply (e.g. `*** Tasks ***` from 3.1) and which variable syntax the
//!     extractor accepts (empty `${}` from 3.2).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::VersionError;

/// A `major.minor[.patch]` Robot Framework version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RobotVersion {
    major: u16,
    minor: u16,
    patch: u16,
}

impl RobotVersion {
    /// Newest version whose syntax rules are implemented.
    pub const LATEST: RobotVersion = RobotVersion::new(3, 2);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self {
            major,
            minor,
            patch: 0,
        }
    }

    pub const fn with_patch(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    pub fn minor(&self) -> u16 {
        self.minor
    }

    pub fn patch(&self) -> u16 {
        self.patch
    }

    /// True when this version is at least `major.minor`.
    pub fn is_at_least(&self, major: u16, minor: u16) -> bool {
        (self.major, self.minor) >= (major, minor)
    }

    /// True when this version is strictly before `major.minor`.
    pub fn is_older_than(&self, major: u16, minor: u16) -> bool {
        !self.is_at_least(major, minor)
    }
}

impl Default for RobotVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for RobotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

impl FromStr for RobotVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::Invalid(s.to_string());
        let mut parts = s.trim().split('.');
        let mut next_number = |required: bool| -> Result<Option<u16>, VersionError> {
            match parts.next() {
                Some(part) => part.parse::<u16>().map(Some).map_err(|_| invalid()),
                None if required => Err(invalid()),
                None => Ok(None),
            }
        };
        let major = next_number(true)?.ok_or_else(invalid)?;
        let minor = next_number(true)?.ok_or_else(invalid)?;
        let patch = next_number(false)?.unwrap_or(0);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::with_patch(major, minor, patch))
    }
}

impl Serialize for RobotVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RobotVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_major_minor_and_patch() {
        assert_eq!("3.1".parse::<RobotVersion>().unwrap(), RobotVersion::new(3, 1));
        assert_eq!(
            "3.1.2".parse::<RobotVersion>().unwrap(),
            RobotVersion::with_patch(3, 1, 2)
        );
    }

    #[test]
    fn rejects_malformed_versions() {
        for raw in ["", "3", "3.x", "3.1.2.4", "three.one"] {
            assert!(raw.parse::<RobotVersion>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn compares_by_major_then_minor() {
        let v = RobotVersion::new(3, 1);
        assert!(v.is_at_least(3, 1));
        assert!(v.is_at_least(2, 9));
        assert!(v.is_older_than(3, 2));
        assert!(RobotVersion::new(2, 9) < RobotVersion::new(3, 0));
    }

    #[test]
    fn displays_without_zero_patch() {
        assert_eq!(RobotVersion::new(3, 0).to_string(), "3.0");
        assert_eq!(RobotVersion::with_patch(3, 0, 4).to_string(), "3.0.4");
    }
}
