//! Registry path resolution.
//!
//! A registry path is a hive name or alias followed by zero or more key
//! names, separated by `\`:
//!
//! ```text
//! HKLM\Software\Microsoft\Windows\CurrentVersion
//! ^^^^ ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//! hive subkey path (case and whitespace preserved)
//! ```
//!
//! Resolution is pure parsing and never touches a store.

use crate::error::{RegistryError, Result};
use crate::hive::HiveId;
use crate::utils::PATH_SEPARATOR;
use std::fmt;

/// A resolved registry path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HivePath {
    hive: HiveId,
    segments: Vec<String>,
    value_name: Option<String>,
}

/// Resolves a path string into a [`HivePath`].
///
/// Shorthand for [`HivePath::parse`].
pub fn resolve(path: &str) -> Result<HivePath> {
    HivePath::parse(path)
}

impl HivePath {
    /// Creates a path to the root of `hive`.
    pub fn root(hive: HiveId) -> Self {
        Self {
            hive,
            segments: Vec::new(),
            value_name: None,
        }
    }

    /// Parses a key path.
    ///
    /// The first segment is matched against the hive names and aliases
    /// ignoring ASCII case; the remaining segments form the subkey path in
    /// their original case and order. Empty segments (doubled or trailing
    /// separators) are skipped. A bare hive resolves to its root.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownHive`] if the leading segment is not
    /// a known hive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use regedit::{HiveId, HivePath};
    ///
    /// let path = HivePath::parse("HKLM\\software\\x").unwrap();
    /// assert_eq!(path.hive(), HiveId::LocalMachine);
    /// assert_eq!(path.segments(), ["software", "x"]);
    ///
    /// assert!(HivePath::parse("hklm").unwrap().is_root());
    /// assert!(HivePath::parse("blah\\software").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self> {
        let mut parts = path.split(PATH_SEPARATOR);
        let hive_name = parts.next().unwrap_or_default();

        let hive =
            HiveId::from_name(hive_name).ok_or_else(|| RegistryError::unknown_hive(path, hive_name))?;

        let segments = parts
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            hive,
            segments,
            value_name: None,
        })
    }

    /// Parses a path whose final segment names a value.
    ///
    /// Everything before the last separator is resolved as a key path; the
    /// text after it (possibly empty, meaning the default value) becomes
    /// the trailing value name. A bare hive addresses the default value of
    /// the hive root.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownHive`] if the leading segment is not
    /// a known hive.
    pub fn parse_value_path(path: &str) -> Result<Self> {
        let (key_part, value_name) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((key_part, value_name)) => (key_part, value_name),
            None => (path, ""),
        };

        let mut resolved = Self::parse(key_part).map_err(|err| match err {
            RegistryError::UnknownHive { hive, .. } => RegistryError::unknown_hive(path, &hive),
            other => other,
        })?;
        resolved.value_name = Some(value_name.to_string());
        Ok(resolved)
    }

    /// Returns the hive.
    pub fn hive(&self) -> HiveId {
        self.hive
    }

    /// Returns the subkey segments below the hive.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the trailing value name, if this path addresses a value.
    pub fn value_name(&self) -> Option<&str> {
        self.value_name.as_deref()
    }

    /// Returns true if the path addresses the hive root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the subkey path joined with `\`, empty for the hive root.
    pub fn subkey_path(&self) -> String {
        self.segments.join("\\")
    }

    /// Returns the key path, dropping any trailing value name.
    pub fn key_path(&self) -> HivePath {
        Self {
            hive: self.hive,
            segments: self.segments.clone(),
            value_name: None,
        }
    }

    /// Returns the path of the parent key, or `None` for a hive root.
    pub fn parent(&self) -> Option<HivePath> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            hive: self.hive,
            segments: parent.to_vec(),
            value_name: None,
        })
    }

    /// Returns the path of a direct subkey.
    pub fn join(&self, segment: &str) -> HivePath {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self {
            hive: self.hive,
            segments,
            value_name: None,
        }
    }

    /// Compares two key paths the way the registry does: hives exactly,
    /// segment names ignoring case.
    pub fn key_eq(&self, other: &HivePath) -> bool {
        self.hive == other.hive
            && self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| segment_eq(a, b))
    }
}

/// Compares two key names ignoring case.
pub fn segment_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

impl fmt::Display for HivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hive.name())?;
        for segment in &self.segments {
            write!(f, "{}{}", PATH_SEPARATOR, segment)?;
        }
        if let Some(name) = &self.value_name {
            write!(f, "{}{}", PATH_SEPARATOR, name)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for HivePath {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
