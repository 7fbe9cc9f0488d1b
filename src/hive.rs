//! Predefined registry hives.

use crate::error::{RegistryError, Result};
use std::fmt;

/// One of the predefined top-level registry roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HiveId {
    /// `HKEY_LOCAL_MACHINE` (`HKLM`).
    LocalMachine,

    /// `HKEY_CURRENT_USER` (`HKCU`).
    CurrentUser,

    /// `HKEY_CLASSES_ROOT` (`HKCR`).
    ClassesRoot,

    /// `HKEY_USERS` (`HKU`).
    Users,

    /// `HKEY_CURRENT_CONFIG` (`HKCC`).
    CurrentConfig,
}

impl HiveId {
    /// All hives.
    pub const ALL: [HiveId; 5] = [
        HiveId::LocalMachine,
        HiveId::CurrentUser,
        HiveId::ClassesRoot,
        HiveId::Users,
        HiveId::CurrentConfig,
    ];

    /// Matches a hive name or alias, ignoring ASCII case.
    ///
    /// Returns `None` if `name` is not a known hive.
    pub fn from_name(name: &str) -> Option<Self> {
        HiveId::ALL.into_iter().find(|hive| {
            name.eq_ignore_ascii_case(hive.name()) || name.eq_ignore_ascii_case(hive.alias())
        })
    }

    /// Parses a hive name or alias.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownHive`] if `name` does not match.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| RegistryError::unknown_hive(name, name))
    }

    /// Returns the full hive name, e.g. `HKEY_LOCAL_MACHINE`.
    pub fn name(self) -> &'static str {
        match self {
            HiveId::LocalMachine => "HKEY_LOCAL_MACHINE",
            HiveId::CurrentUser => "HKEY_CURRENT_USER",
            HiveId::ClassesRoot => "HKEY_CLASSES_ROOT",
            HiveId::Users => "HKEY_USERS",
            HiveId::CurrentConfig => "HKEY_CURRENT_CONFIG",
        }
    }

    /// Returns the short alias, e.g. `HKLM`.
    pub fn alias(self) -> &'static str {
        match self {
            HiveId::LocalMachine => "HKLM",
            HiveId::CurrentUser => "HKCU",
            HiveId::ClassesRoot => "HKCR",
            HiveId::Users => "HKU",
            HiveId::CurrentConfig => "HKCC",
        }
    }
}

impl fmt::Display for HiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
