//! Error types for registry access operations.
//!
//! Errors fall into three groups: parsing errors raised before any store
//! access (`UnknownHive`), codec errors (`MalformedValue`,
//! `UnsupportedLogicalType`, `UnknownRegistryType`) and per-path store
//! errors (`AccessDenied`, `KeyNotFound`, `ValueNotFound`, `Io`, `Store`).

use crate::value_type::RegistryValueType;
use std::io;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while resolving, encoding or accessing registry data.
///
/// The error is `Clone` so that per-path outcomes can be copied out of a
/// [`BatchResult`](crate::batch::BatchResult).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The leading path segment is not a known hive name or alias.
    #[error("Invalid hive: {hive:?} (path: {path:?})")]
    UnknownHive {
        /// Full path as given by the caller.
        path: String,
        /// Leading segment that failed to resolve.
        hive: String,
    },

    /// The store refused the operation for the caller's principal.
    #[error("Access denied: {path}")]
    AccessDenied {
        /// Path the operation targeted.
        path: String,
    },

    /// A fixed-width value received the wrong number of bytes.
    #[error("Malformed {} value: expected {expected} bytes, got {actual} bytes", .kind.name())]
    MalformedValue {
        /// Variant being decoded.
        kind: RegistryValueType,
        /// Required byte length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// A logical value does not have the shape the target variant requires.
    #[error("Unsupported logical type for {}: got {found}", .kind.name())]
    UnsupportedLogicalType {
        /// Target variant.
        kind: RegistryValueType,
        /// Shape that was supplied.
        found: &'static str,
    },

    /// The store reported a type tag with no codec variant.
    #[error("Unknown registry type {0:#x}")]
    UnknownRegistryType(u32),

    /// The targeted key does not exist.
    #[error("Key not found: {path}")]
    KeyNotFound {
        /// Path of the missing key.
        path: String,
    },

    /// A named value does not exist under an existing key.
    #[error("Value {name:?} not found under {path}")]
    ValueNotFound {
        /// Path of the key.
        path: String,
        /// Missing value name (empty for the default value).
        name: String,
    },

    /// Any other I/O failure reported by the store.
    #[error("I/O error ({kind:?}): {message}")]
    Io {
        /// Kind of the underlying `io::Error`.
        kind: io::ErrorKind,
        /// Rendered message of the underlying `io::Error`.
        message: String,
    },

    /// Store failure that did not originate from the operating system.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration could not be loaded.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The task running a deferred (async) call panicked or was cancelled.
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl From<io::Error> for RegistryError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl RegistryError {
    /// Creates an unknown hive error.
    ///
    /// # Arguments
    ///
    /// * `path` - Full path that was being resolved
    /// * `hive` - Leading segment that did not match
    pub fn unknown_hive(path: &str, hive: &str) -> Self {
        Self::UnknownHive {
            path: path.to_string(),
            hive: hive.to_string(),
        }
    }

    /// Creates an access denied error for a path.
    pub fn access_denied(path: &str) -> Self {
        Self::AccessDenied {
            path: path.to_string(),
        }
    }

    /// Creates a key not found error for a path.
    pub fn key_not_found(path: &str) -> Self {
        Self::KeyNotFound {
            path: path.to_string(),
        }
    }

    /// Creates a value not found error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use regedit::error::RegistryError;
    /// let err = RegistryError::value_not_found("HKCU\\Software\\App", "Theme");
    /// assert!(err.is_not_found());
    /// ```
    pub fn value_not_found(path: &str, name: &str) -> Self {
        Self::ValueNotFound {
            path: path.to_string(),
            name: name.to_string(),
        }
    }

    /// Creates a malformed value error for a fixed-width variant.
    pub fn malformed(kind: RegistryValueType, expected: usize, actual: usize) -> Self {
        Self::MalformedValue {
            kind,
            expected,
            actual,
        }
    }

    /// Classifies an `io::Error` raised by a store for `path`.
    ///
    /// `NotFound` maps to [`RegistryError::KeyNotFound`], `PermissionDenied`
    /// to [`RegistryError::AccessDenied`], anything else to
    /// [`RegistryError::Io`].
    pub fn from_io(path: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::key_not_found(path),
            io::ErrorKind::PermissionDenied => Self::access_denied(path),
            _ => err.into(),
        }
    }

    /// Returns true for [`RegistryError::AccessDenied`].
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Returns true for [`RegistryError::KeyNotFound`] and [`RegistryError::ValueNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. } | Self::ValueNotFound { .. })
    }
}
