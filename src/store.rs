//! Interface to the underlying registry store.
//!
//! Stores are the only place where keys are actually opened, enumerated or
//! written. Everything above them works on resolved [`HivePath`]s and raw
//! `(bytes, type tag)` pairs; decoding happens in the facade.

use crate::error::Result;
use crate::path::HivePath;
use crate::value::TypedValue;

/// A value as stored: name, raw bytes and numeric type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    /// Value name; empty for the default value.
    pub name: String,

    /// Raw encoded bytes.
    pub bytes: Vec<u8>,

    /// Numeric `REG_*` type tag as reported by the store.
    pub type_tag: u32,
}

impl RawValue {
    /// Creates a raw value.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, type_tag: u32) -> Self {
        Self {
            name: name.into(),
            bytes,
            type_tag,
        }
    }

    /// Extracts the already-encoded bytes and tag of a typed value.
    pub fn from_typed(name: impl Into<String>, value: &TypedValue) -> Self {
        Self::new(name, value.raw().to_vec(), value.kind().as_u32())
    }
}

/// Contents of an existing key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawKey {
    /// Subkey names in enumeration order.
    pub subkeys: Vec<String>,

    /// Values in enumeration order.
    pub values: Vec<RawValue>,
}

/// Native registry access.
///
/// Every method works on a single key and blocks until the store answers.
/// Implementations must report a missing key as
/// [`RegistryError::KeyNotFound`](crate::RegistryError::KeyNotFound) and a
/// refused operation as
/// [`RegistryError::AccessDenied`](crate::RegistryError::AccessDenied) so
/// callers can tell the two apart.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn RegistryStore>`.
pub trait RegistryStore: Send + Sync {
    /// Enumerates the subkeys and values of a key.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The key does not exist.
    /// * `Ok(Some(key))` - The key's subkeys and values.
    /// * `Err(_)` - The key could not be read.
    fn enumerate(&self, path: &HivePath) -> Result<Option<RawKey>>;

    /// Creates a key and any missing ancestors.
    ///
    /// Creating an existing key succeeds without modifying it.
    fn create_key(&self, path: &HivePath) -> Result<()>;

    /// Writes values into an existing key, creating or overwriting each.
    ///
    /// Writes are not atomic across `values` in general. The Windows store
    /// writes them one at a time, so a failure partway through leaves the
    /// earlier values written. [`MemoryStore`](crate::MemoryStore) checks
    /// the key once under its write lock and then writes every value, so
    /// it applies all or none.
    fn set_values(&self, path: &HivePath, values: &[RawValue]) -> Result<()>;

    /// Deletes a key and all of its descendants.
    fn delete_key(&self, path: &HivePath) -> Result<()>;

    /// Deletes named values from an existing key.
    fn delete_values(&self, path: &HivePath, names: &[String]) -> Result<()>;
}

impl<T: RegistryStore + ?Sized> RegistryStore for Box<T> {
    fn enumerate(&self, path: &HivePath) -> Result<Option<RawKey>> {
        self.as_ref().enumerate(path)
    }

    fn create_key(&self, path: &HivePath) -> Result<()> {
        self.as_ref().create_key(path)
    }

    fn set_values(&self, path: &HivePath, values: &[RawValue]) -> Result<()> {
        self.as_ref().set_values(path, values)
    }

    fn delete_key(&self, path: &HivePath) -> Result<()> {
        self.as_ref().delete_key(path)
    }

    fn delete_values(&self, path: &HivePath, names: &[String]) -> Result<()> {
        self.as_ref().delete_values(path, names)
    }
}

impl<T: RegistryStore + ?Sized> RegistryStore for std::sync::Arc<T> {
    fn enumerate(&self, path: &HivePath) -> Result<Option<RawKey>> {
        self.as_ref().enumerate(path)
    }

    fn create_key(&self, path: &HivePath) -> Result<()> {
        self.as_ref().create_key(path)
    }

    fn set_values(&self, path: &HivePath, values: &[RawValue]) -> Result<()> {
        self.as_ref().set_values(path, values)
    }

    fn delete_key(&self, path: &HivePath) -> Result<()> {
        self.as_ref().delete_key(path)
    }

    fn delete_values(&self, path: &HivePath, names: &[String]) -> Result<()> {
        self.as_ref().delete_values(path, names)
    }
}
