//! Public list/create/put/delete entry points.
//!
//! [`Registry`] validates and normalizes caller input, runs it through the
//! [batch protocol](crate::batch) and decodes listed values with the
//! [codec](crate::codec) according to the tag the store reported.
//!
//! With the `async` feature (on by default) every entry point has an
//! `_async` twin that runs the same call on Tokio's blocking pool and
//! resolves to the identical result. Deferred calls cannot be cancelled
//! once started.

use crate::batch::{self, BatchResult};
use crate::error::Result;
use crate::key::KeySnapshot;
use crate::options::Options;
use crate::path::HivePath;
use crate::store::{RawKey, RawValue, RegistryStore};
use crate::value::TypedValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One path or a sequence of paths.
///
/// Remembers whether the caller passed a single path: single-path mutating
/// calls fail with that path's error instead of returning a batch result
/// containing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathList {
    paths: Vec<String>,
    single: bool,
}

impl PathList {
    /// Returns the paths.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Returns true if the list was built from a single path.
    pub fn is_single(&self) -> bool {
        self.single
    }

    fn one(path: String) -> Self {
        Self {
            paths: vec![path],
            single: true,
        }
    }

    fn many(paths: Vec<String>) -> Self {
        Self {
            paths,
            single: false,
        }
    }
}

impl From<&str> for PathList {
    fn from(path: &str) -> Self {
        Self::one(path.to_string())
    }
}

impl From<String> for PathList {
    fn from(path: String) -> Self {
        Self::one(path)
    }
}

impl From<&String> for PathList {
    fn from(path: &String) -> Self {
        Self::one(path.clone())
    }
}

impl From<Vec<String>> for PathList {
    fn from(paths: Vec<String>) -> Self {
        Self::many(paths)
    }
}

impl From<Vec<&str>> for PathList {
    fn from(paths: Vec<&str>) -> Self {
        Self::many(paths.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for PathList {
    fn from(paths: &[String]) -> Self {
        Self::many(paths.to_vec())
    }
}

impl From<&[&str]> for PathList {
    fn from(paths: &[&str]) -> Self {
        Self::many(paths.iter().map(|p| p.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PathList {
    fn from(paths: [&str; N]) -> Self {
        Self::many(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// Values to write, by key path and value name.
pub type PutCollection = HashMap<String, HashMap<String, TypedValue>>;

/// Value names to delete, by key path.
pub type DeleteValueCollection = HashMap<String, Vec<String>>;

/// Typed, batched access to a registry store.
///
/// # Examples
///
/// ```rust
/// use regedit::{MemoryStore, Registry, TypedValue};
/// use std::collections::HashMap;
///
/// # fn main() -> regedit::Result<()> {
/// let registry = Registry::new(MemoryStore::new());
/// registry.create_key("HKCU\\Software\\App")?;
///
/// let mut values = HashMap::new();
/// values.insert("Theme".to_string(), TypedValue::sz("dark"));
/// registry.put_value([("HKCU\\Software\\App", values)])?;
///
/// let listing = registry.list("HKCU\\Software\\App")?;
/// let snapshot = listing.ok("HKCU\\Software\\App").unwrap();
/// assert_eq!(snapshot.value("Theme").and_then(TypedValue::as_str), Some("dark"));
/// # Ok(())
/// # }
/// ```
pub struct Registry<S> {
    store: Arc<S>,
    options: Options,
}

impl<S> Clone for Registry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options.clone(),
        }
    }
}

impl<S: RegistryStore> Registry<S> {
    /// Creates a facade over `store` with default options.
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Creates a facade over a shared store.
    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            options: Options::default(),
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the options in effect.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Lists subkeys and values of each key.
    ///
    /// A missing key yields a snapshot with `exists == false`. Each value is
    /// decoded by the tag the store reported; an unknown tag or malformed
    /// bytes fail that path.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownHive` before any store access if a path does not
    /// start with a known hive. A single-path call also fails with that
    /// path's error.
    pub fn list(&self, paths: impl Into<PathList>) -> Result<BatchResult<KeySnapshot>> {
        let paths = paths.into();
        let raw = batch::list(self.store.as_ref(), paths.paths(), &self.options)?;
        let decoded = raw.and_then(|path, key| match key {
            Some(key) => snapshot_from_raw(path, key),
            None => Ok(KeySnapshot::missing()),
        });
        single_or_batch(&paths, decoded)
    }

    /// Creates each key and any missing ancestors. Existing keys are left
    /// untouched.
    pub fn create_key(&self, paths: impl Into<PathList>) -> Result<BatchResult<()>> {
        let paths = paths.into();
        let result = batch::create_keys(self.store.as_ref(), paths.paths(), &self.options)?;
        single_or_batch(&paths, result)
    }

    /// Writes typed values, keyed by key path and value name.
    ///
    /// Each value's raw bytes and tag are forwarded as-is; nothing is
    /// re-encoded.
    pub fn put_value<I, K, M, N>(&self, collection: I) -> Result<BatchResult<()>>
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: IntoIterator<Item = (N, TypedValue)>,
        N: Into<String>,
    {
        let requests = put_requests(collection);
        batch::put_values(self.store.as_ref(), requests, &self.options)
    }

    /// Deletes each key with all of its descendants.
    pub fn delete_key(&self, paths: impl Into<PathList>) -> Result<BatchResult<()>> {
        let paths = paths.into();
        let result = batch::delete_keys(self.store.as_ref(), paths.paths(), &self.options)?;
        single_or_batch(&paths, result)
    }

    /// Deletes named values, keyed by key path. The empty name removes the
    /// key's default value only.
    pub fn delete_value<I, K, V, N>(&self, collection: I) -> Result<BatchResult<()>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let requests = delete_value_requests(collection);
        batch::delete_values(self.store.as_ref(), requests, &self.options)
    }

    /// Reads one value addressed as `HIVE\key\...\value-name`.
    ///
    /// Returns `Ok(None)` if the key or the value does not exist. The value
    /// name is matched ignoring case.
    pub fn get_value(&self, path: &str) -> Result<Option<TypedValue>> {
        let value_path = HivePath::parse_value_path(path)?;
        let name = value_path.value_name().unwrap_or_default().to_string();
        let display = value_path.key_path().to_string();

        let listing = self.list(display.as_str())?;
        let value = listing
            .ok(&display)
            .and_then(|snapshot| snapshot.value_ignore_case(&name))
            .cloned();
        Ok(value)
    }
}

#[cfg(feature = "async")]
impl<S: RegistryStore + 'static> Registry<S> {
    /// Deferred form of [`Registry::list`].
    pub async fn list_async(&self, paths: impl Into<PathList>) -> Result<BatchResult<KeySnapshot>> {
        let paths = paths.into();
        self.deferred(move |registry| registry.list(paths)).await
    }

    /// Deferred form of [`Registry::create_key`].
    pub async fn create_key_async(&self, paths: impl Into<PathList>) -> Result<BatchResult<()>> {
        let paths = paths.into();
        self.deferred(move |registry| registry.create_key(paths)).await
    }

    /// Deferred form of [`Registry::put_value`].
    pub async fn put_value_async<I, K, M, N>(&self, collection: I) -> Result<BatchResult<()>>
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: IntoIterator<Item = (N, TypedValue)>,
        N: Into<String>,
    {
        let requests = put_requests(collection);
        self.deferred(move |registry| {
            batch::put_values(registry.store.as_ref(), requests, &registry.options)
        })
        .await
    }

    /// Deferred form of [`Registry::delete_key`].
    pub async fn delete_key_async(&self, paths: impl Into<PathList>) -> Result<BatchResult<()>> {
        let paths = paths.into();
        self.deferred(move |registry| registry.delete_key(paths)).await
    }

    /// Deferred form of [`Registry::delete_value`].
    pub async fn delete_value_async<I, K, V, N>(&self, collection: I) -> Result<BatchResult<()>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let requests = delete_value_requests(collection);
        self.deferred(move |registry| {
            batch::delete_values(registry.store.as_ref(), requests, &registry.options)
        })
        .await
    }

    /// Runs a synchronous call on the blocking pool.
    async fn deferred<T, F>(&self, call: F) -> Result<T>
    where
        F: FnOnce(&Registry<S>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let registry = self.clone();
        tokio::task::spawn_blocking(move || call(&registry))
            .await
            .map_err(|err| crate::error::RegistryError::TaskFailed(err.to_string()))?
    }
}

#[cfg(windows)]
impl Registry<crate::windows::WindowsStore> {
    /// Creates a facade over the live system registry.
    pub fn system() -> Self {
        Self::new(crate::windows::WindowsStore::new())
    }
}

/// Decodes a raw listing into a snapshot, failing on the first bad value.
fn snapshot_from_raw(path: &str, key: RawKey) -> Result<KeySnapshot> {
    let mut values = HashMap::with_capacity(key.values.len());
    for RawValue {
        name,
        bytes,
        type_tag,
    } in key.values
    {
        let value = TypedValue::from_tagged(type_tag, bytes).map_err(|err| {
            debug!(path = %path, name = %name, type_tag, error = %err, "Value failed to decode");
            err
        })?;
        values.insert(name, value);
    }

    Ok(KeySnapshot {
        exists: true,
        subkeys: key.subkeys,
        values,
    })
}

/// Surfaces the only path's error for single-path calls.
fn single_or_batch<T>(paths: &PathList, result: BatchResult<T>) -> Result<BatchResult<T>> {
    if paths.is_single() {
        if let Some(err) = paths.paths().first().and_then(|path| result.error(path)) {
            return Err(err.clone());
        }
    }
    Ok(result)
}

fn put_requests<I, K, M, N>(collection: I) -> Vec<(String, Vec<RawValue>)>
where
    I: IntoIterator<Item = (K, M)>,
    K: Into<String>,
    M: IntoIterator<Item = (N, TypedValue)>,
    N: Into<String>,
{
    collection
        .into_iter()
        .map(|(path, values)| {
            let raw = values
                .into_iter()
                .map(|(name, value)| {
                    let (bytes, kind) = value.into_raw();
                    RawValue::new(name, bytes, kind.as_u32())
                })
                .collect();
            (path.into(), raw)
        })
        .collect()
}

fn delete_value_requests<I, K, V, N>(collection: I) -> Vec<(String, Vec<String>)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: IntoIterator<Item = N>,
    N: Into<String>,
{
    collection
        .into_iter()
        .map(|(path, names)| (path.into(), names.into_iter().map(Into::into).collect()))
        .collect()
}
