//! Batch protocol: many path-scoped operations in one call.
//!
//! Every batch runs in two phases:
//!
//! 1. **Resolve**: every path is parsed into a [`HivePath`]. An unknown hive
//!    fails the whole batch before any store access, so a malformed batch
//!    has no side effects.
//! 2. **Dispatch**: each resolved path is sent to the store independently.
//!    A failure on one path does not affect its siblings; each outcome is
//!    recorded under the original path string.
//!
//! A path string given more than once is dispatched once with the payloads
//! combined: values to put are concatenated with later names replacing
//! earlier ones, value names to delete are united.
//!
//! There is no ordering or atomicity guarantee across paths. For `list`,
//! a missing key is a normal outcome (`Ok(None)`), not an error.

use crate::error::{RegistryError, Result};
use crate::options::Options;
use crate::path::{segment_eq, HivePath};
use crate::store::{RawKey, RawValue, RegistryStore};
use std::collections::{btree_map, BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Kind of batch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Enumerate subkeys and values.
    List,
    /// Create keys.
    CreateKey,
    /// Write values.
    PutValue,
    /// Delete keys with their descendants.
    DeleteKey,
    /// Delete named values.
    DeleteValue,
}

impl Operation {
    /// Returns a short lowercase name, used in log events.
    pub fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::CreateKey => "create_key",
            Operation::PutValue => "put_value",
            Operation::DeleteKey => "delete_key",
            Operation::DeleteValue => "delete_value",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-path outcomes of a batch, keyed by the path strings as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult<T> {
    entries: BTreeMap<String, Result<T>>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> BatchResult<T> {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for a path, replacing any previous one.
    pub fn insert(&mut self, path: impl Into<String>, outcome: Result<T>) {
        self.entries.insert(path.into(), outcome);
    }

    /// Returns the outcome for a path.
    pub fn get(&self, path: &str) -> Option<&Result<T>> {
        self.entries.get(path)
    }

    /// Returns the successful outcome for a path.
    pub fn ok(&self, path: &str) -> Option<&T> {
        self.entries.get(path).and_then(|outcome| outcome.as_ref().ok())
    }

    /// Returns the error for a path.
    pub fn error(&self, path: &str) -> Option<&RegistryError> {
        self.entries.get(path).and_then(|outcome| outcome.as_ref().err())
    }

    /// Returns the number of paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the batch had no paths.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if every path succeeded.
    pub fn is_success(&self) -> bool {
        self.entries.values().all(Result::is_ok)
    }

    /// Iterates over the paths and their outcomes in path order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Result<T>> {
        self.entries.iter()
    }

    /// Iterates over the paths.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the failed paths and their errors.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &RegistryError)> {
        self.entries
            .iter()
            .filter_map(|(path, outcome)| outcome.as_ref().err().map(|err| (path.as_str(), err)))
    }

    /// Converts successful outcomes with `f`, keeping errors as they are.
    ///
    /// A conversion failure becomes that path's outcome.
    pub fn and_then<U, F>(self, mut f: F) -> BatchResult<U>
    where
        F: FnMut(&str, T) -> Result<U>,
    {
        let entries = self
            .entries
            .into_iter()
            .map(|(path, outcome)| {
                let converted = outcome.and_then(|value| f(&path, value));
                (path, converted)
            })
            .collect();
        BatchResult { entries }
    }

    /// Collapses the batch into a single result.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failed path in path order.
    pub fn into_result(self) -> Result<BTreeMap<String, T>> {
        self.entries
            .into_iter()
            .map(|(path, outcome)| outcome.map(|value| (path, value)))
            .collect()
    }

    /// Removes and returns the outcome of a path.
    pub fn remove(&mut self, path: &str) -> Option<Result<T>> {
        self.entries.remove(path)
    }
}

impl<T> IntoIterator for BatchResult<T> {
    type Item = (String, Result<T>);
    type IntoIter = btree_map::IntoIter<String, Result<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a BatchResult<T> {
    type Item = (&'a String, &'a Result<T>);
    type IntoIter = btree_map::Iter<'a, String, Result<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A batch request: one operation applied to many paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRequest {
    /// List each key.
    List(Vec<String>),
    /// Create each key.
    CreateKey(Vec<String>),
    /// Write the given values into each key.
    PutValue(Vec<(String, Vec<RawValue>)>),
    /// Delete each key.
    DeleteKey(Vec<String>),
    /// Delete the named values from each key.
    DeleteValue(Vec<(String, Vec<String>)>),
}

impl BatchRequest {
    /// Returns the operation kind.
    pub fn operation(&self) -> Operation {
        match self {
            BatchRequest::List(_) => Operation::List,
            BatchRequest::CreateKey(_) => Operation::CreateKey,
            BatchRequest::PutValue(_) => Operation::PutValue,
            BatchRequest::DeleteKey(_) => Operation::DeleteKey,
            BatchRequest::DeleteValue(_) => Operation::DeleteValue,
        }
    }
}

/// Outcome of [`execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Raw listing per path; `None` for a missing key.
    Listing(BatchResult<Option<RawKey>>),
    /// Unit success per path for mutating operations.
    Mutation(BatchResult<()>),
}

/// Executes a batch request against a store.
///
/// # Errors
///
/// Fails before any store access if a path has an unknown hive, or with the
/// first per-path error when [`Options::fail_fast`] is set.
pub fn execute<S: RegistryStore + ?Sized>(
    store: &S,
    request: BatchRequest,
    options: &Options,
) -> Result<BatchOutcome> {
    match request {
        BatchRequest::List(paths) => list(store, &paths, options).map(BatchOutcome::Listing),
        BatchRequest::CreateKey(paths) => {
            create_keys(store, &paths, options).map(BatchOutcome::Mutation)
        }
        BatchRequest::PutValue(requests) => {
            put_values(store, requests, options).map(BatchOutcome::Mutation)
        }
        BatchRequest::DeleteKey(paths) => {
            delete_keys(store, &paths, options).map(BatchOutcome::Mutation)
        }
        BatchRequest::DeleteValue(requests) => {
            delete_values(store, requests, options).map(BatchOutcome::Mutation)
        }
    }
}

/// Enumerates every key in `paths`.
///
/// A missing key yields `Ok(None)` for its path.
#[instrument(skip(store, options), fields(op = "list", count = paths.len()))]
pub fn list<S: RegistryStore + ?Sized>(
    store: &S,
    paths: &[String],
    options: &Options,
) -> Result<BatchResult<Option<RawKey>>> {
    run(Operation::List, without_payload(paths), options, merge_nothing, |path, ()| {
        match store.enumerate(path) {
            Err(RegistryError::KeyNotFound { .. }) => Ok(None),
            other => other,
        }
    })
}

/// Creates every key in `paths`. Existing keys are left untouched.
#[instrument(skip(store, options), fields(op = "create_key", count = paths.len()))]
pub fn create_keys<S: RegistryStore + ?Sized>(
    store: &S,
    paths: &[String],
    options: &Options,
) -> Result<BatchResult<()>> {
    run(Operation::CreateKey, without_payload(paths), options, merge_nothing, |path, ()| {
        store.create_key(path)
    })
}

/// Writes already-encoded values into each key.
///
/// The target key must exist unless [`Options::create_missing_on_put`] is
/// set, in which case it is created first.
#[instrument(skip(store, requests, options), fields(op = "put_value", count = requests.len()))]
pub fn put_values<S: RegistryStore + ?Sized>(
    store: &S,
    requests: Vec<(String, Vec<RawValue>)>,
    options: &Options,
) -> Result<BatchResult<()>> {
    let create_missing = options.create_missing_on_put;
    run(Operation::PutValue, requests, options, merge_values, |path, values| {
        if create_missing {
            store.create_key(path)?;
        }
        store.set_values(path, &values)
    })
}

/// Deletes every key in `paths` together with its descendants.
#[instrument(skip(store, options), fields(op = "delete_key", count = paths.len()))]
pub fn delete_keys<S: RegistryStore + ?Sized>(
    store: &S,
    paths: &[String],
    options: &Options,
) -> Result<BatchResult<()>> {
    run(Operation::DeleteKey, without_payload(paths), options, merge_nothing, |path, ()| {
        store.delete_key(path)
    })
}

/// Deletes the named values from each key. The empty name is the default
/// value.
#[instrument(skip(store, requests, options), fields(op = "delete_value", count = requests.len()))]
pub fn delete_values<S: RegistryStore + ?Sized>(
    store: &S,
    requests: Vec<(String, Vec<String>)>,
    options: &Options,
) -> Result<BatchResult<()>> {
    run(Operation::DeleteValue, requests, options, merge_names, |path, names| {
        store.delete_values(path, &names)
    })
}

fn without_payload(paths: &[String]) -> Vec<(String, ())> {
    paths.iter().map(|path| (path.clone(), ())).collect()
}

fn merge_nothing(_: &mut (), _: ()) {}

/// Later values replace earlier ones with the same name, ignoring case.
fn merge_values(values: &mut Vec<RawValue>, more: Vec<RawValue>) {
    for value in more {
        match values.iter_mut().find(|v| segment_eq(&v.name, &value.name)) {
            Some(slot) => *slot = value,
            None => values.push(value),
        }
    }
}

fn merge_names(names: &mut Vec<String>, more: Vec<String>) {
    for name in more {
        if !names.iter().any(|n| segment_eq(n, &name)) {
            names.push(name);
        }
    }
}

/// Resolves every path, then dispatches each one independently.
///
/// Payloads given for the same path string are combined with `merge` and
/// dispatched once.
fn run<P, T, M, F>(
    op: Operation,
    requests: Vec<(String, P)>,
    options: &Options,
    merge: M,
    mut dispatch: F,
) -> Result<BatchResult<T>>
where
    M: Fn(&mut P, P),
    F: FnMut(&HivePath, P) -> Result<T>,
{
    let mut index: HashMap<String, usize> = HashMap::with_capacity(requests.len());
    let mut merged: Vec<(String, P)> = Vec::with_capacity(requests.len());
    for (path, payload) in requests {
        match index.get(&path) {
            Some(&i) => {
                debug!(op = %op, path = %path, "Merging duplicate path");
                merge(&mut merged[i].1, payload);
            }
            None => {
                index.insert(path.clone(), merged.len());
                merged.push((path, payload));
            }
        }
    }

    let mut resolved = Vec::with_capacity(merged.len());
    for (path, payload) in merged {
        let hive_path = HivePath::parse(&path)?;
        resolved.push((path, hive_path, payload));
    }

    let mut result = BatchResult::new();
    let mut failed = 0usize;
    for (path, hive_path, payload) in resolved {
        debug!(op = %op, path = %path, "Dispatching");
        let outcome = dispatch(&hive_path, payload);

        if let Err(err) = &outcome {
            warn!(op = %op, path = %path, error = %err, "Path failed");
            if options.fail_fast {
                return Err(err.clone());
            }
            failed += 1;
        }
        result.insert(path, outcome);
    }

    info!(op = %op, total = result.len(), failed, "Batch complete");
    Ok(result)
}
