//! In-process registry store.
//!
//! [`MemoryStore`] keeps one key tree per hive behind an `RwLock`. Key and
//! value names are matched ignoring case and keep the casing they were
//! created with; subkeys and values enumerate in insertion order.

use crate::error::{RegistryError, Result};
use crate::hive::HiveId;
use crate::path::{segment_eq, HivePath};
use crate::store::{RawKey, RawValue, RegistryStore};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct Node {
    name: String,
    subkeys: Vec<Node>,
    values: Vec<RawValue>,
    denied: bool,
}

impl Node {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.subkeys.iter().find(|node| segment_eq(&node.name, name))
    }

    fn child_index(&self, name: &str) -> Option<usize> {
        self.subkeys.iter().position(|node| segment_eq(&node.name, name))
    }

    fn value_index(&self, name: &str) -> Option<usize> {
        self.values.iter().position(|value| segment_eq(&value.name, name))
    }

    fn any_denied(&self) -> bool {
        self.denied || self.subkeys.iter().any(Node::any_denied)
    }
}

/// Thread-safe in-memory [`RegistryStore`].
///
/// Every hive root exists from the start and cannot be deleted. Subtrees
/// can be marked with [`MemoryStore::deny`] to make every operation on them
/// fail with `AccessDenied`.
#[derive(Debug)]
pub struct MemoryStore {
    hives: RwLock<HashMap<HiveId, Node>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a store with empty hive roots.
    pub fn new() -> Self {
        let hives = HiveId::ALL
            .into_iter()
            .map(|hive| (hive, Node::named(hive.name())))
            .collect();
        Self {
            hives: RwLock::new(hives),
        }
    }

    /// Marks a key (creating it if needed) as access-denied.
    ///
    /// Reads and writes on the key or any of its descendants, and deletion
    /// of any ancestor, fail with `AccessDenied` afterwards.
    pub fn deny(&self, path: &HivePath) -> Result<()> {
        self.with_hive_mut(path, |root| {
            let mut node = root;
            for segment in path.segments() {
                let index = match node.child_index(segment) {
                    Some(index) => index,
                    None => {
                        node.subkeys.push(Node::named(segment));
                        node.subkeys.len() - 1
                    }
                };
                node = &mut node.subkeys[index];
            }
            node.denied = true;
            Ok(())
        })
    }

    /// Writes a value, creating the key and its ancestors if needed.
    ///
    /// Ignores access-denied marks; intended for seeding test fixtures.
    pub fn seed(&self, path: &HivePath, value: RawValue) -> Result<()> {
        self.with_hive_mut(path, |root| {
            let mut node = root;
            for segment in path.segments() {
                let index = match node.child_index(segment) {
                    Some(index) => index,
                    None => {
                        node.subkeys.push(Node::named(segment));
                        node.subkeys.len() - 1
                    }
                };
                node = &mut node.subkeys[index];
            }
            upsert_value(node, value);
            Ok(())
        })
    }

    fn with_hive<T>(&self, path: &HivePath, f: impl FnOnce(&Node) -> Result<T>) -> Result<T> {
        let hives = self
            .hives
            .read()
            .map_err(|_| RegistryError::Store("memory store lock poisoned".to_string()))?;
        let root = hives
            .get(&path.hive())
            .ok_or_else(|| RegistryError::key_not_found(&path.to_string()))?;
        f(root)
    }

    fn with_hive_mut<T>(
        &self,
        path: &HivePath,
        f: impl FnOnce(&mut Node) -> Result<T>,
    ) -> Result<T> {
        let mut hives = self
            .hives
            .write()
            .map_err(|_| RegistryError::Store("memory store lock poisoned".to_string()))?;
        let root = hives
            .get_mut(&path.hive())
            .ok_or_else(|| RegistryError::key_not_found(&path.to_string()))?;
        f(root)
    }
}

/// Walks to the key at `path`, failing on any denied key along the way.
///
/// Returns `Ok(None)` if a segment does not exist.
fn find<'a>(root: &'a Node, path: &HivePath) -> Result<Option<&'a Node>> {
    let mut node = root;
    if node.denied {
        return Err(RegistryError::access_denied(&path.to_string()));
    }
    for segment in path.segments() {
        node = match node.child(segment) {
            Some(child) => child,
            None => return Ok(None),
        };
        if node.denied {
            return Err(RegistryError::access_denied(&path.to_string()));
        }
    }
    Ok(Some(node))
}

/// Mutable variant of [`find`] that reports a missing key as `KeyNotFound`.
fn find_mut<'a>(root: &'a mut Node, path: &HivePath) -> Result<&'a mut Node> {
    let key_path = path.to_string();
    let mut node = root;
    if node.denied {
        return Err(RegistryError::access_denied(&key_path));
    }
    for segment in path.segments() {
        let index = node
            .child_index(segment)
            .ok_or_else(|| RegistryError::key_not_found(&key_path))?;
        node = &mut node.subkeys[index];
        if node.denied {
            return Err(RegistryError::access_denied(&key_path));
        }
    }
    Ok(node)
}

fn upsert_value(node: &mut Node, value: RawValue) {
    match node.value_index(&value.name) {
        Some(index) => node.values[index] = value,
        None => node.values.push(value),
    }
}

impl RegistryStore for MemoryStore {
    fn enumerate(&self, path: &HivePath) -> Result<Option<RawKey>> {
        self.with_hive(path, |root| {
            let key = find(root, path)?.map(|node| RawKey {
                subkeys: node.subkeys.iter().map(|child| child.name.clone()).collect(),
                values: node.values.clone(),
            });
            debug!(path = %path, exists = key.is_some(), "Enumerated key");
            Ok(key)
        })
    }

    fn create_key(&self, path: &HivePath) -> Result<()> {
        let key_path = path.to_string();
        self.with_hive_mut(path, |root| {
            let mut node = root;
            if node.denied {
                return Err(RegistryError::access_denied(&key_path));
            }
            for segment in path.segments() {
                let index = match node.child_index(segment) {
                    Some(index) => index,
                    None => {
                        debug!(path = %key_path, segment = %segment, "Creating key");
                        node.subkeys.push(Node::named(segment));
                        node.subkeys.len() - 1
                    }
                };
                node = &mut node.subkeys[index];
                if node.denied {
                    return Err(RegistryError::access_denied(&key_path));
                }
            }
            Ok(())
        })
    }

    fn set_values(&self, path: &HivePath, values: &[RawValue]) -> Result<()> {
        self.with_hive_mut(path, |root| {
            let node = find_mut(root, path)?;
            for value in values {
                debug!(
                    path = %path,
                    name = %value.name,
                    type_tag = value.type_tag,
                    bytes = %hex::encode(&value.bytes),
                    "Setting value"
                );
                upsert_value(node, value.clone());
            }
            Ok(())
        })
    }

    fn delete_key(&self, path: &HivePath) -> Result<()> {
        let key_path = path.to_string();
        let parent_path = path
            .parent()
            .ok_or_else(|| RegistryError::access_denied(&key_path))?;
        let name = path.segments().last().cloned().unwrap_or_default();

        self.with_hive_mut(path, |root| {
            let parent = find_mut(root, &parent_path).map_err(|err| match err {
                RegistryError::KeyNotFound { .. } => RegistryError::key_not_found(&key_path),
                RegistryError::AccessDenied { .. } => RegistryError::access_denied(&key_path),
                other => other,
            })?;
            let index = parent
                .child_index(&name)
                .ok_or_else(|| RegistryError::key_not_found(&key_path))?;
            if parent.subkeys[index].any_denied() {
                return Err(RegistryError::access_denied(&key_path));
            }
            debug!(path = %key_path, "Deleting key tree");
            parent.subkeys.remove(index);
            Ok(())
        })
    }

    fn delete_values(&self, path: &HivePath, names: &[String]) -> Result<()> {
        let key_path = path.to_string();
        self.with_hive_mut(path, |root| {
            let node = find_mut(root, path)?;
            if let Some(missing) = names.iter().find(|name| node.value_index(name).is_none()) {
                return Err(RegistryError::value_not_found(&key_path, missing));
            }
            for name in names {
                if let Some(index) = node.value_index(name) {
                    debug!(path = %key_path, name = %name, "Deleting value");
                    node.values.remove(index);
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> HivePath {
        HivePath::parse(s).unwrap()
    }

    #[test]
    fn test_hive_roots_exist() {
        let store = MemoryStore::new();
        for hive in HiveId::ALL {
            let key = store.enumerate(&HivePath::root(hive)).unwrap();
            assert_eq!(key, Some(RawKey::default()));
        }
    }

    #[test]
    fn test_create_is_idempotent_and_case_insensitive() {
        let store = MemoryStore::new();
        store.create_key(&path("HKCU\\Software\\App")).unwrap();
        store
            .set_values(&path("HKCU\\Software\\App"), &[RawValue::new("x", vec![1], 3)])
            .unwrap();
        store.create_key(&path("hkcu\\SOFTWARE\\app")).unwrap();

        let key = store.enumerate(&path("HKCU\\software")).unwrap().unwrap();
        assert_eq!(key.subkeys, vec!["App".to_string()]);

        let key = store.enumerate(&path("HKCU\\Software\\APP")).unwrap().unwrap();
        assert_eq!(key.values.len(), 1);
    }

    #[test]
    fn test_enumerate_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.enumerate(&path("HKCU\\not_exist")).unwrap(), None);
    }

    #[test]
    fn test_set_values_requires_existing_key() {
        let store = MemoryStore::new();
        let err = store
            .set_values(&path("HKCU\\missing"), &[RawValue::new("x", vec![], 0)])
            .unwrap_err();
        assert!(matches!(err, RegistryError::KeyNotFound { .. }));
    }

    #[test]
    fn test_set_values_is_all_or_nothing() {
        let store = MemoryStore::new();
        store.create_key(&path("HKCU\\Locked")).unwrap();
        store
            .seed(&path("HKCU\\Locked"), RawValue::new("Old", vec![1], 3))
            .unwrap();
        store.deny(&path("HKCU\\Locked")).unwrap();

        let err = store
            .set_values(
                &path("HKCU\\Locked"),
                &[RawValue::new("A", vec![], 3), RawValue::new("B", vec![], 3)],
            )
            .unwrap_err();
        assert!(err.is_access_denied());

        let hives = store.hives.read().unwrap();
        let locked = hives[&HiveId::CurrentUser].child("Locked").unwrap();
        assert_eq!(locked.values, vec![RawValue::new("Old", vec![1], 3)]);
    }

    #[test]
    fn test_set_values_overwrites_ignoring_case() {
        let store = MemoryStore::new();
        let key = path("HKCU\\App");
        store.create_key(&key).unwrap();
        store.set_values(&key, &[RawValue::new("Name", vec![1], 3)]).unwrap();
        store.set_values(&key, &[RawValue::new("name", vec![2, 0, 0, 0], 4)]).unwrap();

        let raw = store.enumerate(&key).unwrap().unwrap();
        assert_eq!(raw.values, vec![RawValue::new("name", vec![2, 0, 0, 0], 4)]);
    }

    #[test]
    fn test_delete_key_removes_descendants() {
        let store = MemoryStore::new();
        store.create_key(&path("HKCU\\A\\B\\C")).unwrap();
        store.delete_key(&path("HKCU\\a")).unwrap();

        assert_eq!(store.enumerate(&path("HKCU\\A\\B")).unwrap(), None);
        assert!(store.enumerate(&path("HKCU")).unwrap().unwrap().subkeys.is_empty());

        let err = store.delete_key(&path("HKCU\\A")).unwrap_err();
        assert!(matches!(err, RegistryError::KeyNotFound { .. }));
    }

    #[test]
    fn test_delete_hive_root_is_denied() {
        let store = MemoryStore::new();
        assert!(store.delete_key(&path("HKLM")).unwrap_err().is_access_denied());
    }

    #[test]
    fn test_delete_values() {
        let store = MemoryStore::new();
        let key = path("HKCU\\App");
        store.create_key(&key).unwrap();
        store
            .set_values(
                &key,
                &[RawValue::new("", vec![], 1), RawValue::new("Other", vec![], 1)],
            )
            .unwrap();

        store.delete_values(&key, &[String::new()]).unwrap();
        let raw = store.enumerate(&key).unwrap().unwrap();
        assert_eq!(raw.values, vec![RawValue::new("Other", vec![], 1)]);

        let err = store.delete_values(&key, &["nope".to_string()]).unwrap_err();
        assert_eq!(err, RegistryError::value_not_found("HKEY_CURRENT_USER\\App", "nope"));
    }

    #[test]
    fn test_denied_subtree() {
        let store = MemoryStore::new();
        store.create_key(&path("HKLM\\SAM\\Domains")).unwrap();
        store.deny(&path("HKLM\\SAM")).unwrap();

        assert!(store.enumerate(&path("HKLM\\SAM")).unwrap_err().is_access_denied());
        assert!(store
            .enumerate(&path("HKLM\\SAM\\Domains"))
            .unwrap_err()
            .is_access_denied());
        assert!(store.create_key(&path("HKLM\\SAM\\New")).unwrap_err().is_access_denied());
        assert!(store.delete_key(&path("HKLM\\SAM")).unwrap_err().is_access_denied());

        // Siblings are unaffected
        store.create_key(&path("HKLM\\Software")).unwrap();
        assert!(store.enumerate(&path("HKLM")).unwrap().is_some());
    }
}
