//! Point-in-time view of a registry key.

use crate::value::TypedValue;
use std::collections::HashMap;

/// Result of listing one key.
///
/// Built fresh for every list call and never cached, so it reflects the
/// store at the instant the key was read. Two snapshots taken in the same
/// batch are not mutually consistent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySnapshot {
    /// Whether the key existed.
    pub exists: bool,

    /// Subkey names in the order the store enumerated them.
    pub subkeys: Vec<String>,

    /// Values by name; the empty name is the key's default value.
    pub values: HashMap<String, TypedValue>,
}

impl KeySnapshot {
    /// Snapshot of a key that does not exist.
    pub fn missing() -> Self {
        Self::default()
    }

    /// Returns a value by exact name.
    pub fn value(&self, name: &str) -> Option<&TypedValue> {
        self.values.get(name)
    }

    /// Returns a value by name, ignoring case as the registry does.
    pub fn value_ignore_case(&self, name: &str) -> Option<&TypedValue> {
        self.values.get(name).or_else(|| {
            self.values
                .iter()
                .find(|(candidate, _)| crate::path::segment_eq(candidate, name))
                .map(|(_, value)| value)
        })
    }

    /// Returns the key's default (unnamed) value.
    pub fn default_value(&self) -> Option<&TypedValue> {
        self.values.get("")
    }

    /// Returns true if a subkey with this name exists, ignoring case.
    pub fn has_subkey(&self, name: &str) -> bool {
        self.subkeys
            .iter()
            .any(|subkey| crate::path::segment_eq(subkey, name))
    }

    /// Returns true if this key has subkeys.
    pub fn has_subkeys(&self) -> bool {
        !self.subkeys.is_empty()
    }

    /// Returns true if this key has values.
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_snapshot() {
        let snapshot = KeySnapshot::missing();
        assert!(!snapshot.exists);
        assert!(!snapshot.has_subkeys());
        assert!(!snapshot.has_values());
    }

    #[test]
    fn test_lookups_ignore_case() {
        let mut snapshot = KeySnapshot {
            exists: true,
            subkeys: vec!["Policies".to_string()],
            values: HashMap::new(),
        };
        snapshot
            .values
            .insert("ProgramFilesDir".to_string(), TypedValue::sz("C:\\Program Files"));
        snapshot.values.insert(String::new(), TypedValue::sz("default"));

        assert!(snapshot.has_subkey("policies"));
        assert!(snapshot.value("programfilesdir").is_none());
        assert_eq!(
            snapshot.value_ignore_case("programfilesdir").and_then(TypedValue::as_str),
            Some("C:\\Program Files")
        );
        assert_eq!(
            snapshot.default_value().and_then(TypedValue::as_str),
            Some("default")
        );
    }
}
