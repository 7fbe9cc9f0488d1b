//! Configuration for [`Registry`](crate::Registry).

/// Behavior switches for batch operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Create the target key before writing values to it.
    ///
    /// When unset, putting values under a missing key fails for that path
    /// with `KeyNotFound`.
    pub create_missing_on_put: bool,

    /// Abort a batch at the first failing path.
    ///
    /// When set, the batch call itself fails with that path's error and the
    /// remaining paths are not dispatched. When unset, every path runs and
    /// its outcome is reported separately.
    pub fail_fast: bool,
}

impl Options {
    /// Returns the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`Options::create_missing_on_put`].
    pub fn with_create_missing_on_put(mut self, enabled: bool) -> Self {
        self.create_missing_on_put = enabled;
        self
    }

    /// Sets [`Options::fail_fast`].
    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Loads options from JSON. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|err| crate::RegistryError::InvalidOptions(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = Options::new()
            .with_create_missing_on_put(true)
            .with_fail_fast(true);
        assert!(options.create_missing_on_put);
        assert!(options.fail_fast);
        assert_eq!(Options::default(), Options::new());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let options = Options::from_json(r#"{ "create_missing_on_put": true }"#).unwrap();
        assert!(options.create_missing_on_put);
        assert!(!options.fail_fast);

        assert!(Options::from_json("not json").is_err());
    }
}
