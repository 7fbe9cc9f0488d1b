//! Typed registry values.
//!
//! A [`TypedValue`] pairs a [`RegistryValueType`] with its raw bytes and the
//! decoded [`LogicalValue`]. All constructors go through the codec, so the
//! raw bytes are always a valid encoding for the tag.

use crate::codec::{self, LogicalValue};
use crate::error::Result;
use crate::utils::expand_environment_strings;
use crate::value_type::RegistryValueType;
use std::fmt;

/// A registry value: type tag, raw bytes and decoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTypedValue", into = "RawTypedValue"))]
pub struct TypedValue {
    kind: RegistryValueType,
    raw: Vec<u8>,
    value: LogicalValue,
}

impl TypedValue {
    /// Creates a value by encoding `value` with the layout of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedLogicalType` if the shape of `value` does not
    /// match `kind`.
    pub fn new(kind: RegistryValueType, value: LogicalValue) -> Result<Self> {
        let raw = codec::encode(&value, kind)?;
        Ok(Self { kind, raw, value })
    }

    /// Creates a value from raw bytes, validating them against `kind`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedValue` if `raw` has the wrong length for a
    /// fixed-width variant.
    pub fn from_raw(kind: RegistryValueType, raw: Vec<u8>) -> Result<Self> {
        let value = codec::decode(&raw, kind)?;
        Ok(Self { kind, raw, value })
    }

    /// Creates a value from raw bytes and a store-reported numeric tag.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegistryType` for an unknown tag, or `MalformedValue`.
    pub fn from_tagged(type_tag: u32, raw: Vec<u8>) -> Result<Self> {
        Self::from_raw(RegistryValueType::from_u32(type_tag)?, raw)
    }

    // Infallible constructors: the shape always matches the tag.
    fn encoded(kind: RegistryValueType, value: LogicalValue, raw: Vec<u8>) -> Self {
        Self { kind, raw, value }
    }

    /// REG_SZ value.
    pub fn sz(value: impl Into<String>) -> Self {
        Self::string(RegistryValueType::Sz, value.into())
    }

    /// REG_EXPAND_SZ value.
    pub fn expand_sz(value: impl Into<String>) -> Self {
        Self::string(RegistryValueType::ExpandSz, value.into())
    }

    /// REG_LINK value.
    pub fn link(value: impl Into<String>) -> Self {
        Self::string(RegistryValueType::Link, value.into())
    }

    fn string(kind: RegistryValueType, value: String) -> Self {
        let raw = crate::utils::encode_utf16le(&value);
        Self::encoded(kind, LogicalValue::String(value), raw)
    }

    /// REG_MULTI_SZ value.
    pub fn multi_sz<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let raw = crate::utils::encode_utf16le(&values.join("\0"));
        Self::encoded(RegistryValueType::MultiSz, LogicalValue::MultiString(values), raw)
    }

    /// REG_DWORD value (little-endian).
    pub fn dword(value: i32) -> Self {
        Self::encoded(
            RegistryValueType::Dword,
            LogicalValue::Int32(value),
            value.to_le_bytes().to_vec(),
        )
    }

    /// REG_DWORD_BIG_ENDIAN value.
    pub fn dword_big_endian(value: i32) -> Self {
        Self::encoded(
            RegistryValueType::DwordBigEndian,
            LogicalValue::Int32(value),
            value.to_be_bytes().to_vec(),
        )
    }

    /// REG_QWORD value.
    pub fn qword(value: i64) -> Self {
        Self::encoded(
            RegistryValueType::Qword,
            LogicalValue::Int64(value),
            value.to_le_bytes().to_vec(),
        )
    }

    /// REG_BINARY value.
    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Self::opaque(RegistryValueType::Binary, value.into())
    }

    /// REG_NONE value with no data.
    pub fn none() -> Self {
        Self::opaque(RegistryValueType::None, Vec::new())
    }

    /// REG_RESOURCE_LIST value.
    pub fn resource_list(value: impl Into<Vec<u8>>) -> Self {
        Self::opaque(RegistryValueType::ResourceList, value.into())
    }

    /// REG_FULL_RESOURCE_DESCRIPTOR value.
    pub fn full_resource_descriptor(value: impl Into<Vec<u8>>) -> Self {
        Self::opaque(RegistryValueType::FullResourceDescriptor, value.into())
    }

    /// REG_RESOURCE_REQUIREMENTS_LIST value.
    pub fn resource_requirements_list(value: impl Into<Vec<u8>>) -> Self {
        Self::opaque(RegistryValueType::ResourceRequirementsList, value.into())
    }

    fn opaque(kind: RegistryValueType, bytes: Vec<u8>) -> Self {
        Self::encoded(kind, LogicalValue::Bytes(bytes.clone()), bytes)
    }

    /// Returns the type tag.
    pub fn kind(&self) -> RegistryValueType {
        self.kind
    }

    /// Returns the raw encoded bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Consumes the value, returning the raw bytes and the type tag.
    pub fn into_raw(self) -> (Vec<u8>, RegistryValueType) {
        (self.raw, self.kind)
    }

    /// Returns the decoded value.
    pub fn value(&self) -> &LogicalValue {
        &self.value
    }

    /// Returns the string for `Sz`, `ExpandSz` and `Link` values.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            LogicalValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the members of a `MultiSz` value.
    pub fn as_strings(&self) -> Option<&[String]> {
        match &self.value {
            LogicalValue::MultiString(strings) => Some(strings),
            _ => None,
        }
    }

    /// Returns the integer of a `Dword` or `DwordBigEndian` value.
    pub fn as_i32(&self) -> Option<i32> {
        match self.value {
            LogicalValue::Int32(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the integer of a `Qword` value.
    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            LogicalValue::Int64(q) => Some(q),
            _ => None,
        }
    }

    /// Returns the bytes of an opaque value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            LogicalValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the string of an `ExpandSz` value with every `%NAME%` token
    /// replaced by the current value of the environment variable `NAME`.
    ///
    /// Tokens naming undefined variables are kept verbatim. Returns `None`
    /// for any other variant.
    pub fn expanded_value(&self) -> Option<String> {
        match (self.kind, &self.value) {
            (RegistryValueType::ExpandSz, LogicalValue::String(s)) => {
                Some(expand_environment_strings(s))
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.value)
    }
}

/// Serialized form of a [`TypedValue`]: tag and raw bytes only.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawTypedValue {
    kind: RegistryValueType,
    raw: Vec<u8>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTypedValue> for TypedValue {
    type Error = crate::error::RegistryError;

    fn try_from(raw: RawTypedValue) -> Result<Self> {
        TypedValue::from_raw(raw.kind, raw.raw)
    }
}

#[cfg(feature = "serde")]
impl From<TypedValue> for RawTypedValue {
    fn from(value: TypedValue) -> Self {
        RawTypedValue {
            kind: value.kind,
            raw: value.raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;

    #[test]
    fn test_constructors_match_codec() {
        let cases = vec![
            TypedValue::sz("hello"),
            TypedValue::expand_sz("%PATH%"),
            TypedValue::link("\\Registry\\Machine"),
            TypedValue::multi_sz(["a", "b"]),
            TypedValue::dword(-7),
            TypedValue::dword_big_endian(0x0102),
            TypedValue::qword(i64::MIN),
            TypedValue::binary(vec![1, 2, 3]),
            TypedValue::none(),
            TypedValue::resource_list(vec![9]),
            TypedValue::full_resource_descriptor(vec![8]),
            TypedValue::resource_requirements_list(vec![7]),
        ];

        for value in cases {
            let via_codec = TypedValue::new(value.kind(), value.value().clone()).unwrap();
            assert_eq!(via_codec, value);

            let via_raw = TypedValue::from_raw(value.kind(), value.raw().to_vec()).unwrap();
            assert_eq!(via_raw, value);
        }
    }

    #[test]
    fn test_accessors() {
        assert_eq!(TypedValue::sz("x").as_str(), Some("x"));
        assert_eq!(TypedValue::sz("x").as_i32(), None);
        assert_eq!(TypedValue::dword(5).as_i32(), Some(5));
        assert_eq!(TypedValue::qword(5).as_i64(), Some(5));
        assert_eq!(
            TypedValue::multi_sz(["a"]).as_strings(),
            Some(&["a".to_string()][..])
        );
        assert_eq!(TypedValue::binary([1u8]).as_bytes(), Some(&[1u8][..]));
    }

    #[test]
    fn test_from_raw_keeps_terminator_bytes() {
        let mut raw = crate::utils::encode_utf16le("hello");
        raw.extend_from_slice(&[0, 0]);

        let value = TypedValue::from_raw(RegistryValueType::Sz, raw.clone()).unwrap();
        assert_eq!(value.as_str(), Some("hello"));
        assert_eq!(value.raw(), &raw[..]);
    }

    #[test]
    fn test_from_tagged_errors() {
        assert_eq!(
            TypedValue::from_tagged(99, vec![]).unwrap_err(),
            RegistryError::UnknownRegistryType(99)
        );
        assert!(matches!(
            TypedValue::from_tagged(4, vec![1, 2]).unwrap_err(),
            RegistryError::MalformedValue { .. }
        ));
    }

    #[test]
    fn test_expanded_value() {
        std::env::set_var("REGEDIT_TEST_ROOT", "C:\\Windows");
        let value = TypedValue::expand_sz("%REGEDIT_TEST_ROOT%\\system32");
        assert_eq!(value.as_str(), Some("%REGEDIT_TEST_ROOT%\\system32"));
        assert_eq!(
            value.expanded_value().as_deref(),
            Some("C:\\Windows\\system32")
        );

        let value = TypedValue::expand_sz("%REGEDIT_TEST_UNDEFINED_VAR%\\x");
        assert_eq!(
            value.expanded_value().as_deref(),
            Some("%REGEDIT_TEST_UNDEFINED_VAR%\\x")
        );

        assert_eq!(TypedValue::sz("%REGEDIT_TEST_ROOT%").expanded_value(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TypedValue::dword(16).to_string(), "REG_DWORD: 16 (0x00000010)");
        assert_eq!(TypedValue::binary(vec![0xAB, 0x01]).to_string(), "REG_BINARY: hex:ab01");
    }
}
