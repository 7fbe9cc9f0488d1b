//! Value codec: conversion between logical values and raw registry bytes.
//!
//! Every [`RegistryValueType`] maps to one of five logical shapes:
//!
//! | Variant                                   | Shape            | Layout                         |
//! |-------------------------------------------|------------------|--------------------------------|
//! | `Sz`, `ExpandSz`, `Link`                  | `String`         | UTF-16LE, optional one NUL     |
//! | `MultiSz`                                 | `MultiString`    | UTF-16LE, members joined by NUL|
//! | `Dword`                                   | `Int32`          | 4 bytes little-endian          |
//! | `DwordBigEndian`                          | `Int32`          | 4 bytes big-endian             |
//! | `Qword`                                   | `Int64`          | 8 bytes little-endian          |
//! | `None`, `Binary`, `Resource*`             | `Bytes`          | identity                       |
//!
//! `decode(encode(v, k), k) == v` holds for every representable `v`. Strings
//! are encoded without a terminator, so a string ending in NUL, a
//! `MultiString` member containing NUL, or a `MultiString` whose last member
//! is empty (other than `[""]`) is not representable: decoding strips one
//! trailing NUL.

use crate::error::{RegistryError, Result};
use crate::utils::{decode_utf16le, encode_utf16le};
use crate::value_type::RegistryValueType;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::Cursor;

/// Decoded form of a registry value.
///
/// The shape is implied by the value's [`RegistryValueType`]; see the
/// module docs for the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicalValue {
    /// Single string.
    String(String),

    /// Ordered sequence of strings.
    MultiString(Vec<String>),

    /// 32-bit signed integer.
    Int32(i32),

    /// 64-bit signed integer.
    Int64(i64),

    /// Opaque bytes.
    Bytes(Vec<u8>),
}

impl LogicalValue {
    /// Returns a short name of this shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            LogicalValue::String(_) => "string",
            LogicalValue::MultiString(_) => "sequence of strings",
            LogicalValue::Int32(_) => "32-bit integer",
            LogicalValue::Int64(_) => "64-bit integer",
            LogicalValue::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for LogicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalValue::String(s) => f.write_str(s),
            LogicalValue::MultiString(strings) => write!(f, "{}", strings.join(", ")),
            LogicalValue::Int32(d) => write!(f, "{} (0x{:08X})", d, d),
            LogicalValue::Int64(q) => write!(f, "{} (0x{:016X})", q, q),
            LogicalValue::Bytes(b) => write!(f, "hex:{}", hex::encode(b)),
        }
    }
}

/// Encodes a logical value into the byte layout of `kind`.
///
/// # Errors
///
/// Returns [`RegistryError::UnsupportedLogicalType`] if the shape of
/// `value` does not match what `kind` requires.
pub fn encode(value: &LogicalValue, kind: RegistryValueType) -> Result<Vec<u8>> {
    let unsupported = || RegistryError::UnsupportedLogicalType {
        kind,
        found: value.shape(),
    };

    match (kind, value) {
        (
            RegistryValueType::Sz | RegistryValueType::ExpandSz | RegistryValueType::Link,
            LogicalValue::String(s),
        ) => Ok(encode_utf16le(s)),

        (RegistryValueType::MultiSz, LogicalValue::MultiString(strings)) => {
            Ok(encode_utf16le(&strings.join("\0")))
        }

        (RegistryValueType::Dword, LogicalValue::Int32(d)) => {
            let mut buf = Vec::with_capacity(4);
            buf.write_i32::<LittleEndian>(*d)?;
            Ok(buf)
        }

        (RegistryValueType::DwordBigEndian, LogicalValue::Int32(d)) => {
            let mut buf = Vec::with_capacity(4);
            buf.write_i32::<BigEndian>(*d)?;
            Ok(buf)
        }

        (RegistryValueType::Qword, LogicalValue::Int64(q)) => {
            let mut buf = Vec::with_capacity(8);
            buf.write_i64::<LittleEndian>(*q)?;
            Ok(buf)
        }

        (
            RegistryValueType::None
            | RegistryValueType::Binary
            | RegistryValueType::ResourceList
            | RegistryValueType::FullResourceDescriptor
            | RegistryValueType::ResourceRequirementsList,
            LogicalValue::Bytes(bytes),
        ) => Ok(bytes.clone()),

        _ => Err(unsupported()),
    }
}

/// Decodes raw bytes according to the layout of `kind`.
///
/// Decoding is all-or-nothing: it either yields the full logical value or
/// fails without a partial result.
///
/// # Errors
///
/// Returns [`RegistryError::MalformedValue`] when a fixed-width variant
/// (`Dword`, `DwordBigEndian`, `Qword`) receives a buffer of the wrong
/// length. Variable-width variants never fail.
pub fn decode(data: &[u8], kind: RegistryValueType) -> Result<LogicalValue> {
    if let Some(width) = kind.fixed_width() {
        if data.len() != width {
            return Err(RegistryError::malformed(kind, width, data.len()));
        }
    }

    match kind {
        RegistryValueType::Sz | RegistryValueType::ExpandSz | RegistryValueType::Link => {
            Ok(LogicalValue::String(decode_utf16le(data)))
        }

        RegistryValueType::MultiSz => {
            let joined = decode_utf16le(data);
            let strings = joined.split('\0').map(str::to_string).collect();
            Ok(LogicalValue::MultiString(strings))
        }

        RegistryValueType::Dword => {
            let mut cursor = Cursor::new(data);
            Ok(LogicalValue::Int32(cursor.read_i32::<LittleEndian>()?))
        }

        RegistryValueType::DwordBigEndian => {
            let mut cursor = Cursor::new(data);
            Ok(LogicalValue::Int32(cursor.read_i32::<BigEndian>()?))
        }

        RegistryValueType::Qword => {
            let mut cursor = Cursor::new(data);
            Ok(LogicalValue::Int64(cursor.read_i64::<LittleEndian>()?))
        }

        RegistryValueType::None
        | RegistryValueType::Binary
        | RegistryValueType::ResourceList
        | RegistryValueType::FullResourceDescriptor
        | RegistryValueType::ResourceRequirementsList => Ok(LogicalValue::Bytes(data.to_vec())),
    }
}

/// Decodes raw bytes tagged with a store-reported numeric type.
///
/// # Errors
///
/// Returns [`RegistryError::UnknownRegistryType`] for an unknown tag, or
/// any error [`decode`] returns.
pub fn decode_tagged(data: &[u8], type_tag: u32) -> Result<(RegistryValueType, LogicalValue)> {
    let kind = RegistryValueType::from_u32(type_tag)?;
    Ok((kind, decode(data, kind)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u8> {
        encode_utf16le(s)
    }

    #[test]
    fn test_sz_with_and_without_nul() {
        let mut data = utf16("hello");
        assert_eq!(
            decode(&data, RegistryValueType::Sz).unwrap(),
            LogicalValue::String("hello".into())
        );

        data.extend_from_slice(&[0, 0]);
        assert_eq!(
            decode(&data, RegistryValueType::Sz).unwrap(),
            LogicalValue::String("hello".into())
        );
    }

    #[test]
    fn test_multi_sz_split() {
        let data = utf16("a\0b\0c");
        assert_eq!(
            decode(&data, RegistryValueType::MultiSz).unwrap(),
            LogicalValue::MultiString(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_multi_sz_empty_input() {
        assert_eq!(
            decode(&[], RegistryValueType::MultiSz).unwrap(),
            LogicalValue::MultiString(vec![String::new()])
        );
    }

    #[test]
    fn test_multi_sz_double_terminated() {
        // Only one terminator is stripped, the second leaves an empty member
        let data = utf16("a\0b\0\0");
        assert_eq!(
            decode(&data, RegistryValueType::MultiSz).unwrap(),
            LogicalValue::MultiString(vec!["a".into(), "b".into(), String::new()])
        );
    }

    #[test]
    fn test_dword_layouts() {
        let le = encode(&LogicalValue::Int32(0x01020304), RegistryValueType::Dword).unwrap();
        assert_eq!(le, vec![0x04, 0x03, 0x02, 0x01]);

        let be = encode(&LogicalValue::Int32(0x01020304), RegistryValueType::DwordBigEndian).unwrap();
        assert_eq!(be, vec![0x01, 0x02, 0x03, 0x04]);

        assert_eq!(
            decode(&[0xFF, 0xFF, 0xFF, 0xFF], RegistryValueType::Dword).unwrap(),
            LogicalValue::Int32(-1)
        );
    }

    #[test]
    fn test_qword_beyond_53_bits() {
        let big = (1i64 << 62) + 1;
        let data = encode(&LogicalValue::Int64(big), RegistryValueType::Qword).unwrap();
        assert_eq!(data.len(), 8);
        assert_eq!(
            decode(&data, RegistryValueType::Qword).unwrap(),
            LogicalValue::Int64(big)
        );
    }

    #[test]
    fn test_fixed_width_length_mismatch() {
        for len in [0usize, 3, 5, 8] {
            let err = decode(&vec![0u8; len], RegistryValueType::Dword).unwrap_err();
            assert_eq!(err, RegistryError::malformed(RegistryValueType::Dword, 4, len));
        }

        let err = decode(&[0u8; 4], RegistryValueType::DwordBigEndian);
        assert!(err.is_ok());

        let err = decode(&[0u8; 4], RegistryValueType::Qword).unwrap_err();
        assert!(matches!(err, RegistryError::MalformedValue { expected: 8, actual: 4, .. }));
    }

    #[test]
    fn test_opaque_identity() {
        let bytes = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01];
        for kind in [
            RegistryValueType::None,
            RegistryValueType::Binary,
            RegistryValueType::ResourceList,
            RegistryValueType::FullResourceDescriptor,
            RegistryValueType::ResourceRequirementsList,
        ] {
            let encoded = encode(&LogicalValue::Bytes(bytes.clone()), kind).unwrap();
            assert_eq!(encoded, bytes);
            assert_eq!(decode(&encoded, kind).unwrap(), LogicalValue::Bytes(bytes.clone()));
        }
    }

    #[test]
    fn test_unsupported_logical_type() {
        let err = encode(&LogicalValue::String("x".into()), RegistryValueType::MultiSz).unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnsupportedLogicalType {
                kind: RegistryValueType::MultiSz,
                found: "string",
            }
        );

        assert!(encode(&LogicalValue::Int64(1), RegistryValueType::Dword).is_err());
        assert!(encode(&LogicalValue::Int32(1), RegistryValueType::Qword).is_err());
        assert!(encode(&LogicalValue::Bytes(vec![]), RegistryValueType::Sz).is_err());
    }

    #[test]
    fn test_decode_tagged_unknown() {
        assert_eq!(
            decode_tagged(&[], 42).unwrap_err(),
            RegistryError::UnknownRegistryType(42)
        );
        let (kind, value) = decode_tagged(&[1, 0, 0, 0], 4).unwrap();
        assert_eq!(kind, RegistryValueType::Dword);
        assert_eq!(value, LogicalValue::Int32(1));
    }
}
