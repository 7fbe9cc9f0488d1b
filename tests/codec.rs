//! Round-trip and layout tests for the value codec.

use proptest::prelude::*;
use regedit::*;

fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Strings the codec can represent: no embedded NUL.
fn text() -> impl Strategy<Value = String> {
    "[^\\x00]{0,24}"
}

fn member() -> impl Strategy<Value = String> {
    "[^\\x00]{1,12}"
}

fn string_kind() -> impl Strategy<Value = RegistryValueType> {
    prop_oneof![
        Just(RegistryValueType::Sz),
        Just(RegistryValueType::ExpandSz),
        Just(RegistryValueType::Link),
    ]
}

fn bytes_kind() -> impl Strategy<Value = RegistryValueType> {
    prop_oneof![
        Just(RegistryValueType::None),
        Just(RegistryValueType::Binary),
        Just(RegistryValueType::ResourceList),
        Just(RegistryValueType::FullResourceDescriptor),
        Just(RegistryValueType::ResourceRequirementsList),
    ]
}

proptest! {
    #[test]
    fn prop_string_round_trip(kind in string_kind(), s in text()) {
        let value = LogicalValue::String(s);
        let raw = encode(&value, kind).unwrap();
        prop_assert_eq!(decode(&raw, kind).unwrap(), value);
    }

    #[test]
    fn prop_multi_string_round_trip(members in prop::collection::vec(member(), 1..6)) {
        let value = LogicalValue::MultiString(members);
        let raw = encode(&value, RegistryValueType::MultiSz).unwrap();
        prop_assert_eq!(decode(&raw, RegistryValueType::MultiSz).unwrap(), value);
    }

    #[test]
    fn prop_string_bytes_reencode(kind in string_kind(), s in text()) {
        // Unterminated UTF-16LE is the canonical layout
        let data = utf16(&s);
        let value = decode(&data, kind).unwrap();
        prop_assert_eq!(encode(&value, kind).unwrap(), data);
    }

    #[test]
    fn prop_multi_string_bytes_reencode(members in prop::collection::vec(member(), 1..6)) {
        let data = utf16(&members.join("\0"));
        let value = decode(&data, RegistryValueType::MultiSz).unwrap();
        prop_assert_eq!(&value, &LogicalValue::MultiString(members));
        prop_assert_eq!(encode(&value, RegistryValueType::MultiSz).unwrap(), data);
    }

    #[test]
    fn prop_int32_round_trip(n in any::<i32>()) {
        for kind in [RegistryValueType::Dword, RegistryValueType::DwordBigEndian] {
            let raw = encode(&LogicalValue::Int32(n), kind).unwrap();
            prop_assert_eq!(raw.len(), 4);
            prop_assert_eq!(decode(&raw, kind).unwrap(), LogicalValue::Int32(n));
        }
    }

    #[test]
    fn prop_int64_round_trip(n in any::<i64>()) {
        let raw = encode(&LogicalValue::Int64(n), RegistryValueType::Qword).unwrap();
        prop_assert_eq!(raw, n.to_le_bytes().to_vec());
    }

    #[test]
    fn prop_bytes_are_identity(kind in bytes_kind(), data in prop::collection::vec(any::<u8>(), 0..64)) {
        let value = decode(&data, kind).unwrap();
        prop_assert_eq!(&value, &LogicalValue::Bytes(data.clone()));
        prop_assert_eq!(encode(&value, kind).unwrap(), data);
    }

    #[test]
    fn prop_fixed_width_reencodes_raw(data in prop::collection::vec(any::<u8>(), 4)) {
        for kind in [RegistryValueType::Dword, RegistryValueType::DwordBigEndian] {
            let value = decode(&data, kind).unwrap();
            prop_assert_eq!(encode(&value, kind).unwrap(), data.clone());
        }
    }

    #[test]
    fn prop_wrong_width_is_malformed(data in prop::collection::vec(any::<u8>(), 0..12)) {
        prop_assume!(data.len() != 4);
        let err = decode(&data, RegistryValueType::Dword).unwrap_err();
        let is_malformed = matches!(
            err,
            RegistryError::MalformedValue { expected: 4, .. }
        );
        prop_assert!(is_malformed);
    }

    #[test]
    fn prop_typed_value_keeps_raw(s in text()) {
        let value = TypedValue::sz(s.clone());
        let again = TypedValue::from_raw(value.kind(), value.raw().to_vec()).unwrap();
        prop_assert_eq!(again.as_str(), Some(s.as_str()));
        prop_assert_eq!(again, value);
    }
}

#[test]
fn test_decode_examples() {
    assert_eq!(
        decode(&[0x10, 0, 0, 0], RegistryValueType::Dword).unwrap(),
        LogicalValue::Int32(16)
    );
    assert_eq!(
        decode(&[0, 0, 0, 0x10], RegistryValueType::DwordBigEndian).unwrap(),
        LogicalValue::Int32(16)
    );
    assert_eq!(
        decode(&[0xff; 8], RegistryValueType::Qword).unwrap(),
        LogicalValue::Int64(-1)
    );

    let mut data = utf16("C:\\Program Files");
    data.extend_from_slice(&[0, 0]);
    assert_eq!(
        decode(&data, RegistryValueType::Sz).unwrap(),
        LogicalValue::String("C:\\Program Files".to_string())
    );

    assert_eq!(
        decode(&utf16("a\0b\0"), RegistryValueType::MultiSz).unwrap(),
        LogicalValue::MultiString(vec!["a".to_string(), "b".to_string()])
    );
}

#[test]
fn test_empty_buffers() {
    assert_eq!(
        decode(&[], RegistryValueType::Sz).unwrap(),
        LogicalValue::String(String::new())
    );
    assert_eq!(
        decode(&[], RegistryValueType::MultiSz).unwrap(),
        LogicalValue::MultiString(vec![String::new()])
    );
    assert_eq!(
        decode(&[], RegistryValueType::Binary).unwrap(),
        LogicalValue::Bytes(Vec::new())
    );
    assert!(decode(&[], RegistryValueType::Qword).is_err());
}

#[test]
fn test_odd_length_string_ignores_trailing_byte() {
    let mut data = utf16("abc");
    data.push(0x41);
    assert_eq!(
        decode(&data, RegistryValueType::Sz).unwrap(),
        LogicalValue::String("abc".to_string())
    );
}

#[test]
fn test_shape_mismatch() {
    let err = encode(&LogicalValue::Int32(1), RegistryValueType::Sz).unwrap_err();
    assert!(matches!(err, RegistryError::UnsupportedLogicalType { .. }));

    let err = encode(
        &LogicalValue::String("x".to_string()),
        RegistryValueType::Qword,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::UnsupportedLogicalType { .. }));

    assert!(TypedValue::new(RegistryValueType::Binary, LogicalValue::Int64(0)).is_err());
}

#[test]
fn test_malformed_message() {
    let err = decode(&[1, 2, 3], RegistryValueType::Dword).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Malformed REG_DWORD value: expected 4 bytes, got 3 bytes"
    );
}

#[test]
fn test_unknown_tag() {
    assert_eq!(
        codec::decode_tagged(&[], 12).unwrap_err(),
        RegistryError::UnknownRegistryType(12)
    );
    assert_eq!(
        TypedValue::from_tagged(11, vec![0; 8]).unwrap().kind(),
        RegistryValueType::Qword
    );
}
