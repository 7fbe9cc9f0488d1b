//! Registry value type tags.
//!
//! Each variant fixes both the decoded logical shape and the byte layout
//! used on the wire. The numeric tags match the `REG_*` constants used by
//! the operating system.

use crate::error::{RegistryError, Result};
use std::fmt;

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegistryValueType {
    /// No value type (opaque bytes).
    None,

    /// String.
    Sz,

    /// String with `%NAME%` environment references.
    ExpandSz,

    /// Binary data.
    Binary,

    /// 32-bit little-endian integer.
    Dword,

    /// 32-bit big-endian integer.
    DwordBigEndian,

    /// Symbolic link (Unicode).
    Link,

    /// Sequence of strings.
    MultiSz,

    /// Resource list (opaque bytes).
    ResourceList,

    /// Full resource descriptor (opaque bytes).
    FullResourceDescriptor,

    /// Resource requirements list (opaque bytes).
    ResourceRequirementsList,

    /// 64-bit little-endian integer.
    Qword,
}

impl RegistryValueType {
    /// All variants in tag order.
    pub const ALL: [RegistryValueType; 12] = [
        RegistryValueType::None,
        RegistryValueType::Sz,
        RegistryValueType::ExpandSz,
        RegistryValueType::Binary,
        RegistryValueType::Dword,
        RegistryValueType::DwordBigEndian,
        RegistryValueType::Link,
        RegistryValueType::MultiSz,
        RegistryValueType::ResourceList,
        RegistryValueType::FullResourceDescriptor,
        RegistryValueType::ResourceRequirementsList,
        RegistryValueType::Qword,
    ];

    /// Maps a store-reported type tag to a variant.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownRegistryType`] for tags outside 0-11.
    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            0 => Ok(RegistryValueType::None),
            1 => Ok(RegistryValueType::Sz),
            2 => Ok(RegistryValueType::ExpandSz),
            3 => Ok(RegistryValueType::Binary),
            4 => Ok(RegistryValueType::Dword),
            5 => Ok(RegistryValueType::DwordBigEndian),
            6 => Ok(RegistryValueType::Link),
            7 => Ok(RegistryValueType::MultiSz),
            8 => Ok(RegistryValueType::ResourceList),
            9 => Ok(RegistryValueType::FullResourceDescriptor),
            10 => Ok(RegistryValueType::ResourceRequirementsList),
            11 => Ok(RegistryValueType::Qword),
            _ => Err(RegistryError::UnknownRegistryType(value)),
        }
    }

    /// Returns the numeric tag of this variant.
    pub fn as_u32(self) -> u32 {
        match self {
            RegistryValueType::None => 0,
            RegistryValueType::Sz => 1,
            RegistryValueType::ExpandSz => 2,
            RegistryValueType::Binary => 3,
            RegistryValueType::Dword => 4,
            RegistryValueType::DwordBigEndian => 5,
            RegistryValueType::Link => 6,
            RegistryValueType::MultiSz => 7,
            RegistryValueType::ResourceList => 8,
            RegistryValueType::FullResourceDescriptor => 9,
            RegistryValueType::ResourceRequirementsList => 10,
            RegistryValueType::Qword => 11,
        }
    }

    /// Returns the `REG_*` name of this variant.
    pub fn name(self) -> &'static str {
        match self {
            RegistryValueType::None => "REG_NONE",
            RegistryValueType::Sz => "REG_SZ",
            RegistryValueType::ExpandSz => "REG_EXPAND_SZ",
            RegistryValueType::Binary => "REG_BINARY",
            RegistryValueType::Dword => "REG_DWORD",
            RegistryValueType::DwordBigEndian => "REG_DWORD_BIG_ENDIAN",
            RegistryValueType::Link => "REG_LINK",
            RegistryValueType::MultiSz => "REG_MULTI_SZ",
            RegistryValueType::ResourceList => "REG_RESOURCE_LIST",
            RegistryValueType::FullResourceDescriptor => "REG_FULL_RESOURCE_DESCRIPTOR",
            RegistryValueType::ResourceRequirementsList => "REG_RESOURCE_REQUIREMENTS_LIST",
            RegistryValueType::Qword => "REG_QWORD",
        }
    }

    /// Returns the exact byte width for fixed-width variants.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            RegistryValueType::Dword | RegistryValueType::DwordBigEndian => Some(4),
            RegistryValueType::Qword => Some(8),
            _ => None,
        }
    }

    /// Returns true for variants whose payload is UTF-16LE text, including
    /// `MultiSz`. Use [`LogicalValue`](crate::LogicalValue) to tell a single
    /// string from a sequence.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            RegistryValueType::Sz
                | RegistryValueType::ExpandSz
                | RegistryValueType::Link
                | RegistryValueType::MultiSz
        )
    }
}

impl fmt::Display for RegistryValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
