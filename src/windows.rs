//! Live system registry store, backed by the `winreg` crate.

use crate::error::{RegistryError, Result};
use crate::hive::HiveId;
use crate::path::HivePath;
use crate::store::{RawKey, RawValue, RegistryStore};
use crate::value_type::RegistryValueType;
use std::io;
use tracing::{debug, warn};
use winreg::enums::{
    RegType, HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE,
    HKEY_USERS, KEY_READ, KEY_SET_VALUE,
};
use winreg::{RegKey, RegValue};

/// [`RegistryStore`] over the predefined hive handles of the running system.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsStore;

impl WindowsStore {
    /// Creates a store over the system registry.
    pub fn new() -> Self {
        Self
    }
}

fn predef(hive: HiveId) -> RegKey {
    RegKey::predef(match hive {
        HiveId::LocalMachine => HKEY_LOCAL_MACHINE,
        HiveId::CurrentUser => HKEY_CURRENT_USER,
        HiveId::ClassesRoot => HKEY_CLASSES_ROOT,
        HiveId::Users => HKEY_USERS,
        HiveId::CurrentConfig => HKEY_CURRENT_CONFIG,
    })
}

fn reg_type(kind: RegistryValueType) -> RegType {
    match kind {
        RegistryValueType::None => RegType::REG_NONE,
        RegistryValueType::Sz => RegType::REG_SZ,
        RegistryValueType::ExpandSz => RegType::REG_EXPAND_SZ,
        RegistryValueType::Binary => RegType::REG_BINARY,
        RegistryValueType::Dword => RegType::REG_DWORD,
        RegistryValueType::DwordBigEndian => RegType::REG_DWORD_BIG_ENDIAN,
        RegistryValueType::Link => RegType::REG_LINK,
        RegistryValueType::MultiSz => RegType::REG_MULTI_SZ,
        RegistryValueType::ResourceList => RegType::REG_RESOURCE_LIST,
        RegistryValueType::FullResourceDescriptor => RegType::REG_FULL_RESOURCE_DESCRIPTOR,
        RegistryValueType::ResourceRequirementsList => {
            RegType::REG_RESOURCE_REQUIREMENTS_LIST
        }
        RegistryValueType::Qword => RegType::REG_QWORD,
    }
}

fn open(path: &HivePath, perms: u32) -> Result<RegKey> {
    predef(path.hive())
        .open_subkey_with_flags(path.subkey_path(), perms)
        .map_err(|err| RegistryError::from_io(&path.to_string(), err))
}

impl RegistryStore for WindowsStore {
    fn enumerate(&self, path: &HivePath) -> Result<Option<RawKey>> {
        let key = match predef(path.hive()).open_subkey_with_flags(path.subkey_path(), KEY_READ) {
            Ok(key) => key,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(RegistryError::from_io(&path.to_string(), err)),
        };

        let subkeys = key
            .enum_keys()
            .filter_map(|name| match name {
                Ok(name) => Some(name),
                Err(err) => {
                    warn!(path = %path, error = %err, "Skipping unreadable subkey");
                    None
                }
            })
            .collect();

        let values = key
            .enum_values()
            .filter_map(|entry| match entry {
                Ok((name, value)) => Some(RawValue::new(name, value.bytes, value.vtype as u32)),
                Err(err) => {
                    warn!(path = %path, error = %err, "Skipping unreadable value");
                    None
                }
            })
            .collect();

        Ok(Some(RawKey { subkeys, values }))
    }

    fn create_key(&self, path: &HivePath) -> Result<()> {
        debug!(path = %path, "Creating key");
        predef(path.hive())
            .create_subkey(path.subkey_path())
            .map(|_| ())
            .map_err(|err| RegistryError::from_io(&path.to_string(), err))
    }

    // Values are written in order; a failure leaves the earlier ones in place
    fn set_values(&self, path: &HivePath, values: &[RawValue]) -> Result<()> {
        let key = open(path, KEY_SET_VALUE)?;
        for value in values {
            let vtype = reg_type(RegistryValueType::from_u32(value.type_tag)?);
            let raw = RegValue {
                bytes: value.bytes.clone(),
                vtype,
            };
            key.set_raw_value(&value.name, &raw)
                .map_err(|err| RegistryError::from_io(&path.to_string(), err))?;
        }
        Ok(())
    }

    fn delete_key(&self, path: &HivePath) -> Result<()> {
        // An empty subkey path would clear the whole hive
        if path.is_root() {
            return Err(RegistryError::access_denied(&path.to_string()));
        }
        debug!(path = %path, "Deleting key tree");
        predef(path.hive())
            .delete_subkey_all(path.subkey_path())
            .map_err(|err| RegistryError::from_io(&path.to_string(), err))
    }

    fn delete_values(&self, path: &HivePath, names: &[String]) -> Result<()> {
        let key = open(path, KEY_SET_VALUE)?;
        for name in names {
            key.delete_value(name).map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => RegistryError::value_not_found(&path.to_string(), name),
                _ => RegistryError::from_io(&path.to_string(), err),
            })?;
        }
        Ok(())
    }
}
