//! # Typed, Batched Windows Registry Access
//!
//! Structured access to the hierarchical registry store
//! (hives → nested keys → named, typed values) with many keys per call.
//!
//! ## Features
//!
//! - **Value codec**: all twelve `REG_*` types, with a lossless mapping
//!   between raw bytes and typed values
//! - **Path resolution**: `HKLM\Software\...` paths, full hive names or
//!   aliases, matched case-insensitively
//! - **Batch operations**: list, create, put and delete over many paths at
//!   once, with independent per-path outcomes
//! - **Sync and async**: every entry point has a deferred `_async` twin
//!   (feature `async`, on by default)
//! - **Pluggable stores**: the live registry on Windows, an in-memory store
//!   everywhere
//!
//! ## Architecture
//!
//! ```text
//! Registry (facade)        validates input, decodes listings
//!   └─ batch               resolves all paths, then dispatches each one
//!        ├─ path / hive    "HKLM\a\b" → (HiveId, ["a", "b"])
//!        └─ RegistryStore  MemoryStore | WindowsStore
//! codec / value            raw bytes ⇄ TypedValue
//! ```
//!
//! ## Wire Format
//!
//! ```text
//! REG_SZ, REG_EXPAND_SZ, REG_LINK   UTF-16LE, optional trailing NUL
//! REG_MULTI_SZ                      UTF-16LE, members separated by NUL
//! REG_DWORD                         4 bytes, little-endian
//! REG_DWORD_BIG_ENDIAN              4 bytes, big-endian
//! REG_QWORD                         8 bytes, little-endian
//! everything else                   opaque bytes
//! ```
//!
//! ## Examples
//!
//! ### Listing Keys
//!
//! ```rust
//! use regedit::{MemoryStore, Registry};
//!
//! # fn main() -> regedit::Result<()> {
//! let registry = Registry::new(MemoryStore::new());
//! registry.create_key("HKLM\\Software\\Vendor")?;
//!
//! let listing = registry.list(["HKLM\\Software", "HKCU\\not_exist"])?;
//! let software = listing.ok("HKLM\\Software").unwrap();
//! assert!(software.exists);
//! assert!(software.has_subkey("vendor"));
//! assert!(!listing.ok("HKCU\\not_exist").unwrap().exists);
//! # Ok(())
//! # }
//! ```
//!
//! ### Writing Values
//!
//! ```rust
//! use regedit::{MemoryStore, Registry, TypedValue};
//! use std::collections::HashMap;
//!
//! # fn main() -> regedit::Result<()> {
//! let registry = Registry::new(MemoryStore::new());
//! registry.create_key("HKCU\\Software\\App")?;
//!
//! let values = HashMap::from([
//!     ("Count".to_string(), TypedValue::dword(3)),
//!     ("Paths".to_string(), TypedValue::multi_sz(["a", "b"])),
//! ]);
//! let result = registry.put_value([("HKCU\\Software\\App", values)])?;
//! assert!(result.is_success());
//!
//! let count = registry.get_value("HKCU\\Software\\App\\Count")?;
//! assert_eq!(count.and_then(|v| v.as_i32()), Some(3));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod codec;
pub mod error;
pub mod hive;
pub mod key;
pub mod memory;
pub mod options;
pub mod path;
pub mod registry;
pub mod store;
pub mod utils;
pub mod value;
pub mod value_type;

// Live registry store (only compiled on Windows)
#[cfg(windows)]
pub mod windows;

// Re-export main types for convenience
pub use batch::{BatchOutcome, BatchRequest, BatchResult, Operation};
pub use codec::{decode, encode, LogicalValue};
pub use error::{RegistryError, Result};
pub use hive::HiveId;
pub use key::KeySnapshot;
pub use memory::MemoryStore;
pub use options::Options;
pub use path::{resolve, HivePath};
pub use registry::{DeleteValueCollection, PathList, PutCollection, Registry};
pub use store::{RawKey, RawValue, RegistryStore};
pub use value::TypedValue;
pub use value_type::RegistryValueType;

#[cfg(windows)]
pub use windows::WindowsStore;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
