//! Hierarchical key-value store ("registry") and the bookmark codec on top of it.
//!
//! Keys are addressed by `\`-separated paths such as
//! `Software\Shellmarks\Bookmarks\BookmarkFolder_0`. Each key holds named
//! string or DWORD values plus any number of subkeys.

pub mod codec;
pub mod memory;
pub mod sqlite;

pub use codec::{
    deserialize_from_registry, serialize_to_registry, try_deserialize_from_registry,
    try_serialize_to_registry,
};
pub use memory::MemoryRegistry;
pub use sqlite::SqliteRegistry;

use crate::types::errors::RegistryError;

/// Separator between path components.
pub const SEPARATOR: char = '\\';

/// A single named value stored under a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    String(String),
    Dword(u32),
}

/// Trait defining the operations of a hierarchical key-value store.
pub trait RegistryStore {
    /// Creates the key and any missing ancestors. Existing keys are left as they are.
    fn create_key(&mut self, path: &str) -> Result<(), RegistryError>;
    fn key_exists(&self, path: &str) -> Result<bool, RegistryError>;
    /// Writes a value, replacing any previous value of the same name.
    fn set_value(&mut self, path: &str, name: &str, value: RegistryValue) -> Result<(), RegistryError>;
    fn get_value(&self, path: &str, name: &str) -> Result<Option<RegistryValue>, RegistryError>;
    /// Names of the immediate subkeys. Order is backend-defined.
    fn subkeys(&self, path: &str) -> Result<Vec<String>, RegistryError>;
    /// Deletes the key together with all of its values and subkeys.
    fn delete_key(&mut self, path: &str) -> Result<(), RegistryError>;
}

/// Splits a path into its components, ignoring leading and trailing separators.
///
/// # Errors
/// `RegistryError::InvalidPath` for an empty path or an empty component.
pub fn path_components(path: &str) -> Result<Vec<&str>, RegistryError> {
    let trimmed = path.trim_matches(SEPARATOR);
    if trimmed.is_empty() {
        return Err(RegistryError::InvalidPath(path.to_string()));
    }
    let components: Vec<&str> = trimmed.split(SEPARATOR).collect();
    if components.iter().any(|c| c.is_empty()) {
        return Err(RegistryError::InvalidPath(path.to_string()));
    }
    Ok(components)
}

/// Canonical form of a path: components joined by a single separator.
pub fn normalize_path(path: &str) -> Result<String, RegistryError> {
    Ok(path_components(path)?.join("\\"))
}

pub fn join_path(parent: &str, child: &str) -> String {
    format!("{}{}{}", parent.trim_end_matches(SEPARATOR), SEPARATOR, child)
}
