use std::fmt;

// === RegistryError ===

/// Errors raised by a hierarchical key-value store.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// The key at the given path does not exist.
    KeyNotFound(String),
    /// The key path is empty or contains an empty component.
    InvalidPath(String),
    /// The store refused access to the key.
    AccessDenied(String),
    /// A stored value has an unexpected type.
    TypeMismatch(String),
    /// The backing database failed.
    DatabaseError(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::KeyNotFound(path) => write!(f, "Registry key not found: {}", path),
            RegistryError::InvalidPath(path) => write!(f, "Invalid registry path: {:?}", path),
            RegistryError::AccessDenied(path) => write!(f, "Registry access denied: {}", path),
            RegistryError::TypeMismatch(msg) => write!(f, "Registry value type mismatch: {}", msg),
            RegistryError::DatabaseError(msg) => {
                write!(f, "Registry database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<rusqlite::Error> for RegistryError {
    fn from(e: rusqlite::Error) -> Self {
        RegistryError::DatabaseError(e.to_string())
    }
}

// === BookmarkError ===

/// Errors related to bookmark tree operations.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkError {
    /// No bookmark or folder with the given ID exists in the tree.
    NotFound(String),
    /// The target folder was not found.
    FolderNotFound(String),
    /// The ID refers to a bookmark where a folder was required.
    NotAFolder(String),
    /// The ID refers to a folder where a bookmark was required.
    NotABookmark(String),
    /// Reading or writing the backing store failed.
    Storage(RegistryError),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::FolderNotFound(id) => write!(f, "Bookmark folder not found: {}", id),
            BookmarkError::NotAFolder(id) => write!(f, "Not a bookmark folder: {}", id),
            BookmarkError::NotABookmark(id) => write!(f, "Not a bookmark: {}", id),
            BookmarkError::Storage(e) => write!(f, "Bookmark storage error: {}", e),
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookmarkError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegistryError> for BookmarkError {
    fn from(e: RegistryError) -> Self {
        BookmarkError::Storage(e)
    }
}

// === ObserverError ===

/// Failure reported by a bookmark observer hook.
///
/// The notifier logs these and keeps delivering to the remaining observers.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverError(pub String);

impl ObserverError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observer failed: {}", self.0)
    }
}

impl std::error::Error for ObserverError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
