//! Recursive (de)serialization of a bookmark tree to a registry store.
//!
//! Layout of one folder key:
//!
//! ```text
//! <key>
//!   Name, ID                         string
//!   DateCreatedLow/High              DWORD
//!   DateModifiedLow/High             DWORD
//!   BookmarkFolder_<i>\              nested folder at sibling position i
//!   Bookmark_<i>\                    bookmark at sibling position i
//!     Name, Location, Description, ID                        string
//!     VisitCount                                             DWORD
//!     DateCreated*, DateModified*, DateLastVisited* Low/High DWORD
//! ```
//!
//! The sibling index counts folders and bookmarks together.

use tracing::{debug, warn};

use super::{join_path, RegistryStore, RegistryValue};
use crate::services::id_generator::IdGenerator;
use crate::types::bookmark::{
    BookmarkChild, BookmarkFolder, BookmarkId, BookmarkItem, BookmarkItemRecord, FileTime,
};
use crate::types::errors::RegistryError;

pub const FOLDER_KEY_PREFIX: &str = "BookmarkFolder_";
pub const ITEM_KEY_PREFIX: &str = "Bookmark_";

const VALUE_NAME: &str = "Name";
const VALUE_ID: &str = "ID";
const VALUE_LOCATION: &str = "Location";
const VALUE_DESCRIPTION: &str = "Description";
const VALUE_VISIT_COUNT: &str = "VisitCount";
const DATE_CREATED: (&str, &str) = ("DateCreatedLow", "DateCreatedHigh");
const DATE_MODIFIED: (&str, &str) = ("DateModifiedLow", "DateModifiedHigh");
const DATE_LAST_VISITED: (&str, &str) = ("DateLastVisitedLow", "DateLastVisitedHigh");

/// Writes `folder` under `key`. Failures are logged and the write is skipped.
pub fn serialize_to_registry(folder: &BookmarkFolder, store: &mut dyn RegistryStore, key: &str) {
    if let Err(e) = try_serialize_to_registry(folder, store, key) {
        warn!(key, error = %e, "bookmark folder not saved");
    }
}

/// Writes `folder` under `key`, replacing bookmark subkeys left by an earlier save.
pub fn try_serialize_to_registry(
    folder: &BookmarkFolder,
    store: &mut dyn RegistryStore,
    key: &str,
) -> Result<(), RegistryError> {
    store.create_key(key)?;

    set_string(store, key, VALUE_NAME, folder.name())?;
    set_string(store, key, VALUE_ID, &folder.id().to_string())?;
    set_filetime(store, key, DATE_CREATED, folder.created_at())?;
    set_filetime(store, key, DATE_MODIFIED, folder.modified_at())?;

    remove_child_keys(store, key)?;

    for (index, child) in folder.iter().enumerate() {
        match child {
            BookmarkChild::Folder(nested) => {
                let path = join_path(key, &format!("{}{}", FOLDER_KEY_PREFIX, index));
                try_serialize_to_registry(nested, store, &path)?;
            }
            BookmarkChild::Item(item) => {
                let path = join_path(key, &format!("{}{}", ITEM_KEY_PREFIX, index));
                write_item(item, store, &path)?;
            }
        }
    }

    debug!(key, children = folder.len(), "bookmark folder saved");
    Ok(())
}

/// Reads the folder stored under `key`.
///
/// A missing or unreadable key yields an empty folder with a fresh identifier.
pub fn deserialize_from_registry(
    store: &dyn RegistryStore,
    key: &str,
    ids: &mut dyn IdGenerator,
) -> BookmarkFolder {
    match try_deserialize_from_registry(store, key, ids) {
        Ok(Some(folder)) => folder,
        Ok(None) => {
            debug!(key, "no bookmark key, starting with an empty folder");
            BookmarkFolder::new(ids, "")
        }
        Err(e) => {
            warn!(key, error = %e, "bookmark folder not loaded, starting with an empty folder");
            BookmarkFolder::new(ids, "")
        }
    }
}

/// Reads the folder stored under `key`, or `None` when the key does not exist.
///
/// Children that fail to load are skipped with a warning.
pub fn try_deserialize_from_registry(
    store: &dyn RegistryStore,
    key: &str,
    ids: &mut dyn IdGenerator,
) -> Result<Option<BookmarkFolder>, RegistryError> {
    if !store.key_exists(key)? {
        return Ok(None);
    }
    read_folder(store, key, ids).map(Some)
}

fn read_folder(
    store: &dyn RegistryStore,
    key: &str,
    ids: &mut dyn IdGenerator,
) -> Result<BookmarkFolder, RegistryError> {
    let id = read_id(store, key, ids)?;
    let name = read_string(store, key, VALUE_NAME)?.unwrap_or_default();
    let created_at = read_filetime(store, key, DATE_CREATED)?;
    let modified_at = read_filetime(store, key, DATE_MODIFIED)?;

    let mut folder = BookmarkFolder::restore(id, &name, created_at, modified_at);

    for child in ordered_child_keys(store, key)? {
        let path = join_path(key, &child.name);
        let loaded = match child.kind {
            ChildKind::Folder => read_folder(store, &path, ids).map(BookmarkChild::Folder),
            ChildKind::Item => read_item(store, &path, ids).map(BookmarkChild::Item),
        };
        match loaded {
            Ok(node) => folder.push_restored(node),
            Err(e) => warn!(key = %path, error = %e, "skipping unreadable bookmark entry"),
        }
    }

    Ok(folder)
}

fn write_item(item: &BookmarkItem, store: &mut dyn RegistryStore, key: &str) -> Result<(), RegistryError> {
    store.create_key(key)?;
    set_string(store, key, VALUE_NAME, item.name())?;
    set_string(store, key, VALUE_LOCATION, item.location())?;
    set_string(store, key, VALUE_DESCRIPTION, item.description())?;
    set_string(store, key, VALUE_ID, &item.id().to_string())?;
    store.set_value(key, VALUE_VISIT_COUNT, RegistryValue::Dword(item.visit_count()))?;
    set_filetime(store, key, DATE_CREATED, item.created_at())?;
    set_filetime(store, key, DATE_MODIFIED, item.modified_at())?;
    set_filetime(store, key, DATE_LAST_VISITED, item.last_visited_at())?;
    Ok(())
}

fn read_item(
    store: &dyn RegistryStore,
    key: &str,
    ids: &mut dyn IdGenerator,
) -> Result<BookmarkItem, RegistryError> {
    Ok(BookmarkItem::from_record(BookmarkItemRecord {
        id: read_id(store, key, ids)?,
        name: read_string(store, key, VALUE_NAME)?.unwrap_or_default(),
        location: read_string(store, key, VALUE_LOCATION)?.unwrap_or_default(),
        description: read_string(store, key, VALUE_DESCRIPTION)?.unwrap_or_default(),
        visit_count: read_dword(store, key, VALUE_VISIT_COUNT)?.unwrap_or_default(),
        created_at: read_filetime(store, key, DATE_CREATED)?,
        modified_at: read_filetime(store, key, DATE_MODIFIED)?,
        last_visited_at: read_filetime(store, key, DATE_LAST_VISITED)?,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildKind {
    Folder,
    Item,
}

#[derive(Debug)]
struct ChildKey {
    index: usize,
    name: String,
    kind: ChildKind,
}

/// Matches a subkey name against the child patterns, case-insensitively.
fn classify(name: &str) -> Option<(ChildKind, &str)> {
    strip_prefix_ignore_case(name, FOLDER_KEY_PREFIX)
        .map(|suffix| (ChildKind::Folder, suffix))
        .or_else(|| strip_prefix_ignore_case(name, ITEM_KEY_PREFIX).map(|suffix| (ChildKind::Item, suffix)))
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        name.get(prefix.len()..)
    } else {
        None
    }
}

/// Bookmark subkeys sorted by positional suffix; ties fall back to the name.
fn ordered_child_keys(store: &dyn RegistryStore, key: &str) -> Result<Vec<ChildKey>, RegistryError> {
    let mut children = Vec::new();
    for name in store.subkeys(key)? {
        let Some((kind, suffix)) = classify(&name) else {
            continue;
        };
        match suffix.parse::<usize>() {
            Ok(index) => children.push(ChildKey { index, name, kind }),
            Err(_) => warn!(key, subkey = %name, "ignoring bookmark subkey without a numeric index"),
        }
    }
    children.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));
    Ok(children)
}

fn remove_child_keys(store: &mut dyn RegistryStore, key: &str) -> Result<(), RegistryError> {
    for name in store.subkeys(key)? {
        if classify(&name).is_some() {
            store.delete_key(&join_path(key, &name))?;
        }
    }
    Ok(())
}

fn set_string(store: &mut dyn RegistryStore, key: &str, name: &str, value: &str) -> Result<(), RegistryError> {
    store.set_value(key, name, RegistryValue::String(value.to_string()))
}

fn set_filetime(
    store: &mut dyn RegistryStore,
    key: &str,
    (low, high): (&str, &str),
    time: FileTime,
) -> Result<(), RegistryError> {
    store.set_value(key, low, RegistryValue::Dword(time.low()))?;
    store.set_value(key, high, RegistryValue::Dword(time.high()))
}

fn read_string(store: &dyn RegistryStore, key: &str, name: &str) -> Result<Option<String>, RegistryError> {
    match store.get_value(key, name)? {
        Some(RegistryValue::String(s)) => Ok(Some(s)),
        Some(RegistryValue::Dword(_)) => Err(RegistryError::TypeMismatch(format!(
            "{}\\{} should be a string",
            key, name
        ))),
        None => Ok(None),
    }
}

fn read_dword(store: &dyn RegistryStore, key: &str, name: &str) -> Result<Option<u32>, RegistryError> {
    match store.get_value(key, name)? {
        Some(RegistryValue::Dword(d)) => Ok(Some(d)),
        Some(RegistryValue::String(_)) => Err(RegistryError::TypeMismatch(format!(
            "{}\\{} should be a DWORD",
            key, name
        ))),
        None => Ok(None),
    }
}

/// Missing halves read as zero.
fn read_filetime(
    store: &dyn RegistryStore,
    key: &str,
    (low, high): (&str, &str),
) -> Result<FileTime, RegistryError> {
    let low = read_dword(store, key, low)?.unwrap_or_default();
    let high = read_dword(store, key, high)?.unwrap_or_default();
    Ok(FileTime::from_parts(low, high))
}

/// Stored identifier, or a fresh one when it is absent or unparseable.
fn read_id(store: &dyn RegistryStore, key: &str, ids: &mut dyn IdGenerator) -> Result<BookmarkId, RegistryError> {
    match read_string(store, key, VALUE_ID)? {
        Some(raw) => match raw.parse::<BookmarkId>() {
            Ok(id) => Ok(id),
            Err(e) => {
                warn!(key, value = %raw, error = %e, "invalid stored ID, assigning a new one");
                Ok(ids.next_id())
            }
        },
        None => {
            warn!(key, "no stored ID, assigning a new one");
            Ok(ids.next_id())
        }
    }
}
