//! Bookmark tree model: items, folders and the tagged child union.
//!
//! A folder owns its children by value; cloning a folder deep-copies its
//! subtree. Nodes never point back at their parent, and notifications refer
//! to nodes by [`BookmarkId`].

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::services::id_generator::IdGenerator;
use crate::services::notifier::ItemNotifier;

/// Opaque 128-bit identifier of a bookmark or folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(Uuid);

impl BookmarkId {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for BookmarkId {
    type Err = uuid::Error;

    /// Accepts hyphenated, simple and braced (`{...}`) forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Timestamp in 100-nanosecond ticks since 1601-01-01 UTC.
///
/// Stored as two 32-bit halves, see [`FileTime::low`] and [`FileTime::high`].
/// Serializes as UNIX seconds, or `null` when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileTime(u64);

impl FileTime {
    pub const ZERO: FileTime = FileTime(0);

    /// Ticks between 1601-01-01 and 1970-01-01.
    const UNIX_EPOCH_TICKS: u64 = 116_444_736_000_000_000;
    const TICKS_PER_SECOND: u64 = 10_000_000;

    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(Self::UNIX_EPOCH_TICKS + (since_epoch.as_nanos() / 100) as u64)
    }

    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub const fn from_parts(low: u32, high: u32) -> Self {
        Self(((high as u64) << 32) | low as u64)
    }

    pub const fn ticks(self) -> u64 {
        self.0
    }

    pub const fn low(self) -> u32 {
        self.0 as u32
    }

    pub const fn high(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Seconds since the UNIX epoch, negative for instants before 1970.
    pub fn unix_seconds(self) -> i64 {
        let ticks = i128::from(self.0) - i128::from(Self::UNIX_EPOCH_TICKS);
        (ticks / i128::from(Self::TICKS_PER_SECOND)) as i64
    }
}

impl Serialize for FileTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_zero() {
            serializer.serialize_none()
        } else {
            serializer.serialize_i64(self.unix_seconds())
        }
    }
}

// === BookmarkItem ===

/// A leaf node pointing at a location (path or URL).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkItem {
    id: BookmarkId,
    name: String,
    location: String,
    description: String,
    visit_count: u32,
    created_at: FileTime,
    modified_at: FileTime,
    last_visited_at: FileTime,
}

/// Every persisted attribute of a [`BookmarkItem`], used to rebuild one from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkItemRecord {
    pub id: BookmarkId,
    pub name: String,
    pub location: String,
    pub description: String,
    pub visit_count: u32,
    pub created_at: FileTime,
    pub modified_at: FileTime,
    pub last_visited_at: FileTime,
}

impl BookmarkItem {
    /// Creates a fresh bookmark with a new identifier and creation time.
    pub fn new(ids: &mut dyn IdGenerator, name: &str, location: &str, description: &str) -> Self {
        let now = FileTime::now();
        Self {
            id: ids.next_id(),
            name: name.to_string(),
            location: location.to_string(),
            description: description.to_string(),
            visit_count: 0,
            created_at: now,
            modified_at: now,
            last_visited_at: FileTime::ZERO,
        }
    }

    /// Rebuilds a bookmark exactly as it was persisted.
    pub fn from_record(record: BookmarkItemRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            location: record.location,
            description: record.description,
            visit_count: record.visit_count,
            created_at: record.created_at,
            modified_at: record.modified_at,
            last_visited_at: record.last_visited_at,
        }
    }

    pub fn to_record(&self) -> BookmarkItemRecord {
        BookmarkItemRecord {
            id: self.id,
            name: self.name.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            visit_count: self.visit_count,
            created_at: self.created_at,
            modified_at: self.modified_at,
            last_visited_at: self.last_visited_at,
        }
    }

    pub fn id(&self) -> &BookmarkId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    pub fn created_at(&self) -> FileTime {
        self.created_at
    }

    pub fn modified_at(&self) -> FileTime {
        self.modified_at
    }

    /// [`FileTime::ZERO`] until the first recorded visit.
    pub fn last_visited_at(&self) -> FileTime {
        self.last_visited_at
    }

    pub fn set_name(&mut self, name: &str, notifier: &ItemNotifier) {
        self.name = name.to_string();
        self.touch(notifier);
    }

    pub fn set_location(&mut self, location: &str, notifier: &ItemNotifier) {
        self.location = location.to_string();
        self.touch(notifier);
    }

    pub fn set_description(&mut self, description: &str, notifier: &ItemNotifier) {
        self.description = description.to_string();
        self.touch(notifier);
    }

    /// Counts one visit and stamps the visit time.
    pub fn record_visit(&mut self, notifier: &ItemNotifier) {
        self.visit_count = self.visit_count.saturating_add(1);
        self.last_visited_at = FileTime::now();
        notifier.notify_item_modified(&self.id);
    }

    fn touch(&mut self, notifier: &ItemNotifier) {
        self.modified_at = FileTime::now();
        notifier.notify_item_modified(&self.id);
    }
}

// === BookmarkChild ===

/// A direct child of a folder: either a nested folder or a bookmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BookmarkChild {
    Folder(BookmarkFolder),
    Item(BookmarkItem),
}

impl BookmarkChild {
    pub fn id(&self) -> &BookmarkId {
        match self {
            BookmarkChild::Folder(folder) => folder.id(),
            BookmarkChild::Item(item) => item.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BookmarkChild::Folder(folder) => folder.name(),
            BookmarkChild::Item(item) => item.name(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, BookmarkChild::Folder(_))
    }

    pub fn as_folder(&self) -> Option<&BookmarkFolder> {
        match self {
            BookmarkChild::Folder(folder) => Some(folder),
            BookmarkChild::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&BookmarkItem> {
        match self {
            BookmarkChild::Item(item) => Some(item),
            BookmarkChild::Folder(_) => None,
        }
    }

    fn as_child_mut(&mut self) -> ChildMut<'_> {
        match self {
            BookmarkChild::Folder(folder) => ChildMut::Folder(folder),
            BookmarkChild::Item(item) => ChildMut::Item(item),
        }
    }
}

/// Mutable view of a child.
///
/// Unlike `&mut BookmarkChild` it cannot turn a folder into a bookmark, which
/// would desynchronise the parent's folder count.
#[derive(Debug)]
pub enum ChildMut<'a> {
    Folder(&'a mut BookmarkFolder),
    Item(&'a mut BookmarkItem),
}

impl ChildMut<'_> {
    pub fn id(&self) -> &BookmarkId {
        match self {
            ChildMut::Folder(folder) => folder.id(),
            ChildMut::Item(item) => item.id(),
        }
    }
}

// === BookmarkFolder ===

/// A composite node holding an ordered list of folders and bookmarks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkFolder {
    id: BookmarkId,
    name: String,
    created_at: FileTime,
    modified_at: FileTime,
    child_folder_count: usize,
    children: Vec<BookmarkChild>,
}

impl BookmarkFolder {
    /// Creates a fresh, empty folder.
    pub fn new(ids: &mut dyn IdGenerator, name: &str) -> Self {
        let now = FileTime::now();
        Self::restore(ids.next_id(), name, now, now)
    }

    /// Rebuilds an empty folder with persisted identity and timestamps.
    pub fn restore(id: BookmarkId, name: &str, created_at: FileTime, modified_at: FileTime) -> Self {
        Self {
            id,
            name: name.to_string(),
            created_at,
            modified_at,
            child_folder_count: 0,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &BookmarkId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> FileTime {
        self.created_at
    }

    pub fn modified_at(&self) -> FileTime {
        self.modified_at
    }

    /// Number of direct children that are folders.
    pub fn child_folder_count(&self) -> usize {
        self.child_folder_count
    }

    pub fn has_child_folder(&self) -> bool {
        self.child_folder_count > 0
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[BookmarkChild] {
        &self.children
    }

    /// Direct children in order. Not recursive.
    pub fn iter(&self) -> std::slice::Iter<'_, BookmarkChild> {
        self.children.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = ChildMut<'_>> {
        self.children.iter_mut().map(BookmarkChild::as_child_mut)
    }

    pub fn set_name(&mut self, name: &str, notifier: &ItemNotifier) {
        self.name = name.to_string();
        self.modified_at = FileTime::now();
        notifier.notify_item_modified(&self.id);
    }

    /// Inserts a bookmark at `position`, or appends when the position is
    /// omitted or not below `len()`. Returns the index used.
    pub fn insert_item(
        &mut self,
        item: BookmarkItem,
        position: Option<usize>,
        notifier: &ItemNotifier,
    ) -> usize {
        let index = self.insert_child(BookmarkChild::Item(item), position);
        if let Some(BookmarkChild::Item(stored)) = self.children.get(index) {
            notifier.notify_item_added(stored);
        }
        index
    }

    /// Inserts a folder with the same position rules as [`Self::insert_item`].
    pub fn insert_folder(
        &mut self,
        folder: BookmarkFolder,
        position: Option<usize>,
        notifier: &ItemNotifier,
    ) -> usize {
        let index = self.insert_child(BookmarkChild::Folder(folder), position);
        if let Some(BookmarkChild::Folder(stored)) = self.children.get(index) {
            notifier.notify_folder_added(stored);
        }
        index
    }

    /// Removes the descendant with `id`, at any depth, and returns it.
    pub fn remove(&mut self, id: &BookmarkId, notifier: &ItemNotifier) -> Option<BookmarkChild> {
        let removed = self.detach(id)?;
        match &removed {
            BookmarkChild::Folder(folder) => notifier.notify_folder_removed(folder.id()),
            BookmarkChild::Item(item) => notifier.notify_item_removed(item.id()),
        }
        Some(removed)
    }

    /// Depth-first search over descendants. The folder itself is not a match.
    pub fn find(&self, id: &BookmarkId) -> Option<&BookmarkChild> {
        for child in &self.children {
            if child.id() == id {
                return Some(child);
            }
            if let BookmarkChild::Folder(folder) = child {
                if let Some(found) = folder.find(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_mut(&mut self, id: &BookmarkId) -> Option<ChildMut<'_>> {
        self.children.iter_mut().find_map(|child| {
            if child.id() == id {
                Some(child.as_child_mut())
            } else if let BookmarkChild::Folder(folder) = child {
                folder.find_mut(id)
            } else {
                None
            }
        })
    }

    /// Appends a persisted child without notifying or touching `modified_at`.
    pub(crate) fn push_restored(&mut self, child: BookmarkChild) {
        if child.is_folder() {
            self.child_folder_count += 1;
        }
        self.children.push(child);
    }

    fn insert_child(&mut self, child: BookmarkChild, position: Option<usize>) -> usize {
        let index = match position {
            Some(p) if p < self.children.len() => p,
            _ => self.children.len(),
        };
        if child.is_folder() {
            self.child_folder_count += 1;
        }
        self.children.insert(index, child);
        self.modified_at = FileTime::now();
        index
    }

    fn detach(&mut self, id: &BookmarkId) -> Option<BookmarkChild> {
        if let Some(index) = self.children.iter().position(|c| c.id() == id) {
            let child = self.children.remove(index);
            if child.is_folder() {
                self.child_folder_count -= 1;
            }
            self.modified_at = FileTime::now();
            return Some(child);
        }

        self.children.iter_mut().find_map(|child| match child {
            BookmarkChild::Folder(folder) => folder.detach(id),
            BookmarkChild::Item(_) => None,
        })
    }
}

impl<'a> IntoIterator for &'a BookmarkFolder {
    type Item = &'a BookmarkChild;
    type IntoIter = std::slice::Iter<'a, BookmarkChild>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

// === BookmarkEvent ===

/// Owned record of a single notification, as captured by an event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum BookmarkEvent {
    ItemModified(BookmarkId),
    ItemAdded(BookmarkItem),
    FolderAdded(BookmarkFolder),
    ItemRemoved(BookmarkId),
    FolderRemoved(BookmarkId),
}
