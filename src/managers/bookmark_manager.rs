//! Bookmark Manager.
//!
//! Implements `BookmarkManagerTrait`, which addresses nodes by identifier on
//! top of the bookmark tree. It loads the tree from a registry store and saves
//! it back.

use std::rc::Rc;

use tracing::info;

use crate::registry::{
    deserialize_from_registry, try_deserialize_from_registry, try_serialize_to_registry,
    RegistryStore,
};
use crate::services::id_generator::IdGenerator;
use crate::services::notifier::ItemNotifier;
use crate::types::bookmark::{BookmarkChild, BookmarkFolder, BookmarkId, BookmarkItem, ChildMut};
use crate::types::errors::BookmarkError;

/// Trait defining bookmark management operations.
///
/// A `parent` of `None` always means the root folder.
pub trait BookmarkManagerTrait {
    fn root(&self) -> &BookmarkFolder;
    fn add_bookmark(
        &mut self,
        parent: Option<&BookmarkId>,
        name: &str,
        location: &str,
        description: &str,
        position: Option<usize>,
    ) -> Result<BookmarkId, BookmarkError>;
    fn create_folder(
        &mut self,
        parent: Option<&BookmarkId>,
        name: &str,
        position: Option<usize>,
    ) -> Result<BookmarkId, BookmarkError>;
    /// Renames a folder or a bookmark.
    fn rename(&mut self, id: &BookmarkId, name: &str) -> Result<(), BookmarkError>;
    fn update_bookmark(
        &mut self,
        id: &BookmarkId,
        location: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), BookmarkError>;
    fn record_visit(&mut self, id: &BookmarkId) -> Result<(), BookmarkError>;
    fn remove(&mut self, id: &BookmarkId) -> Result<BookmarkChild, BookmarkError>;
    fn get_item(&self, id: &BookmarkId) -> Option<&BookmarkItem>;
    fn get_folder(&self, id: &BookmarkId) -> Option<&BookmarkFolder>;
    /// Case-insensitive match on bookmark name or location, depth-first.
    fn search(&self, query: &str) -> Vec<&BookmarkItem>;
    /// Replaces the in-memory tree with the stored one.
    fn load(&mut self) -> Result<(), BookmarkError>;
    fn save(&mut self) -> Result<(), BookmarkError>;
}

/// Bookmark tree bound to a registry store.
pub struct BookmarkManager {
    root: BookmarkFolder,
    store: Box<dyn RegistryStore>,
    root_key: String,
    notifier: Rc<ItemNotifier>,
    ids: Box<dyn IdGenerator>,
}

impl BookmarkManager {
    /// Creates a manager and loads whatever tree is stored under `root_key`.
    ///
    /// A missing or unreadable key starts an empty tree.
    pub fn new(
        store: Box<dyn RegistryStore>,
        root_key: &str,
        notifier: Rc<ItemNotifier>,
        mut ids: Box<dyn IdGenerator>,
    ) -> Self {
        let root = deserialize_from_registry(store.as_ref(), root_key, ids.as_mut());
        Self {
            root,
            store,
            root_key: root_key.to_string(),
            notifier,
            ids,
        }
    }

    pub fn notifier(&self) -> &Rc<ItemNotifier> {
        &self.notifier
    }

    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    pub fn store(&self) -> &dyn RegistryStore {
        self.store.as_ref()
    }

    /// Looks up a node for direct editing. The root is not included.
    pub fn find_mut(&mut self, id: &BookmarkId) -> Option<ChildMut<'_>> {
        self.root.find_mut(id)
    }
}

/// Resolves `parent` to a folder inside `root`.
fn folder_mut<'a>(
    root: &'a mut BookmarkFolder,
    parent: Option<&BookmarkId>,
) -> Result<&'a mut BookmarkFolder, BookmarkError> {
    let Some(id) = parent else {
        return Ok(root);
    };
    if root.id() == id {
        return Ok(root);
    }
    match root.find_mut(id) {
        Some(ChildMut::Folder(folder)) => Ok(folder),
        Some(ChildMut::Item(_)) => Err(BookmarkError::NotAFolder(id.to_string())),
        None => Err(BookmarkError::FolderNotFound(id.to_string())),
    }
}

fn collect_matches<'a>(folder: &'a BookmarkFolder, needle: &str, out: &mut Vec<&'a BookmarkItem>) {
    for child in folder {
        match child {
            BookmarkChild::Folder(nested) => collect_matches(nested, needle, out),
            BookmarkChild::Item(item) => {
                if item.name().to_lowercase().contains(needle)
                    || item.location().to_lowercase().contains(needle)
                {
                    out.push(item);
                }
            }
        }
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    fn root(&self) -> &BookmarkFolder {
        &self.root
    }

    fn add_bookmark(
        &mut self,
        parent: Option<&BookmarkId>,
        name: &str,
        location: &str,
        description: &str,
        position: Option<usize>,
    ) -> Result<BookmarkId, BookmarkError> {
        let folder = folder_mut(&mut self.root, parent)?;
        let item = BookmarkItem::new(self.ids.as_mut(), name, location, description);
        let id = *item.id();
        folder.insert_item(item, position, &self.notifier);
        Ok(id)
    }

    fn create_folder(
        &mut self,
        parent: Option<&BookmarkId>,
        name: &str,
        position: Option<usize>,
    ) -> Result<BookmarkId, BookmarkError> {
        let folder = folder_mut(&mut self.root, parent)?;
        let created = BookmarkFolder::new(self.ids.as_mut(), name);
        let id = *created.id();
        folder.insert_folder(created, position, &self.notifier);
        Ok(id)
    }

    fn rename(&mut self, id: &BookmarkId, name: &str) -> Result<(), BookmarkError> {
        if self.root.id() == id {
            self.root.set_name(name, &self.notifier);
            return Ok(());
        }
        match self.root.find_mut(id) {
            Some(ChildMut::Folder(folder)) => folder.set_name(name, &self.notifier),
            Some(ChildMut::Item(item)) => item.set_name(name, &self.notifier),
            None => return Err(BookmarkError::NotFound(id.to_string())),
        }
        Ok(())
    }

    fn update_bookmark(
        &mut self,
        id: &BookmarkId,
        location: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), BookmarkError> {
        match self.root.find_mut(id) {
            Some(ChildMut::Item(item)) => {
                if let Some(location) = location {
                    item.set_location(location, &self.notifier);
                }
                if let Some(description) = description {
                    item.set_description(description, &self.notifier);
                }
                Ok(())
            }
            Some(ChildMut::Folder(_)) => Err(BookmarkError::NotABookmark(id.to_string())),
            None => Err(BookmarkError::NotFound(id.to_string())),
        }
    }

    fn record_visit(&mut self, id: &BookmarkId) -> Result<(), BookmarkError> {
        match self.root.find_mut(id) {
            Some(ChildMut::Item(item)) => {
                item.record_visit(&self.notifier);
                Ok(())
            }
            Some(ChildMut::Folder(_)) => Err(BookmarkError::NotABookmark(id.to_string())),
            None => Err(BookmarkError::NotFound(id.to_string())),
        }
    }

    fn remove(&mut self, id: &BookmarkId) -> Result<BookmarkChild, BookmarkError> {
        self.root
            .remove(id, &self.notifier)
            .ok_or_else(|| BookmarkError::NotFound(id.to_string()))
    }

    fn get_item(&self, id: &BookmarkId) -> Option<&BookmarkItem> {
        self.root.find(id).and_then(BookmarkChild::as_item)
    }

    fn get_folder(&self, id: &BookmarkId) -> Option<&BookmarkFolder> {
        if self.root.id() == id {
            return Some(&self.root);
        }
        self.root.find(id).and_then(BookmarkChild::as_folder)
    }

    fn search(&self, query: &str) -> Vec<&BookmarkItem> {
        let mut results = Vec::new();
        collect_matches(&self.root, &query.to_lowercase(), &mut results);
        results
    }

    fn load(&mut self) -> Result<(), BookmarkError> {
        self.root = match try_deserialize_from_registry(self.store.as_ref(), &self.root_key, self.ids.as_mut())? {
            Some(folder) => folder,
            None => BookmarkFolder::new(self.ids.as_mut(), ""),
        };
        info!(key = %self.root_key, children = self.root.len(), "bookmarks loaded");
        Ok(())
    }

    fn save(&mut self) -> Result<(), BookmarkError> {
        try_serialize_to_registry(&self.root, self.store.as_mut(), &self.root_key)?;
        info!(key = %self.root_key, children = self.root.len(), "bookmarks saved");
        Ok(())
    }
}
