//! Unit tests for the BookmarkManager public API.
//!
//! These tests exercise bookmark and folder operations through the
//! `BookmarkManagerTrait` interface, using an in-memory registry store.

use std::rc::Rc;

use shellmarks::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use shellmarks::registry::{try_serialize_to_registry, MemoryRegistry, RegistryStore};
use shellmarks::services::id_generator::SeededIdGenerator;
use shellmarks::services::notifier::{EventLog, ItemNotifier};
use shellmarks::types::bookmark::{
    BookmarkChild, BookmarkEvent, BookmarkFolder, BookmarkId, BookmarkItem,
};
use shellmarks::types::errors::{BookmarkError, RegistryError};

const KEY: &str = "Software\\Shellmarks\\Bookmarks";

/// Helper: a manager over an empty store, with an event log subscribed.
fn setup() -> (BookmarkManager, Rc<EventLog>) {
    setup_with_store(MemoryRegistry::new())
}

fn setup_with_store(store: MemoryRegistry) -> (BookmarkManager, Rc<EventLog>) {
    let notifier = ItemNotifier::shared();
    let log = Rc::new(EventLog::new());
    notifier.subscribe(log.clone());
    let mgr = BookmarkManager::new(
        Box::new(store),
        KEY,
        notifier,
        Box::new(SeededIdGenerator::new(7)),
    );
    (mgr, log)
}

fn root_names(mgr: &BookmarkManager) -> Vec<&str> {
    mgr.root().iter().map(BookmarkChild::name).collect()
}

#[test]
fn test_empty_store_starts_empty_tree() {
    let (mgr, log) = setup();
    assert!(mgr.root().is_empty());
    assert_eq!(mgr.root().name(), "");
    assert_eq!(mgr.root_key(), KEY);
    assert!(log.is_empty());
}

#[test]
fn test_new_loads_existing_tree() {
    let mut ids = SeededIdGenerator::new(1);
    let notifier = ItemNotifier::new();
    let mut tree = BookmarkFolder::new(&mut ids, "Bookmarks");
    tree.insert_item(BookmarkItem::new(&mut ids, "Home", "C:\\Users\\me", ""), None, &notifier);
    let mut store = MemoryRegistry::new();
    try_serialize_to_registry(&tree, &mut store, KEY).unwrap();

    let (mgr, log) = setup_with_store(store);

    assert_eq!(mgr.root(), &tree);
    assert!(log.is_empty());
}

#[test]
fn test_add_bookmark_to_root_and_folder() {
    let (mut mgr, log) = setup();

    let folder = mgr.create_folder(None, "Work", None).unwrap();
    let in_folder = mgr
        .add_bookmark(Some(&folder), "Repo", "D:\\src", "code", None)
        .unwrap();
    let at_root = mgr.add_bookmark(None, "Home", "C:\\Users\\me", "", Some(0)).unwrap();

    assert_eq!(root_names(&mgr), vec!["Home", "Work"]);
    assert_eq!(mgr.root().child_folder_count(), 1);
    let work = mgr.get_folder(&folder).unwrap();
    assert_eq!(work.len(), 1);
    assert_eq!(work.children()[0].id(), &in_folder);
    assert_eq!(mgr.get_item(&at_root).unwrap().location(), "C:\\Users\\me");

    let kinds: Vec<&str> = log
        .events()
        .iter()
        .map(|e| match e {
            BookmarkEvent::FolderAdded(_) => "folder_added",
            BookmarkEvent::ItemAdded(_) => "item_added",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["folder_added", "item_added", "item_added"]);
}

#[test]
fn test_root_id_is_a_valid_parent() {
    let (mut mgr, _log) = setup();
    let root_id = *mgr.root().id();

    mgr.add_bookmark(Some(&root_id), "Home", "C:\\", "", None).unwrap();

    assert_eq!(mgr.root().len(), 1);
    assert!(mgr.get_folder(&root_id).is_some());
}

#[test]
fn test_add_into_bookmark_is_rejected() {
    let (mut mgr, _log) = setup();
    let item = mgr.add_bookmark(None, "Home", "C:\\", "", None).unwrap();

    let result = mgr.add_bookmark(Some(&item), "x", "y", "", None);
    assert_eq!(result, Err(BookmarkError::NotAFolder(item.to_string())));
}

#[test]
fn test_add_into_unknown_folder_is_rejected() {
    let (mut mgr, _log) = setup();
    let stray: BookmarkId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();

    let result = mgr.create_folder(Some(&stray), "x", None);
    assert!(matches!(result, Err(BookmarkError::FolderNotFound(_))));
}

#[test]
fn test_rename_folder_and_bookmark() {
    let (mut mgr, log) = setup();
    let folder = mgr.create_folder(None, "Work", None).unwrap();
    let item = mgr.add_bookmark(Some(&folder), "Repo", "D:\\src", "", None).unwrap();
    log.drain();

    mgr.rename(&folder, "Projects").unwrap();
    mgr.rename(&item, "Source").unwrap();

    assert_eq!(mgr.get_folder(&folder).unwrap().name(), "Projects");
    assert_eq!(mgr.get_item(&item).unwrap().name(), "Source");
    assert_eq!(
        log.drain(),
        vec![BookmarkEvent::ItemModified(folder), BookmarkEvent::ItemModified(item)]
    );
}

#[test]
fn test_update_bookmark_changes_only_given_fields() {
    let (mut mgr, _log) = setup();
    let item = mgr.add_bookmark(None, "Repo", "D:\\src", "code", None).unwrap();

    mgr.update_bookmark(&item, Some("E:\\src"), None).unwrap();

    let bm = mgr.get_item(&item).unwrap();
    assert_eq!(bm.location(), "E:\\src");
    assert_eq!(bm.description(), "code");
}

#[test]
fn test_update_folder_as_bookmark_is_rejected() {
    let (mut mgr, _log) = setup();
    let folder = mgr.create_folder(None, "Work", None).unwrap();

    assert_eq!(
        mgr.update_bookmark(&folder, Some("x"), None),
        Err(BookmarkError::NotABookmark(folder.to_string()))
    );
    assert!(matches!(mgr.record_visit(&folder), Err(BookmarkError::NotABookmark(_))));
}

#[test]
fn test_record_visit_increments() {
    let (mut mgr, _log) = setup();
    let item = mgr.add_bookmark(None, "Home", "C:\\", "", None).unwrap();

    mgr.record_visit(&item).unwrap();
    mgr.record_visit(&item).unwrap();

    let bm = mgr.get_item(&item).unwrap();
    assert_eq!(bm.visit_count(), 2);
    assert!(!bm.last_visited_at().is_zero());
}

#[test]
fn test_remove_folder_takes_subtree() {
    let (mut mgr, log) = setup();
    let folder = mgr.create_folder(None, "Work", None).unwrap();
    let item = mgr.add_bookmark(Some(&folder), "Repo", "D:\\src", "", None).unwrap();
    log.drain();

    let removed = mgr.remove(&folder).unwrap();

    assert_eq!(removed.as_folder().map(BookmarkFolder::len), Some(1));
    assert!(mgr.get_item(&item).is_none());
    assert_eq!(mgr.root().child_folder_count(), 0);
    assert_eq!(log.drain(), vec![BookmarkEvent::FolderRemoved(folder)]);
}

#[test]
fn test_remove_unknown_is_not_found() {
    let (mut mgr, _log) = setup();
    let item = mgr.add_bookmark(None, "Home", "C:\\", "", None).unwrap();
    mgr.remove(&item).unwrap();

    assert_eq!(mgr.remove(&item), Err(BookmarkError::NotFound(item.to_string())));
}

#[test]
fn test_search_matches_name_and_location_case_insensitively() {
    let (mut mgr, _log) = setup();
    let folder = mgr.create_folder(None, "Work", None).unwrap();
    mgr.add_bookmark(Some(&folder), "Repo", "D:\\src\\Shellmarks", "", None)
        .unwrap();
    mgr.add_bookmark(None, "Shell docs", "C:\\docs", "", None).unwrap();
    mgr.add_bookmark(None, "Music", "E:\\music", "", None).unwrap();

    let hits: Vec<&str> = mgr.search("SHELL").into_iter().map(BookmarkItem::name).collect();
    assert_eq!(hits, vec!["Repo", "Shell docs"]);
    assert!(mgr.search("nothing").is_empty());
}

#[test]
fn test_save_then_load_restores_tree() {
    let (mut mgr, _log) = setup();
    let folder = mgr.create_folder(None, "Work", None).unwrap();
    mgr.add_bookmark(Some(&folder), "Repo", "D:\\src", "", None).unwrap();
    mgr.save().unwrap();
    let saved = mgr.root().clone();

    mgr.remove(&folder).unwrap();
    mgr.load().unwrap();

    assert_eq!(mgr.root(), &saved);
    assert!(mgr.store().key_exists(KEY).unwrap());
}

#[test]
fn test_save_to_read_only_store_fails() {
    let mut store = MemoryRegistry::new();
    store.set_read_only(true);
    let (mut mgr, _log) = setup_with_store(store);
    mgr.add_bookmark(None, "Home", "C:\\", "", None).unwrap();

    assert!(matches!(
        mgr.save(),
        Err(BookmarkError::Storage(RegistryError::AccessDenied(_)))
    ));
}

#[test]
fn test_load_without_stored_tree_resets() {
    let (mut mgr, _log) = setup();
    mgr.add_bookmark(None, "Home", "C:\\", "", None).unwrap();

    mgr.load().unwrap();

    assert!(mgr.root().is_empty());
}
