//! Unit tests for `ItemNotifier` subscription and delivery.

use std::cell::RefCell;
use std::rc::Rc;

use shellmarks::services::id_generator::{IdGenerator, SeededIdGenerator};
use shellmarks::services::notifier::{
    BookmarkObserver, EventLog, ItemNotifier, ObserverResult, DEFAULT_EVENT_LOG_CAPACITY,
};
use shellmarks::types::bookmark::{BookmarkEvent, BookmarkFolder, BookmarkId, BookmarkItem};
use shellmarks::types::errors::ObserverError;

/// Writes its label into a shared journal on every modification.
struct Recorder {
    label: &'static str,
    journal: Rc<RefCell<Vec<&'static str>>>,
}

impl BookmarkObserver for Recorder {
    fn on_item_modified(&self, _id: &BookmarkId) -> ObserverResult {
        self.journal.borrow_mut().push(self.label);
        Ok(())
    }
}

/// Unsubscribes itself the first time it hears about a removal.
struct OneShot {
    notifier: Rc<ItemNotifier>,
    me: RefCell<Option<Rc<OneShot>>>,
    calls: RefCell<usize>,
}

impl BookmarkObserver for OneShot {
    fn on_item_removed(&self, _id: &BookmarkId) -> ObserverResult {
        *self.calls.borrow_mut() += 1;
        if let Some(me) = self.me.borrow_mut().take() {
            self.notifier.unsubscribe(&me);
        }
        Ok(())
    }
}

struct Rejecting;

impl BookmarkObserver for Rejecting {
    fn on_item_added(&self, item: &BookmarkItem) -> ObserverResult {
        Err(ObserverError::new(format!("cannot show {}", item.name())))
    }

    fn on_folder_added(&self, _folder: &BookmarkFolder) -> ObserverResult {
        Err(ObserverError::new("folder view closed"))
    }
}

#[test]
fn test_observers_run_in_subscription_order() {
    let notifier = ItemNotifier::new();
    let journal = Rc::new(RefCell::new(Vec::new()));
    for label in ["first", "second", "third"] {
        notifier.subscribe(Rc::new(Recorder {
            label,
            journal: journal.clone(),
        }));
    }

    notifier.notify_item_modified(&SeededIdGenerator::new(1).next_id());

    assert_eq!(*journal.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let notifier = ItemNotifier::new();
    let log = Rc::new(EventLog::new());
    notifier.subscribe(log.clone());
    let mut ids = SeededIdGenerator::new(2);

    notifier.notify_item_removed(&ids.next_id());
    notifier.unsubscribe(&log);
    notifier.notify_item_removed(&ids.next_id());

    assert_eq!(log.len(), 1);
    assert_eq!(notifier.observer_count(), 0);
}

#[test]
fn test_unsubscribe_unknown_observer_is_ignored() {
    let notifier = ItemNotifier::new();
    let subscribed = Rc::new(EventLog::new());
    let stranger = Rc::new(EventLog::new());
    notifier.subscribe(subscribed.clone());

    notifier.unsubscribe(&stranger);

    assert_eq!(notifier.observer_count(), 1);
}

#[test]
fn test_no_observers_is_a_no_op() {
    let notifier = ItemNotifier::new();
    notifier.notify_folder_removed(&SeededIdGenerator::new(3).next_id());
    assert_eq!(notifier.observer_count(), 0);
}

#[test]
fn test_observer_may_unsubscribe_during_delivery() {
    let notifier = ItemNotifier::shared();
    let one_shot = Rc::new(OneShot {
        notifier: notifier.clone(),
        me: RefCell::new(None),
        calls: RefCell::new(0),
    });
    *one_shot.me.borrow_mut() = Some(one_shot.clone());
    let log = Rc::new(EventLog::new());
    notifier.subscribe(one_shot.clone());
    notifier.subscribe(log.clone());

    let mut ids = SeededIdGenerator::new(4);
    notifier.notify_item_removed(&ids.next_id());
    notifier.notify_item_removed(&ids.next_id());

    assert_eq!(*one_shot.calls.borrow(), 1);
    assert_eq!(log.len(), 2);
    assert_eq!(notifier.observer_count(), 1);
}

#[test]
fn test_failing_observer_does_not_block_later_ones() {
    let notifier = ItemNotifier::new();
    let log = Rc::new(EventLog::new());
    notifier.subscribe(Rc::new(Rejecting));
    notifier.subscribe(log.clone());

    let mut ids = SeededIdGenerator::new(5);
    let item = BookmarkItem::new(&mut ids, "Home", "C:\\Users\\me", "");
    let folder = BookmarkFolder::new(&mut ids, "Projects");
    notifier.notify_item_added(&item);
    notifier.notify_folder_added(&folder);

    assert_eq!(
        log.drain(),
        vec![
            BookmarkEvent::ItemAdded(item),
            BookmarkEvent::FolderAdded(folder),
        ]
    );
}

#[test]
fn test_every_event_kind_is_delivered() {
    let notifier = ItemNotifier::new();
    let log = Rc::new(EventLog::new());
    notifier.subscribe(log.clone());

    let mut ids = SeededIdGenerator::new(6);
    let item = BookmarkItem::new(&mut ids, "a", "b", "c");
    let folder = BookmarkFolder::new(&mut ids, "f");
    let id = ids.next_id();

    notifier.notify_item_modified(&id);
    notifier.notify_item_added(&item);
    notifier.notify_folder_added(&folder);
    notifier.notify_item_removed(item.id());
    notifier.notify_folder_removed(folder.id());

    assert_eq!(
        log.events(),
        vec![
            BookmarkEvent::ItemModified(id),
            BookmarkEvent::ItemAdded(item.clone()),
            BookmarkEvent::FolderAdded(folder.clone()),
            BookmarkEvent::ItemRemoved(*item.id()),
            BookmarkEvent::FolderRemoved(*folder.id()),
        ]
    );
}

#[test]
fn test_event_log_keeps_only_the_newest_events() {
    let notifier = ItemNotifier::new();
    let log = Rc::new(EventLog::with_capacity(2));
    notifier.subscribe(log.clone());

    let mut ids = SeededIdGenerator::new(8);
    let (a, b, c) = (ids.next_id(), ids.next_id(), ids.next_id());
    notifier.notify_item_removed(&a);
    notifier.notify_item_removed(&b);
    notifier.notify_folder_removed(&c);

    assert_eq!(log.len(), 2);
    assert_eq!(log.dropped(), 1);
    assert_eq!(
        log.drain(),
        vec![BookmarkEvent::ItemRemoved(b), BookmarkEvent::FolderRemoved(c)]
    );

    notifier.notify_item_modified(&a);
    assert_eq!(log.events(), vec![BookmarkEvent::ItemModified(a)]);
}

#[test]
fn test_default_event_log_is_bounded() {
    let log = EventLog::new();
    assert_eq!(log.capacity(), DEFAULT_EVENT_LOG_CAPACITY);
    assert_eq!(EventLog::with_capacity(0).capacity(), 1);
}

#[test]
fn test_rename_reaches_both_observers_until_one_leaves() {
    let notifier = ItemNotifier::new();
    let journal = Rc::new(RefCell::new(Vec::new()));
    let first = Rc::new(Recorder {
        label: "first",
        journal: journal.clone(),
    });
    let second = Rc::new(Recorder {
        label: "second",
        journal: journal.clone(),
    });
    notifier.subscribe(first.clone());
    notifier.subscribe(second.clone());

    let mut ids = SeededIdGenerator::new(7);
    let mut folder = BookmarkFolder::new(&mut ids, "Work");
    folder.set_name("Projects", &notifier);
    assert_eq!(*journal.borrow(), vec!["first", "second"]);

    notifier.unsubscribe(&first);
    folder.set_name("Archive", &notifier);
    assert_eq!(*journal.borrow(), vec!["first", "second", "second"]);
}
