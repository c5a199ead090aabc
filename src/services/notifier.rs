//! Change notification for the bookmark tree.
//!
//! `ItemNotifier` keeps an ordered list of observers and delivers every event
//! synchronously, in subscription order. The notifier is shared through `Rc`
//! and handed to each mutating tree operation. It is not a global.
//!
//! A failing observer is logged and skipped: delivery to the remaining
//! observers continues and the operation that raised the event is unaffected.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::types::bookmark::{BookmarkEvent, BookmarkFolder, BookmarkId, BookmarkItem};
use crate::types::errors::ObserverError;

/// Result returned by every observer hook.
pub type ObserverResult = Result<(), ObserverError>;

/// Capability interface implemented by anything that reacts to tree changes.
///
/// Every hook defaults to a no-op so observers only implement what they need.
pub trait BookmarkObserver {
    /// A bookmark or folder had its metadata changed.
    fn on_item_modified(&self, _id: &BookmarkId) -> ObserverResult {
        Ok(())
    }

    fn on_item_added(&self, _item: &BookmarkItem) -> ObserverResult {
        Ok(())
    }

    fn on_folder_added(&self, _folder: &BookmarkFolder) -> ObserverResult {
        Ok(())
    }

    fn on_item_removed(&self, _id: &BookmarkId) -> ObserverResult {
        Ok(())
    }

    fn on_folder_removed(&self, _id: &BookmarkId) -> ObserverResult {
        Ok(())
    }
}

/// Publish/subscribe hub for bookmark change events.
#[derive(Default)]
pub struct ItemNotifier {
    observers: RefCell<Vec<Rc<dyn BookmarkObserver>>>,
}

impl ItemNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for the common shared case.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Registers an observer. Subscribing the same observer twice has no effect.
    pub fn subscribe(&self, observer: Rc<dyn BookmarkObserver>) {
        let mut observers = self.observers.borrow_mut();
        if observers.iter().any(|o| same_observer(o, &observer)) {
            return;
        }
        observers.push(observer);
    }

    /// Removes an observer. Unknown observers are ignored.
    pub fn unsubscribe<O: BookmarkObserver + ?Sized>(&self, observer: &Rc<O>) {
        self.observers
            .borrow_mut()
            .retain(|o| !same_observer(o, observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn notify_item_modified(&self, id: &BookmarkId) {
        self.dispatch("item_modified", |o| o.on_item_modified(id));
    }

    pub fn notify_item_added(&self, item: &BookmarkItem) {
        self.dispatch("item_added", |o| o.on_item_added(item));
    }

    pub fn notify_folder_added(&self, folder: &BookmarkFolder) {
        self.dispatch("folder_added", |o| o.on_folder_added(folder));
    }

    pub fn notify_item_removed(&self, id: &BookmarkId) {
        self.dispatch("item_removed", |o| o.on_item_removed(id));
    }

    pub fn notify_folder_removed(&self, id: &BookmarkId) {
        self.dispatch("folder_removed", |o| o.on_folder_removed(id));
    }

    fn dispatch<F>(&self, event: &'static str, deliver: F)
    where
        F: Fn(&dyn BookmarkObserver) -> ObserverResult,
    {
        // Snapshot so hooks may subscribe/unsubscribe while we iterate.
        let observers: Vec<Rc<dyn BookmarkObserver>> = self.observers.borrow().clone();
        debug!(event, observers = observers.len(), "delivering bookmark event");

        for (index, observer) in observers.iter().enumerate() {
            if let Err(e) = deliver(observer.as_ref()) {
                warn!(event, observer = index, error = %e, "bookmark observer failed");
            }
        }
    }
}

fn same_observer<A, B>(a: &Rc<A>, b: &Rc<B>) -> bool
where
    A: ?Sized,
    B: ?Sized,
{
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

/// Events an [`EventLog`] keeps before discarding the oldest.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 1024;

/// Observer that records the events it receives, in delivery order.
///
/// Holds at most `capacity` events. Once full, each new event evicts the
/// oldest one and bumps [`EventLog::dropped`].
#[derive(Debug)]
pub struct EventLog {
    events: RefCell<VecDeque<BookmarkEvent>>,
    capacity: usize,
    dropped: Cell<u64>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: RefCell::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
            dropped: Cell::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events evicted since the log was created.
    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }

    /// Returns a copy of the recorded events without clearing them.
    pub fn events(&self) -> Vec<BookmarkEvent> {
        self.events.borrow().iter().cloned().collect()
    }

    /// Removes and returns every recorded event.
    pub fn drain(&self) -> Vec<BookmarkEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    fn record(&self, event: BookmarkEvent) -> ObserverResult {
        let mut events = self.events.borrow_mut();
        if events.len() >= self.capacity {
            events.pop_front();
            let dropped = self.dropped.get() + 1;
            self.dropped.set(dropped);
            if dropped == 1 || dropped % 256 == 0 {
                warn!(capacity = self.capacity, dropped, "event log full, dropping oldest events");
            }
        }
        events.push_back(event);
        Ok(())
    }
}

impl BookmarkObserver for EventLog {
    fn on_item_modified(&self, id: &BookmarkId) -> ObserverResult {
        self.record(BookmarkEvent::ItemModified(*id))
    }

    fn on_item_added(&self, item: &BookmarkItem) -> ObserverResult {
        self.record(BookmarkEvent::ItemAdded(item.clone()))
    }

    fn on_folder_added(&self, folder: &BookmarkFolder) -> ObserverResult {
        self.record(BookmarkEvent::FolderAdded(folder.clone()))
    }

    fn on_item_removed(&self, id: &BookmarkId) -> ObserverResult {
        self.record(BookmarkEvent::ItemRemoved(*id))
    }

    fn on_folder_removed(&self, id: &BookmarkId) -> ObserverResult {
        self.record(BookmarkEvent::FolderRemoved(*id))
    }
}
