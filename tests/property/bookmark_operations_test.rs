//! Property-based tests for bookmark folder operations.
//!
//! A folder is driven through arbitrary sequences of inserts and removals and
//! compared against a plain `Vec` model after every step.

use std::rc::Rc;

use proptest::prelude::*;

use shellmarks::services::id_generator::SeededIdGenerator;
use shellmarks::services::notifier::{EventLog, ItemNotifier};
use shellmarks::types::bookmark::{BookmarkEvent, BookmarkFolder, BookmarkItem};

#[derive(Debug, Clone)]
enum Op {
    InsertItem { name: String, position: Option<usize> },
    InsertFolder { name: String, position: Option<usize> },
    /// Removes the child at `index % len`, if any.
    Remove { index: usize },
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ]{0,12}"
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (arb_name(), proptest::option::of(0usize..12))
            .prop_map(|(name, position)| Op::InsertItem { name, position }),
        (arb_name(), proptest::option::of(0usize..12))
            .prop_map(|(name, position)| Op::InsertFolder { name, position }),
        (0usize..16).prop_map(|index| Op::Remove { index }),
    ]
}

fn model_insert(model: &mut Vec<(String, bool)>, entry: (String, bool), position: Option<usize>) -> usize {
    let index = match position {
        Some(p) if p < model.len() => p,
        _ => model.len(),
    };
    model.insert(index, entry);
    index
}

// **Folder tracks the model**
//
// *For any* sequence of operations, the folder's children, their kinds and
// the cached folder count SHALL match a naive list model, and each insert
// SHALL report the index the model predicts.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn folder_matches_list_model(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut ids = SeededIdGenerator::new(99);
        let notifier = ItemNotifier::new();
        let mut folder = BookmarkFolder::new(&mut ids, "root");
        let mut model: Vec<(String, bool)> = Vec::new();

        for op in ops {
            match op {
                Op::InsertItem { name, position } => {
                    let item = BookmarkItem::new(&mut ids, &name, "C:\\", "");
                    let got = folder.insert_item(item, position, &notifier);
                    let expected = model_insert(&mut model, (name, false), position);
                    prop_assert_eq!(got, expected);
                }
                Op::InsertFolder { name, position } => {
                    let sub = BookmarkFolder::new(&mut ids, &name);
                    let got = folder.insert_folder(sub, position, &notifier);
                    let expected = model_insert(&mut model, (name, true), position);
                    prop_assert_eq!(got, expected);
                }
                Op::Remove { index } => {
                    if model.is_empty() {
                        continue;
                    }
                    let index = index % model.len();
                    let id = *folder.children()[index].id();
                    let removed = folder.remove(&id, &notifier);
                    prop_assert!(removed.is_some());
                    model.remove(index);
                }
            }

            let actual: Vec<(String, bool)> = folder
                .iter()
                .map(|c| (c.name().to_string(), c.is_folder()))
                .collect();
            prop_assert_eq!(&actual, &model);
            prop_assert_eq!(
                folder.child_folder_count(),
                model.iter().filter(|(_, is_folder)| *is_folder).count()
            );
            prop_assert_eq!(folder.has_child_folder(), folder.child_folder_count() > 0);
        }
    }
}

// **One event per mutation**
//
// *For any* batch of inserts followed by removing everything, the notifier
// SHALL deliver exactly one added event per insert and one removed event per
// removal, with matching kinds.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_mutation_notifies_once(kinds in proptest::collection::vec(any::<bool>(), 0..20)) {
        let mut ids = SeededIdGenerator::new(5);
        let notifier = ItemNotifier::new();
        let log = Rc::new(EventLog::new());
        notifier.subscribe(log.clone());
        let mut folder = BookmarkFolder::new(&mut ids, "root");

        for (i, is_folder) in kinds.iter().enumerate() {
            let name = format!("n{}", i);
            if *is_folder {
                folder.insert_folder(BookmarkFolder::new(&mut ids, &name), None, &notifier);
            } else {
                folder.insert_item(BookmarkItem::new(&mut ids, &name, "C:\\", ""), None, &notifier);
            }
        }
        let all: Vec<_> = folder.iter().map(|c| *c.id()).collect();
        for id in &all {
            folder.remove(id, &notifier);
        }

        let events = log.drain();
        prop_assert_eq!(events.len(), kinds.len() * 2);
        for (event, is_folder) in events.iter().zip(kinds.iter().chain(kinds.iter())) {
            let event_is_folder = matches!(
                event,
                BookmarkEvent::FolderAdded(_) | BookmarkEvent::FolderRemoved(_)
            );
            prop_assert_eq!(event_is_folder, *is_folder);
        }
        prop_assert!(folder.is_empty());
        prop_assert_eq!(folder.child_folder_count(), 0);
    }
}
