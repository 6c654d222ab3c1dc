//! Property-based tests for topic tree operations.
//!
//! These verify that path resolution is idempotent, that reparenting can
//! never introduce a cycle, and that deleting a topic removes exactly its
//! own subtree.

use proptest::prelude::*;

use bookmarkd::database::Database;
use bookmarkd::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use bookmarkd::managers::topic_manager::{TopicManager, TopicManagerTrait};
use bookmarkd::types::errors::TopicError;

/// Strategy for topic names: short enough that a generated name can never
/// collide with a browser container label, which path resolution strips.
fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,6}"
}

fn arb_path() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_name(), 1..=4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Resolving the same path twice creates everything once and then
    /// nothing, returning the same leaf.
    #[test]
    fn ensure_path_is_idempotent(path in arb_path()) {
        let db = Database::open_in_memory()
            .expect("Failed to open in-memory database");
        let mut topics = TopicManager::new(db.connection());

        let (leaf, created) = topics.ensure_path(&path)
            .expect("ensure_path should succeed for valid names");
        prop_assert_eq!(created, path.len());

        let (leaf_again, created_again) = topics.ensure_path(&path)
            .expect("re-resolving an existing path should succeed");
        prop_assert_eq!(leaf_again, leaf);
        prop_assert_eq!(created_again, 0);
    }

    /// Moving any topic of a chain into any of its own descendants, or
    /// itself, is always rejected and leaves the tree unchanged.
    #[test]
    fn reparent_never_creates_cycles(names in proptest::collection::vec(arb_name(), 2..=5)) {
        let db = Database::open_in_memory()
            .expect("Failed to open in-memory database");
        let mut topics = TopicManager::new(db.connection());
        let root = topics.root().expect("root should exist");

        // Build a chain root -> names[0] -> names[1] -> ...
        let mut ids = Vec::new();
        let mut parent = root.id.clone();
        for name in &names {
            let id = topics.create(name, &parent).expect("create should succeed");
            ids.push(id.clone());
            parent = id;
        }

        for i in 0..ids.len() {
            for j in i..ids.len() {
                let result = topics.reparent(&ids[i], &ids[j]);
                prop_assert!(
                    matches!(result, Err(TopicError::CycleDetected(_))),
                    "moving {} under its descendant {} must be rejected",
                    i,
                    j
                );
            }
        }

        // The chain is intact: each topic still hangs off its predecessor
        let mut expected_parent = root.id;
        for id in &ids {
            let topic = topics.get(id).expect("chain topic should survive");
            prop_assert_eq!(topic.parent_id.as_deref(), Some(expected_parent.as_str()));
            expected_parent = topic.id;
        }
    }

    /// Deleting the head of a chain removes the whole chain and its
    /// bookmarks while an unrelated sibling keeps both.
    #[test]
    fn delete_removes_exactly_the_subtree(
        names in proptest::collection::vec(arb_name(), 1..=4),
        sibling_name in arb_name(),
        url in "[a-z]{3,10}",
    ) {
        let db = Database::open_in_memory()
            .expect("Failed to open in-memory database");
        let mut topics = TopicManager::new(db.connection());
        let root = topics.root().expect("root should exist");

        let mut ids = Vec::new();
        let mut parent = root.id.clone();
        for name in &names {
            let id = topics.create(name, &parent).expect("create should succeed");
            ids.push(id.clone());
            parent = id;
        }
        let sibling = topics.create(&sibling_name, &root.id)
            .expect("create should succeed");

        let (doomed_bookmark, kept_bookmark) = {
            let mut bookmarks = BookmarkManager::new(db.connection());
            let doomed = bookmarks
                .add("Doomed", &format!("https://{}.example", url), ids.last().unwrap())
                .expect("add should succeed");
            let kept = bookmarks
                .add("Kept", &format!("https://{}.example/kept", url), &sibling)
                .expect("add should succeed");
            (doomed, kept)
        };

        topics.delete(&ids[0]).expect("delete should succeed");

        for id in &ids {
            prop_assert!(matches!(topics.get(id), Err(TopicError::NotFound(_))));
        }
        prop_assert!(topics.get(&sibling).is_ok());

        let bookmarks = BookmarkManager::new(db.connection());
        prop_assert!(bookmarks.get(&doomed_bookmark).is_err());
        prop_assert!(bookmarks.get(&kept_bookmark).is_ok());
    }
}
