//! Feed window behavior: ordering, replacement snapshots, teardown safety.

use feedline::{
    FeedSubscriber, PostCollection, PostDraft, PrincipalId, Timestamp, WindowConfig,
};
use proptest::prelude::*;

fn draft(author: &str, text: &str) -> PostDraft {
    PostDraft::text(PrincipalId::new(author), author, text)
}

fn texts(feed: &FeedSubscriber) -> Vec<String> {
    feed.posts().iter().map(|p| p.text.clone()).collect()
}

// --- Ordering ---

#[test]
fn test_window_shows_three_newest_in_order() {
    let collection = PostCollection::new();
    for (text, at) in [("t10", 10), ("t9", 9), ("t8", 8), ("t7", 7), ("t6", 6)] {
        collection.insert_at(draft("alice", text), Timestamp(at)).unwrap();
    }

    let mut feed = FeedSubscriber::new();
    feed.activate(&collection, WindowConfig::default());
    feed.poll();

    assert_eq!(texts(&feed), vec!["t10", "t9", "t8"]);
}

#[test]
fn test_window_shorter_than_limit() {
    let collection = PostCollection::new();
    collection.insert(draft("alice", "only")).unwrap();

    let mut feed = FeedSubscriber::new();
    feed.activate(&collection, WindowConfig::default());
    feed.poll();

    assert_eq!(texts(&feed), vec!["only"]);
}

#[test]
fn test_out_of_order_ingest_still_sorted() {
    let collection = PostCollection::new();
    for (text, at) in [("mid", 5), ("new", 9), ("old", 1)] {
        collection.insert_at(draft("alice", text), Timestamp(at)).unwrap();
    }

    let mut feed = FeedSubscriber::new();
    feed.activate(&collection, WindowConfig::default());
    feed.poll();

    assert_eq!(texts(&feed), vec!["new", "mid", "old"]);
}

// --- Replacement snapshots ---

#[test]
fn test_new_snapshot_replaces_previous_sequence() {
    let collection = PostCollection::new();
    for (text, at) in [("a", 1), ("b", 2), ("c", 3)] {
        collection.insert_at(draft("alice", text), Timestamp(at)).unwrap();
    }

    let mut feed = FeedSubscriber::new();
    feed.activate(&collection, WindowConfig::default());
    feed.poll();
    assert_eq!(texts(&feed), vec!["c", "b", "a"]);

    // A newer post pushes the oldest out of the window entirely.
    collection.insert_at(draft("alice", "d"), Timestamp(4)).unwrap();
    feed.poll();
    assert_eq!(texts(&feed), vec!["d", "c", "b"]);
}

#[test]
fn test_queued_snapshots_last_wins() {
    let collection = PostCollection::new();
    let mut feed = FeedSubscriber::new();
    feed.activate(&collection, WindowConfig::default());

    // Three changes queue three snapshots before a single poll.
    for (text, at) in [("a", 1), ("b", 2), ("c", 3)] {
        collection.insert_at(draft("alice", text), Timestamp(at)).unwrap();
    }
    feed.poll();

    assert_eq!(texts(&feed), vec!["c", "b", "a"]);
}

#[test]
fn test_delete_reflected_in_next_snapshot() {
    let collection = PostCollection::new();
    let victim = collection.insert_at(draft("alice", "victim"), Timestamp(2)).unwrap();
    collection.insert_at(draft("alice", "keeper"), Timestamp(1)).unwrap();

    let mut feed = FeedSubscriber::new();
    feed.activate(&collection, WindowConfig::default());
    feed.poll();
    assert_eq!(texts(&feed), vec!["victim", "keeper"]);

    collection.delete(&victim.id).unwrap();
    feed.poll();
    assert_eq!(texts(&feed), vec!["keeper"]);
}

// --- Teardown safety ---

#[test]
fn test_no_mutation_after_teardown() {
    let collection = PostCollection::new();
    collection.insert_at(draft("alice", "before"), Timestamp(1)).unwrap();

    let mut feed = FeedSubscriber::new();
    feed.activate(&collection, WindowConfig::default());
    feed.poll();
    let held = texts(&feed);

    // Snapshot already in flight when teardown runs.
    collection.insert_at(draft("alice", "after"), Timestamp(2)).unwrap();
    feed.teardown();
    feed.poll();

    assert_eq!(texts(&feed), held);
}

#[test]
fn test_teardown_before_establishment_resolves() {
    let collection = PostCollection::new();

    // The subscribe call resolved, but the component was torn down first.
    let handle = collection.watch_recent(WindowConfig::default()).unwrap();
    let mut feed = FeedSubscriber::new();
    feed.teardown();
    feed.attach(handle);

    assert_eq!(collection.subscriber_count(), 0);
    collection.insert(draft("alice", "late")).unwrap();
    feed.poll();
    assert!(feed.posts().is_empty());
}

// --- Establishment failure ---

#[test]
fn test_failed_subscribe_means_empty_feed_forever() {
    let collection = PostCollection::new();
    collection.insert(draft("alice", "hidden")).unwrap();
    collection.close();

    let mut feed = FeedSubscriber::new();
    feed.activate(&collection, WindowConfig::default());
    feed.poll();
    feed.poll();

    assert!(feed.posts().is_empty());
    assert!(!feed.is_active());
}

// --- Property: the delivered window is the sorted top of the collection ---

proptest! {
    #[test]
    fn prop_window_is_sorted_prefix(stamps in prop::collection::vec(0i64..1000, 0..20)) {
        let collection = PostCollection::new();
        let mut inserted = Vec::new();
        for (i, at) in stamps.iter().enumerate() {
            let post = collection
                .insert_at(draft("alice", &format!("p{i}")), Timestamp(*at))
                .unwrap();
            inserted.push(post);
        }

        let mut feed = FeedSubscriber::new();
        feed.activate(&collection, WindowConfig::default());
        feed.poll();

        // Expected: every post ordered by created_at desc (id desc on ties),
        // truncated to the window limit.
        inserted.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
        });
        inserted.truncate(3);

        prop_assert_eq!(feed.posts(), inserted.as_slice());
        prop_assert!(feed.posts().len() <= 3);
        for pair in feed.posts().windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}
