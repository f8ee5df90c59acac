//! Independent writers, one connection each, merging into the same thread.

use chrono::{TimeZone, Utc};
use dojo_notify_core::db::open_db;
use dojo_notify_core::{
    DojoCohort, NewFollowerMetadata, Notification, NotificationMetadata, NotificationRepository,
    NotificationType, SqliteNotificationRepository,
};
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

const WRITERS: usize = 8;
const UPSERTS_PER_WRITER: usize = 25;

fn follow_event(writer: usize, round: usize) -> Notification {
    Notification::new(
        "alice",
        NotificationType::NewFollower,
        NotificationMetadata::NewFollower(NewFollowerMetadata {
            username: "bob".to_string(),
            display_name: format!("Bob {writer}-{round}"),
            cohort: DojoCohort::from(format!("writer-{writer}-round-{round}").as_str()),
        }),
        Utc.timestamp_opt(1_700_000_000 + (writer * 1000 + round) as i64, 0)
            .unwrap(),
    )
}

fn run_writers(path: &Path, prior: u32) {
    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = path.to_path_buf();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
                barrier.wait();
                for round in 0..UPSERTS_PER_WRITER {
                    repo.upsert_notification(&follow_event(writer, round)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let conn = open_db(path).unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let stored = repo
        .get_notification("alice", "NEW_FOLLOWER|bob")
        .unwrap()
        .unwrap();

    assert_eq!(
        stored.count,
        prior + (WRITERS * UPSERTS_PER_WRITER) as u32,
        "no increment may be lost"
    );

    // Last writer wins as a whole: name, cohort and timestamp all come from
    // the same contributing event.
    let NotificationMetadata::NewFollower(metadata) = &stored.metadata else {
        panic!("unexpected metadata: {:?}", stored.metadata);
    };
    let origin = (0..WRITERS)
        .flat_map(|writer| (0..UPSERTS_PER_WRITER).map(move |round| (writer, round)))
        .find(|(writer, round)| metadata.display_name == format!("Bob {writer}-{round}"))
        .expect("display name must come from one event");
    let event = follow_event(origin.0, origin.1);
    assert_eq!(stored.metadata, event.metadata);
    assert_eq!(stored.updated_at, event.updated_at);
}

#[test]
fn concurrent_upserts_never_lose_increments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.db");
    drop(open_db(&path).unwrap());

    run_writers(&path, 0);
}

#[test]
fn concurrent_upserts_add_to_an_existing_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("existing.db");
    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
        for _ in 0..5 {
            repo.upsert_notification(&follow_event(0, 0)).unwrap();
        }
    }

    run_writers(&path, 5);
}
