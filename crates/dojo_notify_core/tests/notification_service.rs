use dojo_notify_core::db::open_db_in_memory;
use dojo_notify_core::{
    DeliveryOutcome, DojoCohort, FollowerEntry, Game, InMemoryPreferenceSource, Notification,
    NotificationFactory, NotificationMetadata, NotificationPage, NotificationRepository,
    NotificationService, NotificationType, RepoError, RepoResult, ServiceErrorKind,
    SqliteNotificationRepository, UserPreferences,
};
use std::cell::RefCell;

/// Repository double that records calls and can be told to fail.
#[derive(Default)]
struct RecordingRepository {
    calls: RefCell<Vec<&'static str>>,
    fail: bool,
}

impl RecordingRepository {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn record(&self, call: &'static str) -> RepoResult<()> {
        self.calls.borrow_mut().push(call);
        if self.fail {
            return Err(RepoError::Db(
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
                    Some("disk I/O error".to_string()),
                )
                .into(),
            ));
        }
        Ok(())
    }
}

impl NotificationRepository for &RecordingRepository {
    fn upsert_notification(&self, _notification: &Notification) -> RepoResult<u32> {
        self.record("upsert").map(|()| 1)
    }

    fn get_notification(
        &self,
        _username: &str,
        _thread_id: &str,
    ) -> RepoResult<Option<Notification>> {
        self.record("get").map(|()| None)
    }

    fn list_notifications(
        &self,
        _username: &str,
        _page_token: Option<&str>,
    ) -> RepoResult<NotificationPage> {
        self.record("list").map(|()| NotificationPage {
            items: Vec::new(),
            next_page_token: None,
        })
    }

    fn delete_notification(&self, _username: &str, _thread_id: &str) -> RepoResult<()> {
        self.record("delete")
    }
}

fn alice_game() -> Game {
    Game {
        cohort: DojoCohort::from("1200-1300"),
        id: "g1".to_string(),
        owner: "alice".to_string(),
        headers: Default::default(),
        review: None,
    }
}

#[test]
fn suppressed_notification_never_reaches_the_store() {
    let source = InMemoryPreferenceSource::new();
    source
        .set(
            "alice",
            UserPreferences {
                disable_game_comment: true,
                ..UserPreferences::default()
            },
        )
        .unwrap();
    let factory = NotificationFactory::new(&source);
    let repo = RecordingRepository::default();
    let service = NotificationService::new(&repo);

    let outcome = service.deliver(factory.game_comment(Some(&alice_game())));

    assert_eq!(outcome, DeliveryOutcome::Skipped);
    assert!(repo.calls.borrow().is_empty());
}

#[test]
fn deliver_swallows_store_failures() {
    let source = InMemoryPreferenceSource::new();
    source.set("alice", UserPreferences::default()).unwrap();
    let factory = NotificationFactory::new(&source);
    let repo = RecordingRepository::failing();
    let service = NotificationService::new(&repo);

    let outcome = service.deliver(factory.game_comment(Some(&alice_game())));

    assert_eq!(outcome, DeliveryOutcome::Failed);
    assert_eq!(*repo.calls.borrow(), vec!["upsert"]);
}

#[test]
fn storage_failures_surface_as_temporary_server_errors() {
    let repo = RecordingRepository::failing();
    let service = NotificationService::new(&repo);

    let err = service.delete_notification("alice", "NEW_FOLLOWER|bob").unwrap_err();
    assert_eq!(err.kind(), ServiceErrorKind::TemporaryServerError);
    assert_eq!(err.status(), 500);
    assert_eq!(err.public_message(), "Temporary server error");

    let err = service.list_notifications("alice", None).unwrap_err();
    assert_eq!(err.kind(), ServiceErrorKind::TemporaryServerError);
}

#[test]
fn malformed_page_token_is_an_invalid_request() {
    let conn = open_db_in_memory().unwrap();
    let service = NotificationService::new(SqliteNotificationRepository::try_new(&conn).unwrap());

    let err = service
        .list_notifications("alice", Some("!!not-base64!!"))
        .unwrap_err();
    assert_eq!(err.kind(), ServiceErrorKind::InvalidRequest);
    assert_eq!(err.status(), 400);
}

#[test]
fn game_comment_scenario_counts_until_alice_opts_out() {
    let conn = open_db_in_memory().unwrap();
    let service = NotificationService::new(SqliteNotificationRepository::try_new(&conn).unwrap());
    let source = InMemoryPreferenceSource::new();
    source.set("alice", UserPreferences::default()).unwrap();
    let factory = NotificationFactory::new(&source);
    let game = alice_game();

    for expected in 1..=3 {
        assert_eq!(
            service.deliver(factory.game_comment(Some(&game))),
            DeliveryOutcome::Stored { count: expected }
        );
    }

    source
        .set(
            "alice",
            UserPreferences {
                disable_game_comment: true,
                ..UserPreferences::default()
            },
        )
        .unwrap();
    assert_eq!(
        service.deliver(factory.game_comment(Some(&game))),
        DeliveryOutcome::Skipped
    );

    let page = service.list_notifications("alice", None).unwrap();
    assert_eq!(page.items.len(), 1);
    let row = &page.items[0];
    assert_eq!(row.username, "alice");
    assert_eq!(row.kind, NotificationType::GameComment);
    assert_eq!(row.thread_id, "GAME_COMMENT|1200-1300|g1");
    assert_eq!(row.count, 3);
}

#[test]
fn refollow_scenario_merges_into_one_row_with_latest_name() {
    let conn = open_db_in_memory().unwrap();
    let service = NotificationService::new(SqliteNotificationRepository::try_new(&conn).unwrap());
    let source = InMemoryPreferenceSource::new();
    source.set("alice", UserPreferences::default()).unwrap();
    let factory = NotificationFactory::new(&source);

    let first = FollowerEntry {
        poster: "alice".to_string(),
        follower: "bob".to_string(),
        follower_display_name: "Bob".to_string(),
        follower_cohort: DojoCohort::from("800-900"),
    };
    let refollow = FollowerEntry {
        follower_display_name: "Bobby Fischer".to_string(),
        ..first.clone()
    };

    service
        .put_notification(&factory.new_follower(Some(&first)).unwrap())
        .unwrap();
    service
        .put_notification(&factory.new_follower(Some(&refollow)).unwrap())
        .unwrap();

    let page = service.list_notifications("alice", None).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].count, 2);
    match &page.items[0].metadata {
        NotificationMetadata::NewFollower(metadata) => {
            assert_eq!(metadata.display_name, "Bobby Fischer");
        }
        other => panic!("unexpected metadata: {other:?}"),
    }
}

#[test]
fn dismissed_notification_disappears_and_redelete_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let service = NotificationService::new(SqliteNotificationRepository::try_new(&conn).unwrap());
    let source = InMemoryPreferenceSource::new();
    source.set("alice", UserPreferences::default()).unwrap();
    let factory = NotificationFactory::new(&source);

    let notification = factory.game_comment(Some(&alice_game())).unwrap();
    service.put_notification(&notification).unwrap();

    service
        .delete_notification("alice", &notification.thread_id)
        .unwrap();
    service
        .delete_notification("alice", &notification.thread_id)
        .unwrap();

    assert!(service
        .list_notifications("alice", None)
        .unwrap()
        .items
        .is_empty());
}
