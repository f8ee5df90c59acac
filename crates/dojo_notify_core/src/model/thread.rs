//! Thread identity derivation.
//!
//! A thread is the aggregation bucket of a user's notifications: every event
//! that derives the same `(username, thread_id)` folds into one stored row.
//! The id is the notification type followed by the type's identifying
//! fields, joined with [`THREAD_ID_DELIMITER`]:
//!
//! | Type | Thread id |
//! |---|---|
//! | `GAME_COMMENT`, `GAME_REVIEW_COMPLETE` | `type\|cohort\|gameId` |
//! | `NEW_FOLLOWER` | `type\|followerUsername` |
//! | `TIMELINE_COMMENT`, `TIMELINE_REACTION` | `type\|entryOwner\|entryId` |
//! | `EXPLORER_GAME` | `type\|normalizedFen\|cohort\|gameId` |
//! | `NEW_CLUB_JOIN_REQUEST`, `CLUB_JOIN_REQUEST_APPROVED` | `type\|clubId` |
//!
//! The type prefix keeps kinds that share a metadata shape (comments vs
//! reactions on one entry) in separate threads.

use crate::model::notification::{NotificationMetadata, NotificationType};

/// Separator between thread id segments. Identifying fields containing it
/// fail [`Notification::validate`](crate::Notification::validate).
pub const THREAD_ID_DELIMITER: char = '|';

/// Storage key of one notification row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadKey {
    pub username: String,
    pub thread_id: String,
}

impl ThreadKey {
    pub fn new(username: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            thread_id: thread_id.into(),
        }
    }
}

/// Derives the thread id for a notification of `kind` carrying `metadata`.
pub fn derive_thread_id(kind: NotificationType, metadata: &NotificationMetadata) -> String {
    let mut thread_id = String::from(kind.as_str());
    for segment in identity_segments(metadata) {
        thread_id.push(THREAD_ID_DELIMITER);
        thread_id.push_str(segment);
    }
    thread_id
}

/// Returns the first identifying field of `metadata` that contains
/// [`THREAD_ID_DELIMITER`]. Such a field would make the thread id ambiguous.
pub fn delimited_segment(metadata: &NotificationMetadata) -> Option<&str> {
    identity_segments(metadata)
        .into_iter()
        .find(|segment| segment.contains(THREAD_ID_DELIMITER))
}

fn identity_segments(metadata: &NotificationMetadata) -> Vec<&str> {
    match metadata {
        NotificationMetadata::GameComment(game) => vec![game.cohort.as_str(), game.id.as_str()],
        NotificationMetadata::GameReview(review) => {
            vec![review.game.cohort.as_str(), review.game.id.as_str()]
        }
        NotificationMetadata::NewFollower(follower) => vec![follower.username.as_str()],
        NotificationMetadata::TimelineComment(entry) => {
            vec![entry.owner.as_str(), entry.id.as_str()]
        }
        NotificationMetadata::ExplorerGame(game) => vec![
            game.normalized_fen.as_str(),
            game.cohort.as_str(),
            game.id.as_str(),
        ],
        NotificationMetadata::Club(club) => vec![club.id.as_str()],
    }
}
