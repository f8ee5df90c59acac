//! Notification domain model.
//!
//! # Responsibility
//! - Define the stored/serialized notification record.
//! - Model per-type metadata as one sum type sharing a single row shape.
//!
//! # Invariants
//! - `metadata` variant is always the one selected by `kind`.
//! - `thread_id` is derived from `kind` + metadata; `validate` rejects any other value.
//! - `count` starts at 1 and only grows through store merges.

use crate::model::cohort::DojoCohort;
use crate::model::event::GameHeaders;
use crate::model::thread::{delimited_segment, derive_thread_id, ThreadKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Closed set of notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// A comment on one of the user's games.
    GameComment,
    /// A reviewer finished reviewing one of the user's games.
    GameReviewComplete,
    /// Someone started following the user.
    NewFollower,
    /// A comment on one of the user's timeline entries.
    TimelineComment,
    /// A reaction on one of the user's timeline entries.
    TimelineReaction,
    /// A game containing a followed position was added to the explorer.
    ExplorerGame,
    /// Someone asked to join a club the user owns.
    NewClubJoinRequest,
    /// The user's request to join a club was approved.
    ClubJoinRequestApproved,
}

impl NotificationType {
    pub const ALL: [NotificationType; 8] = [
        Self::GameComment,
        Self::GameReviewComplete,
        Self::NewFollower,
        Self::TimelineComment,
        Self::TimelineReaction,
        Self::ExplorerGame,
        Self::NewClubJoinRequest,
        Self::ClubJoinRequestApproved,
    ];

    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GameComment => "GAME_COMMENT",
            Self::GameReviewComplete => "GAME_REVIEW_COMPLETE",
            Self::NewFollower => "NEW_FOLLOWER",
            Self::TimelineComment => "TIMELINE_COMMENT",
            Self::TimelineReaction => "TIMELINE_REACTION",
            Self::ExplorerGame => "EXPLORER_GAME",
            Self::NewClubJoinRequest => "NEW_CLUB_JOIN_REQUEST",
            Self::ClubJoinRequestApproved => "CLUB_JOIN_REQUEST_APPROVED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Returns whether `metadata` is the variant this type carries.
    pub fn accepts(self, metadata: &NotificationMetadata) -> bool {
        matches!(
            (self, metadata),
            (Self::GameComment, NotificationMetadata::GameComment(_))
                | (Self::GameReviewComplete, NotificationMetadata::GameReview(_))
                | (Self::NewFollower, NotificationMetadata::NewFollower(_))
                | (
                    Self::TimelineComment | Self::TimelineReaction,
                    NotificationMetadata::TimelineComment(_)
                )
                | (Self::ExplorerGame, NotificationMetadata::ExplorerGame(_))
                | (
                    Self::NewClubJoinRequest | Self::ClubJoinRequestApproved,
                    NotificationMetadata::Club(_)
                )
        )
    }
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for a game comment notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCommentMetadata {
    pub cohort: DojoCohort,
    /// Sort key of the game.
    pub id: String,
    #[serde(default)]
    pub headers: GameHeaders,
}

/// Reviewer identity attached to a completed review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerInfo {
    pub username: String,
    pub display_name: String,
    pub cohort: DojoCohort,
}

/// Metadata for a completed game review: the game fields plus the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameReviewMetadata {
    #[serde(flatten)]
    pub game: GameCommentMetadata,
    pub reviewer: ReviewerInfo,
}

/// Metadata for a new follower notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFollowerMetadata {
    /// Username of the follower.
    pub username: String,
    pub display_name: String,
    pub cohort: DojoCohort,
}

/// Metadata for timeline comment and reaction notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineCommentMetadata {
    /// Owner of the timeline entry.
    pub owner: String,
    /// Id of the timeline entry.
    pub id: String,
    /// Requirement name of the timeline entry.
    pub name: String,
}

/// Metadata for an explorer game notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerGameMetadata {
    pub normalized_fen: String,
    pub cohort: DojoCohort,
    /// Id of the game.
    pub id: String,
    /// Result of the game relative to the position.
    pub result: String,
    #[serde(default)]
    pub headers: GameHeaders,
}

/// Metadata for club join request and approval notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubMetadata {
    pub id: String,
    pub name: String,
}

/// The one populated metadata object of a notification.
///
/// Flattened into the notification record, so only the active variant's key
/// (e.g. `gameCommentMetadata`) appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationMetadata {
    #[serde(rename = "gameCommentMetadata")]
    GameComment(GameCommentMetadata),
    #[serde(rename = "gameReviewMetadata")]
    GameReview(GameReviewMetadata),
    #[serde(rename = "newFollowerMetadata")]
    NewFollower(NewFollowerMetadata),
    #[serde(rename = "timelineCommentMetadata")]
    TimelineComment(TimelineCommentMetadata),
    #[serde(rename = "explorerGameMetadata")]
    ExplorerGame(ExplorerGameMetadata),
    #[serde(rename = "clubMetadata")]
    Club(ClubMetadata),
}

/// Aggregated notification record; one per `(username, thread_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Owner of the notification. Implicit from the caller on the wire.
    #[serde(skip)]
    pub username: String,
    #[serde(rename = "id")]
    pub thread_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub updated_at: DateTime<Utc>,
    /// Unacknowledged occurrences merged into this thread.
    pub count: u32,
    #[serde(flatten)]
    pub metadata: NotificationMetadata,
}

impl Notification {
    /// Builds a single-occurrence notification and derives its thread id.
    pub fn new(
        username: impl Into<String>,
        kind: NotificationType,
        metadata: NotificationMetadata,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let thread_id = derive_thread_id(kind, &metadata);
        Self {
            username: username.into(),
            thread_id,
            kind,
            updated_at,
            count: 1,
            metadata,
        }
    }

    /// Storage key of this notification's thread.
    pub fn key(&self) -> ThreadKey {
        ThreadKey::new(self.username.as_str(), self.thread_id.as_str())
    }

    /// Validates invariants that must hold before persistence.
    pub fn validate(&self) -> Result<(), NotificationValidationError> {
        if self.username.trim().is_empty() {
            return Err(NotificationValidationError::EmptyUsername);
        }
        if self.thread_id.trim().is_empty() {
            return Err(NotificationValidationError::EmptyThreadId);
        }
        if !self.kind.accepts(&self.metadata) {
            return Err(NotificationValidationError::MetadataMismatch(self.kind));
        }
        if let Some(segment) = delimited_segment(&self.metadata) {
            return Err(NotificationValidationError::DelimiterInKey(segment.to_string()));
        }
        let expected = derive_thread_id(self.kind, &self.metadata);
        if self.thread_id != expected {
            return Err(NotificationValidationError::ThreadIdMismatch { expected });
        }
        Ok(())
    }
}

/// Invariant violation on a notification value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationValidationError {
    EmptyUsername,
    EmptyThreadId,
    MetadataMismatch(NotificationType),
    /// An identifying metadata field contains the thread id delimiter.
    DelimiterInKey(String),
    /// `thread_id` is not the one derived from `kind` and metadata.
    ThreadIdMismatch { expected: String },
}

impl Display for NotificationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "notification username must not be empty"),
            Self::EmptyThreadId => write!(f, "notification thread id must not be empty"),
            Self::MetadataMismatch(kind) => {
                write!(f, "metadata variant does not match notification type {kind}")
            }
            Self::DelimiterInKey(segment) => {
                write!(f, "identifying field `{segment}` contains the thread id delimiter")
            }
            Self::ThreadIdMismatch { expected } => {
                write!(f, "thread id does not match derived thread id `{expected}`")
            }
        }
    }
}

impl Error for NotificationValidationError {}
