//! Preference gate over the user settings collaborator.
//!
//! # Responsibility
//! - Map each notification type to exactly one user preference flag.
//! - Answer "is this category suppressed for this user" for the factory.
//!
//! # Invariants
//! - Lookup failures suppress the notification (fail closed) and are logged,
//!   never propagated to the caller.
//! - No partial or override logic: one category, one flag.

use crate::model::notification::NotificationType;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::RwLock;

/// User-facing notification category. Each maps to one settings flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationCategory {
    GameComment,
    GameReview,
    NewFollower,
    NewsfeedComment,
    NewsfeedReaction,
    ExplorerGame,
    ClubJoinRequest,
    ClubJoinRequestApproved,
}

impl NotificationCategory {
    pub fn for_type(kind: NotificationType) -> Self {
        match kind {
            NotificationType::GameComment => Self::GameComment,
            NotificationType::GameReviewComplete => Self::GameReview,
            NotificationType::NewFollower => Self::NewFollower,
            NotificationType::TimelineComment => Self::NewsfeedComment,
            NotificationType::TimelineReaction => Self::NewsfeedReaction,
            NotificationType::ExplorerGame => Self::ExplorerGame,
            NotificationType::NewClubJoinRequest => Self::ClubJoinRequest,
            NotificationType::ClubJoinRequestApproved => Self::ClubJoinRequestApproved,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GameComment => "game_comment",
            Self::GameReview => "game_review",
            Self::NewFollower => "new_follower",
            Self::NewsfeedComment => "newsfeed_comment",
            Self::NewsfeedReaction => "newsfeed_reaction",
            Self::ExplorerGame => "explorer_game",
            Self::ClubJoinRequest => "club_join_request",
            Self::ClubJoinRequestApproved => "club_join_request_approved",
        }
    }
}

/// A user's site notification settings. Every category is enabled by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub disable_game_comment: bool,
    pub disable_game_review: bool,
    pub disable_new_follower: bool,
    pub disable_newsfeed_comment: bool,
    pub disable_newsfeed_reaction: bool,
    pub disable_explorer_game: bool,
    pub disable_club_join_request: bool,
    pub disable_club_join_request_approved: bool,
}

impl UserPreferences {
    /// Returns whether the user turned `category` off.
    pub fn is_disabled(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::GameComment => self.disable_game_comment,
            NotificationCategory::GameReview => self.disable_game_review,
            NotificationCategory::NewFollower => self.disable_new_follower,
            NotificationCategory::NewsfeedComment => self.disable_newsfeed_comment,
            NotificationCategory::NewsfeedReaction => self.disable_newsfeed_reaction,
            NotificationCategory::ExplorerGame => self.disable_explorer_game,
            NotificationCategory::ClubJoinRequest => self.disable_club_join_request,
            NotificationCategory::ClubJoinRequestApproved => {
                self.disable_club_join_request_approved
            }
        }
    }
}

/// Failure to read a user's preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceError {
    UserNotFound(String),
    Unavailable(String),
}

impl Display for PreferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(username) => write!(f, "user not found: {username}"),
            Self::Unavailable(message) => write!(f, "preference store unavailable: {message}"),
        }
    }
}

impl Error for PreferenceError {}

/// Read-only access to user notification settings.
pub trait PreferenceSource {
    fn user_preferences(&self, username: &str) -> Result<UserPreferences, PreferenceError>;
}

impl<T: PreferenceSource + ?Sized> PreferenceSource for &T {
    fn user_preferences(&self, username: &str) -> Result<UserPreferences, PreferenceError> {
        (**self).user_preferences(username)
    }
}

/// Suppression check used by the notification factory.
pub struct PreferenceGate<P: PreferenceSource> {
    source: P,
}

impl<P: PreferenceSource> PreferenceGate<P> {
    pub fn new(source: P) -> Self {
        Self { source }
    }

    /// Returns whether notifications of `category` must not be generated for
    /// `username`.
    ///
    /// # Policy
    /// - Fail closed: any lookup error counts as suppressed.
    /// - The error is logged here and never returned.
    pub fn is_suppressed(&self, username: &str, category: NotificationCategory) -> bool {
        match self.source.user_preferences(username) {
            Ok(preferences) => preferences.is_disabled(category),
            Err(err) => {
                warn!(
                    "event=preference_lookup module=preference status=error policy=fail_closed category={} error={}",
                    category.as_str(),
                    err
                );
                true
            }
        }
    }
}

/// Process-local preference source keyed by username.
///
/// Suitable for embedding and tests; users without an entry are reported as
/// [`PreferenceError::UserNotFound`].
#[derive(Debug, Default)]
pub struct InMemoryPreferenceSource {
    users: RwLock<HashMap<String, UserPreferences>>,
}

impl InMemoryPreferenceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the settings of one user.
    pub fn set(
        &self,
        username: impl Into<String>,
        preferences: UserPreferences,
    ) -> Result<(), PreferenceError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| PreferenceError::Unavailable("preference lock poisoned".to_string()))?;
        users.insert(username.into(), preferences);
        Ok(())
    }
}

impl PreferenceSource for InMemoryPreferenceSource {
    fn user_preferences(&self, username: &str) -> Result<UserPreferences, PreferenceError> {
        let users = self
            .users
            .read()
            .map_err(|_| PreferenceError::Unavailable("preference lock poisoned".to_string()))?;
        users
            .get(username)
            .cloned()
            .ok_or_else(|| PreferenceError::UserNotFound(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InMemoryPreferenceSource, NotificationCategory, PreferenceError, PreferenceGate,
        PreferenceSource, UserPreferences,
    };
    use crate::model::notification::NotificationType;

    struct FailingSource;

    impl PreferenceSource for FailingSource {
        fn user_preferences(&self, _username: &str) -> Result<UserPreferences, PreferenceError> {
            Err(PreferenceError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn every_type_maps_to_a_distinct_category() {
        let mut seen = std::collections::HashSet::new();
        for kind in NotificationType::ALL {
            assert!(seen.insert(NotificationCategory::for_type(kind)));
        }
    }

    #[test]
    fn disabled_flag_suppresses_only_its_category() {
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
        let gate = PreferenceGate::new(&source);

        assert!(gate.is_suppressed("alice", NotificationCategory::GameComment));
        assert!(!gate.is_suppressed("alice", NotificationCategory::GameReview));
        assert!(!gate.is_suppressed("alice", NotificationCategory::NewFollower));
    }

    #[test]
    fn missing_user_fails_closed() {
        let source = InMemoryPreferenceSource::new();
        let gate = PreferenceGate::new(&source);
        assert!(gate.is_suppressed("ghost", NotificationCategory::NewFollower));
    }

    #[test]
    fn lookup_error_fails_closed() {
        let gate = PreferenceGate::new(FailingSource);
        assert!(gate.is_suppressed("alice", NotificationCategory::GameComment));
    }

    #[test]
    fn settings_deserialize_with_missing_flags_enabled() {
        let preferences: UserPreferences =
            serde_json::from_str(r#"{"disableNewFollower":true}"#).unwrap();
        assert!(preferences.is_disabled(NotificationCategory::NewFollower));
        assert!(!preferences.is_disabled(NotificationCategory::ExplorerGame));
    }
}
