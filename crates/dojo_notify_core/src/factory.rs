//! Notification factory.
//!
//! # Responsibility
//! - Turn one domain event into zero or one notification value.
//! - Consult the preference gate for the recipient before building.
//!
//! # Invariants
//! - Missing upstream context yields `None`, never an error.
//! - The factory never writes to storage; its only read is the preference
//!   gate.
//! - Built notifications carry a single occurrence (`count == 1`); merging
//!   into existing threads is the store's job.

use crate::model::event::{
    Club, ExplorerGame, ExplorerPositionFollower, FollowerEntry, Game, TimelineEntry,
};
use crate::model::notification::{
    ClubMetadata, ExplorerGameMetadata, GameCommentMetadata, GameReviewMetadata,
    NewFollowerMetadata, Notification, NotificationMetadata, NotificationType, ReviewerInfo,
    TimelineCommentMetadata,
};
use crate::preference::{NotificationCategory, PreferenceGate, PreferenceSource};
use chrono::{DateTime, Utc};
use log::debug;

/// Source of event timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Builds notifications for domain events.
pub struct NotificationFactory<P: PreferenceSource, C: Clock = SystemClock> {
    gate: PreferenceGate<P>,
    clock: C,
}

impl<P: PreferenceSource> NotificationFactory<P, SystemClock> {
    /// Creates a factory stamping notifications with the wall clock.
    pub fn new(preferences: P) -> Self {
        Self::with_clock(preferences, SystemClock)
    }
}

impl<P: PreferenceSource, C: Clock> NotificationFactory<P, C> {
    pub fn with_clock(preferences: P, clock: C) -> Self {
        Self {
            gate: PreferenceGate::new(preferences),
            clock,
        }
    }

    /// Notifies the game owner about a new comment on the game.
    pub fn game_comment(&self, game: Option<&Game>) -> Option<Notification> {
        let game = game?;
        self.build(
            &game.owner,
            NotificationType::GameComment,
            NotificationMetadata::GameComment(game_comment_metadata(game)),
        )
    }

    /// Notifies the game owner that a reviewer finished reviewing the game.
    ///
    /// Returns `None` while the review has no reviewer.
    pub fn game_review_complete(&self, game: Option<&Game>) -> Option<Notification> {
        let game = game?;
        let reviewer = game.review.as_ref()?.reviewer.as_ref()?;
        self.build(
            &game.owner,
            NotificationType::GameReviewComplete,
            NotificationMetadata::GameReview(GameReviewMetadata {
                game: game_comment_metadata(game),
                reviewer: ReviewerInfo {
                    username: reviewer.username.clone(),
                    display_name: reviewer.display_name.clone(),
                    cohort: reviewer.cohort.clone(),
                },
            }),
        )
    }

    /// Notifies the followed user about a new follower.
    pub fn new_follower(&self, entry: Option<&FollowerEntry>) -> Option<Notification> {
        let entry = entry?;
        if entry.follower.is_empty() || entry.follower == entry.poster {
            return None;
        }
        self.build(
            &entry.poster,
            NotificationType::NewFollower,
            NotificationMetadata::NewFollower(NewFollowerMetadata {
                username: entry.follower.clone(),
                display_name: entry.follower_display_name.clone(),
                cohort: entry.follower_cohort.clone(),
            }),
        )
    }

    /// Notifies the entry owner about a new comment on a timeline entry.
    pub fn timeline_comment(&self, entry: Option<&TimelineEntry>) -> Option<Notification> {
        self.timeline(entry?, NotificationType::TimelineComment)
    }

    /// Notifies the entry owner about a new reaction on a timeline entry.
    pub fn timeline_reaction(&self, entry: Option<&TimelineEntry>) -> Option<Notification> {
        self.timeline(entry?, NotificationType::TimelineReaction)
    }

    /// Notifies a position follower that a game containing the position was
    /// added to the explorer.
    ///
    /// Returns `None` when the follower follows another position, owns the
    /// game, or filtered the game out by cohort range or variation setting.
    pub fn explorer_game(
        &self,
        explorer_game: Option<&ExplorerGame>,
        follower: &ExplorerPositionFollower,
    ) -> Option<Notification> {
        let explorer_game = explorer_game?;
        let game = &explorer_game.game;
        if follower.normalized_fen != explorer_game.normalized_fen
            || follower.username == game.owner
            || !follower.accepts(&game.cohort, explorer_game.result)
        {
            return None;
        }
        self.build(
            &follower.username,
            NotificationType::ExplorerGame,
            NotificationMetadata::ExplorerGame(ExplorerGameMetadata {
                normalized_fen: explorer_game.normalized_fen.clone(),
                cohort: game.cohort.clone(),
                id: game.id.clone(),
                result: explorer_game.result.as_str().to_string(),
                headers: game.headers.clone(),
            }),
        )
    }

    /// Notifies the club owner about a new join request.
    pub fn new_club_join_request(&self, club: Option<&Club>) -> Option<Notification> {
        let club = club?;
        self.build(
            &club.owner,
            NotificationType::NewClubJoinRequest,
            NotificationMetadata::Club(club_metadata(club)),
        )
    }

    /// Notifies `username` that their request to join the club was approved.
    pub fn club_join_request_approved(
        &self,
        club: Option<&Club>,
        username: &str,
    ) -> Option<Notification> {
        let club = club?;
        self.build(
            username,
            NotificationType::ClubJoinRequestApproved,
            NotificationMetadata::Club(club_metadata(club)),
        )
    }

    fn timeline(&self, entry: &TimelineEntry, kind: NotificationType) -> Option<Notification> {
        self.build(
            &entry.owner,
            kind,
            NotificationMetadata::TimelineComment(TimelineCommentMetadata {
                owner: entry.owner.clone(),
                id: entry.id.clone(),
                name: entry.requirement_name.clone(),
            }),
        )
    }

    fn build(
        &self,
        recipient: &str,
        kind: NotificationType,
        metadata: NotificationMetadata,
    ) -> Option<Notification> {
        if recipient.trim().is_empty() {
            debug!(
                "event=notification_build module=factory status=skipped reason=no_recipient type={}",
                kind
            );
            return None;
        }

        if self
            .gate
            .is_suppressed(recipient, NotificationCategory::for_type(kind))
        {
            debug!(
                "event=notification_build module=factory status=skipped reason=suppressed type={}",
                kind
            );
            return None;
        }

        Some(Notification::new(
            recipient,
            kind,
            metadata,
            self.clock.now(),
        ))
    }
}

fn game_comment_metadata(game: &Game) -> GameCommentMetadata {
    GameCommentMetadata {
        cohort: game.cohort.clone(),
        id: game.id.clone(),
        headers: game.headers.clone(),
    }
}

fn club_metadata(club: &Club) -> ClubMetadata {
    ClubMetadata {
        id: club.id.clone(),
        name: club.name.clone(),
    }
}
