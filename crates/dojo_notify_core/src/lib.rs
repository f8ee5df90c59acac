//! Notification generation and aggregated delivery for the dojo platform.
//!
//! Domain events flow through [`NotificationFactory`] (gated by user
//! preferences) into [`NotificationService`], which merges each notification
//! into its per-user thread so repeated events grow a count instead of
//! adding rows.

pub mod config;
pub mod db;
pub mod factory;
pub mod logging;
pub mod model;
pub mod preference;
pub mod repo;
pub mod service;

pub use config::StoreConfig;
pub use factory::{Clock, FixedClock, NotificationFactory, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cohort::{DojoCohort, NO_COHORT};
pub use model::event::{
    Club, ExplorerGame, ExplorerPositionFollower, ExplorerResult, FollowerEntry, Game,
    GameHeaders, GameReview, Reviewer, TimelineEntry,
};
pub use model::notification::{
    ClubMetadata, ExplorerGameMetadata, GameCommentMetadata, GameReviewMetadata,
    NewFollowerMetadata, Notification, NotificationMetadata, NotificationType,
    NotificationValidationError, ReviewerInfo, TimelineCommentMetadata,
};
pub use model::thread::{derive_thread_id, ThreadKey, THREAD_ID_DELIMITER};
pub use preference::{
    InMemoryPreferenceSource, NotificationCategory, PreferenceError, PreferenceGate,
    PreferenceSource, UserPreferences,
};
pub use repo::notification_repo::{
    NotificationPage, NotificationRepository, RepoError, RepoResult,
    SqliteNotificationRepository,
};
pub use service::error::{ServiceError, ServiceErrorKind};
pub use service::notification_service::{DeliveryOutcome, NotificationService};
pub use service::notification_text::{notification_description, notification_title};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
