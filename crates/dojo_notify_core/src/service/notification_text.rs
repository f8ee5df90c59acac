//! Display text for notifications.
//!
//! Titles and descriptions shown in the notification list. Descriptions of
//! aggregated kinds pluralize on the thread's `count`.

use crate::model::event::GameHeaders;
use crate::model::notification::{Notification, NotificationMetadata, NotificationType};

const UNKNOWN_PLAYER: &str = "?";

/// Returns the list title for `notification`.
pub fn notification_title(notification: &Notification) -> String {
    match &notification.metadata {
        NotificationMetadata::GameComment(game) => players(&game.headers),
        NotificationMetadata::GameReview(review) => players(&review.game.headers),
        NotificationMetadata::ExplorerGame(game) => players(&game.headers),
        NotificationMetadata::NewFollower(_) => "You have a new follower".to_string(),
        NotificationMetadata::TimelineComment(entry) => entry.name.clone(),
        NotificationMetadata::Club(club) => club.name.clone(),
    }
}

/// Returns the list description for `notification`.
pub fn notification_description(notification: &Notification) -> String {
    let count = notification.count.max(1);
    match (&notification.kind, &notification.metadata) {
        (NotificationType::GameReviewComplete, NotificationMetadata::GameReview(review)) => {
            format!(
                "{} reviewed your game. Check the game settings for more info.",
                review.reviewer.display_name
            )
        }
        (NotificationType::NewFollower, NotificationMetadata::NewFollower(follower)) => {
            follower.display_name.clone()
        }
        (NotificationType::GameComment, _) => "There are new comments on your game.".to_string(),
        (NotificationType::TimelineComment, _) => pluralized(count, "comment", "on your activity"),
        (NotificationType::TimelineReaction, _) => {
            pluralized(count, "reaction", "on your activity")
        }
        (NotificationType::ExplorerGame, _) => {
            "A new game was added containing a position you follow.".to_string()
        }
        (NotificationType::NewClubJoinRequest, _) => {
            pluralized(count, "request", "to join your club")
        }
        (NotificationType::ClubJoinRequestApproved, _) => {
            "Your request to join the club was approved.".to_string()
        }
        // Metadata mismatches are rejected by validation before storage.
        (NotificationType::GameReviewComplete | NotificationType::NewFollower, _) => String::new(),
    }
}

fn players(headers: &GameHeaders) -> String {
    let white = headers.get("White").map_or(UNKNOWN_PLAYER, String::as_str);
    let black = headers.get("Black").map_or(UNKNOWN_PLAYER, String::as_str);
    format!("{white} - {black}")
}

fn pluralized(count: u32, noun: &str, suffix: &str) -> String {
    if count == 1 {
        format!("There is a new {noun} {suffix}.")
    } else {
        format!("There are {count} new {noun}s {suffix}.")
    }
}

#[cfg(test)]
mod tests {
    use super::{notification_description, notification_title};
    use crate::model::cohort::DojoCohort;
    use crate::model::notification::{
        ClubMetadata, GameCommentMetadata, NewFollowerMetadata, Notification,
        NotificationMetadata, NotificationType, TimelineCommentMetadata,
    };
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn timeline(kind: NotificationType, count: u32) -> Notification {
        let mut notification = Notification::new(
            "alice",
            kind,
            NotificationMetadata::TimelineComment(TimelineCommentMetadata {
                owner: "alice".to_string(),
                id: "entry-1".to_string(),
                name: "Play 10 classical games".to_string(),
            }),
            Utc::now(),
        );
        notification.count = count;
        notification
    }

    #[test]
    fn game_title_uses_players_from_headers() {
        let mut headers = BTreeMap::new();
        headers.insert("White".to_string(), "Carlsen".to_string());
        let notification = Notification::new(
            "alice",
            NotificationType::GameComment,
            NotificationMetadata::GameComment(GameCommentMetadata {
                cohort: DojoCohort::from("2400+"),
                id: "g9".to_string(),
                headers,
            }),
            Utc::now(),
        );
        assert_eq!(notification_title(&notification), "Carlsen - ?");
        assert_eq!(
            notification_description(&notification),
            "There are new comments on your game."
        );
    }

    #[test]
    fn timeline_descriptions_pluralize_on_count() {
        let single = timeline(NotificationType::TimelineComment, 1);
        assert_eq!(
            notification_description(&single),
            "There is a new comment on your activity."
        );
        assert_eq!(notification_title(&single), "Play 10 classical games");

        let many = timeline(NotificationType::TimelineReaction, 4);
        assert_eq!(
            notification_description(&many),
            "There are 4 new reactions on your activity."
        );
    }

    #[test]
    fn follower_and_club_text() {
        let follower = Notification::new(
            "alice",
            NotificationType::NewFollower,
            NotificationMetadata::NewFollower(NewFollowerMetadata {
                username: "bob".to_string(),
                display_name: "Bob B.".to_string(),
                cohort: DojoCohort::from("1000-1100"),
            }),
            Utc::now(),
        );
        assert_eq!(notification_title(&follower), "You have a new follower");
        assert_eq!(notification_description(&follower), "Bob B.");

        let mut club = Notification::new(
            "alice",
            NotificationType::NewClubJoinRequest,
            NotificationMetadata::Club(ClubMetadata {
                id: "club-1".to_string(),
                name: "Knights".to_string(),
            }),
            Utc::now(),
        );
        club.count = 2;
        assert_eq!(notification_title(&club), "Knights");
        assert_eq!(
            notification_description(&club),
            "There are 2 new requests to join your club."
        );
    }
}
