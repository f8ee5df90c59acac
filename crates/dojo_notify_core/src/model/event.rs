//! Read-only event values supplied by upstream domains.
//!
//! These are the shapes the factory reads from; games, timeline entries,
//! follower relations and clubs are owned and validated elsewhere.

use crate::model::cohort::DojoCohort;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// PGN header tags (`White`, `Black`, `Date`, ...).
pub type GameHeaders = BTreeMap<String, String>;

/// A game stored in the dojo database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub cohort: DojoCohort,
    /// Sort key of the game within its cohort.
    pub id: String,
    /// Username of the player who uploaded the game.
    pub owner: String,
    #[serde(default)]
    pub headers: GameHeaders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<GameReview>,
}

/// Review state of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameReview {
    /// Absent until a reviewer picks the game up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<Reviewer>,
}

/// A user who reviewed a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    pub username: String,
    pub display_name: String,
    pub cohort: DojoCohort,
}

/// A follow relation: `follower` started following `poster`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerEntry {
    /// The user being followed.
    pub poster: String,
    pub follower: String,
    pub follower_display_name: String,
    pub follower_cohort: DojoCohort,
}

/// A newsfeed/timeline entry that can receive comments and reactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub owner: String,
    pub id: String,
    pub requirement_name: String,
}

/// Result of an explorer game relative to a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorerResult {
    White,
    Black,
    Draws,
    /// The position only appears in a variation, not the mainline.
    Analysis,
}

impl ExplorerResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
            Self::Draws => "draws",
            Self::Analysis => "analysis",
        }
    }
}

/// A game indexed under an explorer position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerGame {
    pub normalized_fen: String,
    pub result: ExplorerResult,
    pub game: Game,
}

/// A user following an explorer position, with their notification filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerPositionFollower {
    pub normalized_fen: String,
    pub username: String,
    /// Inclusive lower bound; unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cohort: Option<DojoCohort>,
    /// Inclusive upper bound; unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cohort: Option<DojoCohort>,
    #[serde(default)]
    pub disable_variations: bool,
}

impl ExplorerPositionFollower {
    /// Returns whether a game in `cohort` with `result` passes this
    /// follower's filters.
    ///
    /// A cohort outside the ladder never satisfies a bounded range.
    pub fn accepts(&self, cohort: &DojoCohort, result: ExplorerResult) -> bool {
        if self.disable_variations && result == ExplorerResult::Analysis {
            return false;
        }

        if self.min_cohort.is_none() && self.max_cohort.is_none() {
            return true;
        }

        let Some(ordinal) = cohort.ordinal() else {
            return false;
        };
        let above_min = match &self.min_cohort {
            Some(min) => min.ordinal().is_some_and(|min| ordinal >= min),
            None => true,
        };
        let below_max = match &self.max_cohort {
            Some(max) => max.ordinal().is_some_and(|max| ordinal <= max),
            None => true,
        };
        above_min && below_max
    }
}

/// A club that users can request to join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: String,
    pub name: String,
    pub owner: String,
}
