//! Notification repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Merge notifications into their `(username, thread_id)` row.
//! - List a user's notifications newest-thread-first with keyset paging.
//! - Delete dismissed notifications.
//!
//! # Invariants
//! - Upsert is one SQL statement: the insert branch writes `count = 1`, the
//!   conflict branch adds 1 inside the engine. No read-modify-write.
//! - On merge, `type`, `updated_at` and the active metadata column take the
//!   incoming values; other metadata columns are left untouched.
//! - List order is `thread_id DESC`; page tokens resume strictly after the
//!   last returned thread.
//! - Delete is idempotent.

use crate::config::StoreConfig;
use crate::db::migrations::latest_version;
use crate::db::{ensure_table, DbError};
use crate::model::notification::{
    Notification, NotificationMetadata, NotificationType, NotificationValidationError,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    username,
    thread_id,
    type,
    updated_at,
    count,
    game_comment_metadata,
    game_review_metadata,
    new_follower_metadata,
    timeline_comment_metadata,
    explorer_game_metadata,
    club_metadata
FROM notifications";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for notification persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(NotificationValidationError),
    Db(DbError),
    /// Metadata could not be encoded for storage.
    Serialization(serde_json::Error),
    /// Continuation token is not one this store issued for the user.
    InvalidPageToken(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted back into a notification.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to encode notification metadata: {err}"),
            Self::InvalidPageToken(message) => write!(f, "invalid page token: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "notification repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted notification data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidPageToken(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<NotificationValidationError> for RepoError {
    fn from(value: NotificationValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One page of a user's notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPage {
    /// Items in `thread_id DESC` order.
    pub items: Vec<Notification>,
    /// Opaque token for the next page; `None` once the listing is exhausted.
    pub next_page_token: Option<String>,
}

/// Repository interface for aggregated notifications.
pub trait NotificationRepository {
    /// Merges `notification` into its thread row and returns the stored count.
    fn upsert_notification(&self, notification: &Notification) -> RepoResult<u32>;
    /// Reads one thread row.
    fn get_notification(&self, username: &str, thread_id: &str)
        -> RepoResult<Option<Notification>>;
    /// Lists one page of the user's notifications.
    ///
    /// `page_token` of `None` or `""` starts from the first page.
    fn list_notifications(
        &self,
        username: &str,
        page_token: Option<&str>,
    ) -> RepoResult<NotificationPage>;
    /// Deletes one thread row. Missing rows are not an error.
    fn delete_notification(&self, username: &str, thread_id: &str) -> RepoResult<()>;
}

/// SQLite-backed notification repository.
pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
    config: StoreConfig,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    /// Constructs a repository from a migrated connection with default config.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_config(conn, StoreConfig::default())
    }

    pub fn with_config(conn: &'conn Connection, config: StoreConfig) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn, config })
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn upsert_notification(&self, notification: &Notification) -> RepoResult<u32> {
        notification.validate()?;

        let column = metadata_column(&notification.metadata);
        let metadata_json = encode_metadata(&notification.metadata)?;

        // `column` comes from a fixed match, never from input.
        let count: i64 = self.conn.query_row(
            &format!(
                "INSERT INTO notifications (
                    username,
                    thread_id,
                    type,
                    updated_at,
                    count,
                    {column}
                ) VALUES (?1, ?2, ?3, ?4, 1, ?5)
                ON CONFLICT (username, thread_id) DO UPDATE SET
                    type = excluded.type,
                    updated_at = excluded.updated_at,
                    {column} = excluded.{column},
                    count = notifications.count + 1
                RETURNING count;"
            ),
            params![
                notification.username.as_str(),
                notification.thread_id.as_str(),
                notification.kind.as_str(),
                format_timestamp(&notification.updated_at),
                metadata_json,
            ],
            |row| row.get(0),
        )?;

        parse_count(count)
    }

    fn get_notification(
        &self,
        username: &str,
        thread_id: &str,
    ) -> RepoResult<Option<Notification>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE username = ?1
               AND thread_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![username, thread_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_notification_row(row)?));
        }

        Ok(None)
    }

    fn list_notifications(
        &self,
        username: &str,
        page_token: Option<&str>,
    ) -> RepoResult<NotificationPage> {
        let start_after = match page_token.filter(|token| !token.is_empty()) {
            Some(token) => Some(decode_page_token(token, username)?),
            None => None,
        };

        let page_size = self.config.page_size() as usize;
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE username = ?1
               AND (?2 IS NULL OR thread_id < ?2)
             ORDER BY thread_id DESC
             LIMIT ?3;"
        ))?;

        // One extra row tells whether another page exists.
        let fetch_limit = i64::from(self.config.page_size()) + 1;
        let mut rows = stmt.query(params![username, start_after, fetch_limit])?;
        let mut items = Vec::new();
        let mut has_more = false;
        while let Some(row) = rows.next()? {
            if items.len() == page_size {
                has_more = true;
                break;
            }
            items.push(parse_notification_row(row)?);
        }

        let next_page_token = match items.last() {
            Some(last) if has_more => Some(encode_page_token(username, &last.thread_id)?),
            _ => None,
        };

        Ok(NotificationPage {
            items,
            next_page_token,
        })
    }

    fn delete_notification(&self, username: &str, thread_id: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM notifications
             WHERE username = ?1
               AND thread_id = ?2;",
            params![username, thread_id],
        )?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageCursor {
    username: String,
    thread_id: String,
}

fn encode_page_token(username: &str, thread_id: &str) -> RepoResult<String> {
    let cursor = PageCursor {
        username: username.to_string(),
        thread_id: thread_id.to_string(),
    };
    let json = serde_json::to_vec(&cursor).map_err(RepoError::Serialization)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_page_token(token: &str, username: &str) -> RepoResult<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|err| RepoError::InvalidPageToken(format!("not base64url: {err}")))?;
    let cursor: PageCursor = serde_json::from_slice(&bytes)
        .map_err(|err| RepoError::InvalidPageToken(format!("malformed cursor: {err}")))?;
    if cursor.username != username {
        return Err(RepoError::InvalidPageToken(
            "token was issued for another user".to_string(),
        ));
    }
    Ok(cursor.thread_id)
}

fn metadata_column(metadata: &NotificationMetadata) -> &'static str {
    match metadata {
        NotificationMetadata::GameComment(_) => "game_comment_metadata",
        NotificationMetadata::GameReview(_) => "game_review_metadata",
        NotificationMetadata::NewFollower(_) => "new_follower_metadata",
        NotificationMetadata::TimelineComment(_) => "timeline_comment_metadata",
        NotificationMetadata::ExplorerGame(_) => "explorer_game_metadata",
        NotificationMetadata::Club(_) => "club_metadata",
    }
}

fn encode_metadata(metadata: &NotificationMetadata) -> RepoResult<String> {
    let encoded = match metadata {
        NotificationMetadata::GameComment(value) => serde_json::to_string(value),
        NotificationMetadata::GameReview(value) => serde_json::to_string(value),
        NotificationMetadata::NewFollower(value) => serde_json::to_string(value),
        NotificationMetadata::TimelineComment(value) => serde_json::to_string(value),
        NotificationMetadata::ExplorerGame(value) => serde_json::to_string(value),
        NotificationMetadata::Club(value) => serde_json::to_string(value),
    };
    encoded.map_err(RepoError::Serialization)
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let type_text: String = row.get("type")?;
    let kind = NotificationType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid notification type `{type_text}`"))
    })?;

    let updated_at_text: String = row.get("updated_at")?;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at_text)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{updated_at_text}` in notifications.updated_at"
            ))
        })?
        .with_timezone(&Utc);

    let metadata = parse_metadata(row, kind)?;
    let notification = Notification {
        username: row.get("username")?,
        thread_id: row.get("thread_id")?,
        kind,
        updated_at,
        count: parse_count(row.get("count")?)?,
        metadata,
    };
    notification.validate()?;
    Ok(notification)
}

fn parse_metadata(row: &Row<'_>, kind: NotificationType) -> RepoResult<NotificationMetadata> {
    let metadata = match kind {
        NotificationType::GameComment => {
            NotificationMetadata::GameComment(read_metadata(row, "game_comment_metadata")?)
        }
        NotificationType::GameReviewComplete => {
            NotificationMetadata::GameReview(read_metadata(row, "game_review_metadata")?)
        }
        NotificationType::NewFollower => {
            NotificationMetadata::NewFollower(read_metadata(row, "new_follower_metadata")?)
        }
        NotificationType::TimelineComment | NotificationType::TimelineReaction => {
            NotificationMetadata::TimelineComment(read_metadata(row, "timeline_comment_metadata")?)
        }
        NotificationType::ExplorerGame => {
            NotificationMetadata::ExplorerGame(read_metadata(row, "explorer_game_metadata")?)
        }
        NotificationType::NewClubJoinRequest | NotificationType::ClubJoinRequestApproved => {
            NotificationMetadata::Club(read_metadata(row, "club_metadata")?)
        }
    };
    Ok(metadata)
}

fn read_metadata<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    column: &'static str,
) -> RepoResult<T> {
    let text: Option<String> = row.get(column)?;
    let text = text.ok_or_else(|| {
        RepoError::InvalidData(format!("missing metadata in notifications.{column}"))
    })?;
    serde_json::from_str(&text).map_err(|err| {
        RepoError::InvalidData(format!("invalid json in notifications.{column}: {err}"))
    })
}

fn parse_count(value: i64) -> RepoResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|count| *count >= 1)
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid count `{value}` in notifications.count"))
        })
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    ensure_table(conn, "notifications")?;
    Ok(())
}
