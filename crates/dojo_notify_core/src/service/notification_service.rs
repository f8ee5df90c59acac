//! Notification use-case service.
//!
//! # Responsibility
//! - Expose put/list/delete entry points over a notification repository.
//! - Classify repository failures into caller-facing `ServiceError`s.
//! - Provide the best-effort delivery hook used by triggering workflows.
//!
//! # Invariants
//! - Put/list/delete propagate every failure; nothing is swallowed here.
//! - `deliver` is the only place where failures are logged and dropped, so a
//!   primary action (posting a comment, following a user) never fails because
//!   its notification could not be stored.
//! - No retries: each call is one repository round trip.

use crate::model::notification::Notification;
use crate::repo::notification_repo::{NotificationPage, NotificationRepository};
use crate::service::error::ServiceError;
use log::{error, info, warn};
use std::time::Instant;

/// Result of a best-effort delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The factory produced no notification; the store was not touched.
    Skipped,
    /// The notification was merged; carries the thread's stored count.
    Stored { count: u32 },
    /// The store rejected or failed the write; the failure was logged.
    Failed,
}

/// Service facade over notification repositories.
pub struct NotificationService<R: NotificationRepository> {
    repo: R,
}

impl<R: NotificationRepository> NotificationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Merges one notification into its thread.
    pub fn put_notification(&self, notification: &Notification) -> Result<(), ServiceError> {
        self.upsert(notification).map(|_| ())
    }

    /// Lists one page of `username`'s notifications, newest thread first.
    pub fn list_notifications(
        &self,
        username: &str,
        page_token: Option<&str>,
    ) -> Result<NotificationPage, ServiceError> {
        let started_at = Instant::now();
        match self.repo.list_notifications(username, page_token) {
            Ok(page) => {
                info!(
                    "event=notification_list module=service status=ok items={} has_more={} duration_ms={}",
                    page.items.len(),
                    page.next_page_token.is_some(),
                    started_at.elapsed().as_millis()
                );
                Ok(page)
            }
            Err(err) => {
                let err = ServiceError::from_repo("list notifications", err);
                log_failure("notification_list", &err, started_at);
                Err(err)
            }
        }
    }

    /// Deletes one notification thread. Deleting a missing thread succeeds.
    pub fn delete_notification(&self, username: &str, thread_id: &str) -> Result<(), ServiceError> {
        let started_at = Instant::now();
        match self.repo.delete_notification(username, thread_id) {
            Ok(()) => {
                info!(
                    "event=notification_delete module=service status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                let err = ServiceError::from_repo("delete notification", err);
                log_failure("notification_delete", &err, started_at);
                Err(err)
            }
        }
    }

    /// Stores a factory result without failing the calling workflow.
    ///
    /// # Policy
    /// - `None` is a normal outcome and performs no store call.
    /// - Store failures are logged and reported as `Failed`, never returned.
    pub fn deliver(&self, notification: Option<Notification>) -> DeliveryOutcome {
        let Some(notification) = notification else {
            return DeliveryOutcome::Skipped;
        };

        match self.upsert(&notification) {
            Ok(count) => DeliveryOutcome::Stored { count },
            Err(err) => {
                warn!(
                    "event=notification_deliver module=service status=dropped type={} error_code={} error={}",
                    notification.kind,
                    err.kind().code(),
                    err
                );
                DeliveryOutcome::Failed
            }
        }
    }

    fn upsert(&self, notification: &Notification) -> Result<u32, ServiceError> {
        let started_at = Instant::now();
        match self.repo.upsert_notification(notification) {
            Ok(count) => {
                info!(
                    "event=notification_upsert module=service status=ok type={} count={} duration_ms={}",
                    notification.kind,
                    count,
                    started_at.elapsed().as_millis()
                );
                Ok(count)
            }
            Err(err) => {
                let err = ServiceError::from_repo("upsert notification", err);
                log_failure("notification_upsert", &err, started_at);
                Err(err)
            }
        }
    }
}

fn log_failure(event: &str, err: &ServiceError, started_at: Instant) {
    error!(
        "event={} module=service status=error duration_ms={} error_code={} error={}",
        event,
        started_at.elapsed().as_millis(),
        err.kind().code(),
        err
    );
}
