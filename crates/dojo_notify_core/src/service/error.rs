//! Caller-facing error classification for notification operations.
//!
//! # Invariants
//! - Storage failures always classify as `TemporaryServerError` (status 500).
//! - Bad caller input (malformed page token, invalid notification) classifies
//!   as `InvalidRequest` (status 400), never as a storage failure.
//! - `public_message` is stable and safe to show to end users;
//!   `private_message` names the failing operation for logs.

use crate::repo::notification_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

const TEMPORARY_SERVER_ERROR: &str = "Temporary server error";
const INVALID_REQUEST: &str = "Invalid request";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    InvalidRequest,
    TemporaryServerError,
}

impl ServiceErrorKind {
    pub fn status(self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::TemporaryServerError => 500,
        }
    }

    /// Stable machine-readable code used in logs.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::TemporaryServerError => "temporary_server_error",
        }
    }
}

#[derive(Debug)]
pub struct ServiceError {
    kind: ServiceErrorKind,
    private_message: String,
    source: Option<RepoError>,
}

impl ServiceError {
    /// Classifies a repository failure raised while running `operation`.
    pub fn from_repo(operation: &str, err: RepoError) -> Self {
        let kind = match err {
            RepoError::Validation(_) | RepoError::InvalidPageToken(_) => {
                ServiceErrorKind::InvalidRequest
            }
            RepoError::Db(_)
            | RepoError::Serialization(_)
            | RepoError::UninitializedConnection { .. }
            | RepoError::InvalidData(_) => ServiceErrorKind::TemporaryServerError,
        };
        Self {
            kind,
            private_message: format!("{operation} failed"),
            source: Some(err),
        }
    }

    pub fn kind(&self) -> ServiceErrorKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    pub fn public_message(&self) -> &'static str {
        match self.kind {
            ServiceErrorKind::InvalidRequest => INVALID_REQUEST,
            ServiceErrorKind::TemporaryServerError => TEMPORARY_SERVER_ERROR,
        }
    }

    pub fn private_message(&self) -> &str {
        &self.private_message
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.public_message(),
            self.status(),
            self.private_message
        )?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|err| err as &(dyn Error + 'static))
    }
}
