//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract for aggregated notifications.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Notification::validate()` before
//!   persistence.
//! - Concurrency safety comes from single-statement writes, not from
//!   in-process locks.

pub mod notification_repo;
