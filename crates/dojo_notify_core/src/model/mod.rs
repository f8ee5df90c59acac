//! Domain model for notifications and the events that produce them.
//!
//! # Responsibility
//! - Define the notification row shape and its metadata variants.
//! - Define the read-only event values supplied by upstream domains.
//! - Derive aggregation keys (`thread_id`) from notification context.
//!
//! # Invariants
//! - A notification carries exactly one metadata variant, matching its type.
//! - The same notification context always derives the same `thread_id`.

pub mod cohort;
pub mod event;
pub mod notification;
pub mod thread;
