//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-level APIs.
//! - Own error classification and the best-effort delivery policy.
//! - Render notification display text.

pub mod error;
pub mod notification_service;
pub mod notification_text;
