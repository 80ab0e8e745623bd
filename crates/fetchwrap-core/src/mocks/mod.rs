//! Mocks management module.
//!
//! This module provides the mock state and its public entry point:
//! - [`MockRegistry`]: Stores normalized response sequences per (pattern, method) with run cursors
//! - [`MockEngine`]: Validates, resolves and answers dispatched calls, keeping the match log

pub mod engine;
pub mod registry;

pub use engine::MockEngine;
pub use registry::{MockEntry, MockKey, MockRegistry, MockSequence, PendingEntry};
