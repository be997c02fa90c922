//! Shared utilities for centralpub.
//!
//! This crate provides cross-cutting concerns used by all other centralpub
//! crates: the unified error type, filesystem helpers, streaming digests,
//! and terminal progress indicators.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
