//! Core data types for centralpub.
//!
//! This crate defines the values that flow through the publish pipeline:
//! artifacts, deployment states and status snapshots, the `Central.toml`
//! project manifest, global server credentials, and `${env:VAR}`
//! interpolation.
//!
//! This crate is intentionally free of async code and network I/O.

/// Name of the project manifest file.
pub const MANIFEST_FILE: &str = "Central.toml";

/// Name of the optional secrets file read next to the manifest.
pub const ENV_FILE: &str = ".central.env";

pub mod artifact;
pub mod config;
pub mod deployment;
pub mod manifest;
pub mod properties;
