//! Bundle assembly for the Central Portal upload API.
//!
//! A bundle is a single zip archive containing a Maven-layout repository
//! together with `.md5`/`.sha1` (and optionally `.sha256`/`.sha512`)
//! sidecars for every artifact.

pub mod bundle;
pub mod checksum;
pub mod snapshot;
pub mod staging;
