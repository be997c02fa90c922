//! Checksum sidecar generation (MD5, SHA-1, SHA-256, SHA-512).

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use centralpub_util::errors::PublishError;
use centralpub_util::hash;
use thiserror::Error;

/// Extension of detached PGP signatures, which are never hashed.
pub const SIGNATURE_EXTENSION: &str = "asc";

/// Digest algorithm used for a sidecar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl ChecksumAlgorithm {
    /// Algorithms generated when nothing else is configured.
    pub const DEFAULT: [ChecksumAlgorithm; 2] = [Self::Md5, Self::Sha1];

    pub const ALL: [ChecksumAlgorithm; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// File extension appended to the artifact name, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Lowercase hex digest of the whole file.
    pub fn hex_file(self, path: &Path) -> std::io::Result<String> {
        match self {
            Self::Md5 => hash::md5_file(path),
            Self::Sha1 => hash::sha1_file(path),
            Self::Sha256 => hash::sha256_file(path),
            Self::Sha512 => hash::sha512_file(path),
        }
    }

    /// Parse the `checksums` list of a manifest, rejecting unknown names.
    pub fn parse_list(names: &[String]) -> miette::Result<Vec<Self>> {
        let mut algorithms = Vec::with_capacity(names.len());
        for name in names {
            let algorithm: Self = name.parse().map_err(|e: UnknownAlgorithm| {
                PublishError::Config {
                    message: e.to_string(),
                }
            })?;
            if !algorithms.contains(&algorithm) {
                algorithms.push(algorithm);
            }
        }
        if algorithms.is_empty() {
            return Ok(Self::DEFAULT.to_vec());
        }
        Ok(algorithms)
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Returned when a checksum algorithm name is not recognised.
#[derive(Debug, Error)]
#[error("unknown checksum algorithm `{0}` (expected md5, sha1, sha256 or sha512)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for ChecksumAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Whether `file_name` is itself a digest or signature sidecar.
pub fn is_sidecar(file_name: &str) -> bool {
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return false;
    };
    ext == SIGNATURE_EXTENSION || ChecksumAlgorithm::ALL.iter().any(|a| a.extension() == ext)
}

/// Path of the sidecar for `path`: the algorithm extension is appended,
/// so `lib-1.0.jar` becomes `lib-1.0.jar.sha1`.
pub fn sidecar_path(path: &Path, algorithm: ChecksumAlgorithm) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(algorithm.extension());
    PathBuf::from(name)
}

/// Write one sidecar per algorithm next to `path`.
///
/// Directories and files that are already sidecars are skipped, returning an
/// empty list. Existing sidecars are overwritten. The source file is only read.
pub fn generate_sidecars(
    path: &Path,
    algorithms: &[ChecksumAlgorithm],
) -> std::io::Result<Vec<PathBuf>> {
    if path.is_dir() {
        return Ok(Vec::new());
    }
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(Vec::new());
    };
    if is_sidecar(file_name) {
        return Ok(Vec::new());
    }

    let mut written = Vec::with_capacity(algorithms.len());
    for &algorithm in algorithms {
        let digest = algorithm.hex_file(path)?;
        let target = sidecar_path(path, algorithm);
        std::fs::write(&target, digest.as_bytes())?;
        written.push(target);
    }
    tracing::trace!("wrote {} sidecars for {}", written.len(), path.display());
    Ok(written)
}
