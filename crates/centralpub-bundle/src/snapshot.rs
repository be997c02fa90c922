//! Separating snapshot versions from the release staging tree.

use std::path::{Path, PathBuf};

use centralpub_core::artifact::Artifact;
use centralpub_util::errors::PublishError;

use crate::bundle::{entry_name, BundleOptions};
use crate::checksum;

/// Snapshot files moved out of a staging tree, ready to be deployed.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    /// Directory holding the moved files in Maven layout.
    pub root: PathBuf,
    /// Every file under `root` (sidecars included) as `/`-separated paths, sorted.
    pub files: Vec<String>,
    /// The non-sidecar files.
    pub artifacts: Vec<Artifact>,
}

impl SnapshotSet {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Absolute path of one of [`files`](Self::files).
    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

/// Move the files of every `-SNAPSHOT` version under `staging` into `destination`.
///
/// Files matching the exclusion globs stay where they are, so local-only
/// metadata never leaves the machine. Sidecars are generated for the moved
/// files with the configured algorithms. What remains in `staging` is release
/// content only.
pub fn split_snapshots(
    staging: &Path,
    destination: &Path,
    options: &BundleOptions,
) -> miette::Result<SnapshotSet> {
    let exclude = options.exclude_set()?;
    let mut moved = Vec::new();

    for file in centralpub_util::fs::walk_files(staging).map_err(PublishError::Io)? {
        let Ok(relative) = file.strip_prefix(staging) else {
            continue;
        };
        if !Artifact::from_relative(relative).snapshot {
            continue;
        }
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if exclude.is_match(name) {
            continue;
        }
        let target = destination.join(relative);
        if let Some(parent) = target.parent() {
            centralpub_util::fs::ensure_dir(parent).map_err(PublishError::Io)?;
        }
        std::fs::rename(&file, &target).map_err(PublishError::Io)?;
        moved.push(target);
    }

    if moved.is_empty() {
        return Ok(SnapshotSet {
            root: destination.to_path_buf(),
            ..SnapshotSet::default()
        });
    }

    for file in &moved {
        checksum::generate_sidecars(file, &options.algorithms).map_err(PublishError::Io)?;
    }

    let mut files = Vec::new();
    let mut artifacts = Vec::new();
    for file in centralpub_util::fs::walk_files(destination).map_err(PublishError::Io)? {
        let Ok(relative) = file.strip_prefix(destination) else {
            continue;
        };
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !checksum::is_sidecar(name) {
            artifacts.push(Artifact::from_relative(relative));
        }
        files.push(entry_name(relative));
    }
    files.sort();
    artifacts.sort();
    tracing::info!(
        "Separated {} snapshot artifacts ({} files) into {}",
        artifacts.len(),
        files.len(),
        destination.display()
    );

    Ok(SnapshotSet {
        root: destination.to_path_buf(),
        files,
        artifacts,
    })
}
