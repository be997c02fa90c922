use std::path::{Path, PathBuf};

/// Suffix marking a Maven snapshot version directory.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// A resolved artifact file inside a Maven-layout repository.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Artifact {
    /// Path relative to the repository root.
    pub path: PathBuf,
    pub snapshot: bool,
}

impl Artifact {
    /// Build an artifact from its path relative to the repository root.
    ///
    /// The snapshot flag comes from the layout
    /// `<group>/<artifact>/<version>/<file>`: the version directory of a
    /// snapshot ends in `-SNAPSHOT`.
    pub fn from_relative(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|v| v.to_str())
            .is_some_and(|v| v.ends_with(SNAPSHOT_SUFFIX));
        Self { path, snapshot }
    }

    /// File name of the artifact, if it has one.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}
