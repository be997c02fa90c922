//! Merging module repositories into one staging repository.

use std::path::{Path, PathBuf};

use centralpub_util::errors::PublishError;

/// Copy every module repository into `staging`, returning the files copied.
///
/// Modules sharing a coordinate overwrite each other in declaration order.
/// A missing module repository is a configuration error: the build was
/// expected to install into it before publishing.
pub fn stage_modules(repositories: &[PathBuf], staging: &Path) -> miette::Result<u64> {
    centralpub_util::fs::ensure_dir(staging).map_err(PublishError::Io)?;
    let mut total = 0;
    for repository in repositories {
        if !repository.is_dir() {
            return Err(PublishError::Config {
                message: format!(
                    "Module repository {} does not exist; install the artifacts first",
                    repository.display()
                ),
            }
            .into());
        }
        let copied =
            centralpub_util::fs::copy_tree(repository, staging).map_err(PublishError::Io)?;
        tracing::debug!("Staged {copied} files from {}", repository.display());
        total += copied;
    }
    Ok(total)
}
