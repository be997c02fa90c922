//! Operation: assemble a bundle from a repository without uploading it.

use std::path::Path;

use centralpub_bundle::bundle::{self, Bundle, BundleOptions};
use centralpub_util::errors::PublishError;
use centralpub_util::progress::status_warn;

/// Generate sidecars under `repository` and zip it into `output`.
pub fn bundle(repository: &Path, output: &Path, options: &BundleOptions) -> miette::Result<Bundle> {
    if !repository.is_dir() {
        return Err(PublishError::Config {
            message: format!("Repository {} is not a directory", repository.display()),
        }
        .into());
    }
    let assembled = bundle::assemble(repository, output, options)?;
    if assembled.is_empty() {
        status_warn("Warning", &format!("{} contains no artifacts", repository.display()));
    }
    Ok(assembled)
}
