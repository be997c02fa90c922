use std::path::Path;

use miette::Result;

use centralpub_bundle::bundle::BundleOptions;
use centralpub_core::config::GlobalConfig;
use centralpub_core::manifest::Manifest;
use centralpub_ops::ProjectContext;
use centralpub_util::progress::{display_size, status};

pub fn exec(repository: &Path, output: &Path) -> Result<()> {
    // Checksums and exclusions come from Central.toml when run inside a project.
    let options = match Manifest::discover(&super::current_dir()?)? {
        Some((root, manifest)) => {
            ProjectContext::new(root, manifest, GlobalConfig::default()).bundle_options()?
        }
        None => BundleOptions::default(),
    };

    let bundle = centralpub_ops::ops_bundle::bundle(repository, output, &options)?;
    let size = bundle.archive_size().unwrap_or(0);
    status(
        "Bundled",
        &format!(
            "{} artifacts into {} ({})",
            bundle.artifacts.len(),
            output.display(),
            display_size(size)
        ),
    );
    Ok(())
}
