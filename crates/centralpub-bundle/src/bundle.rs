//! Zip bundle assembly from a local Maven-layout repository.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use centralpub_core::artifact::Artifact;
use centralpub_util::errors::PublishError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::checksum::{self, ChecksumAlgorithm};

/// File-name pattern of the metadata Maven writes for local installs.
///
/// The trailing `*` also drops that file's own sidecars.
pub const LOCAL_METADATA_PATTERN: &str = "maven-metadata-local.xml*";

/// Deflate level used for every entry (the maximum).
const COMPRESSION_LEVEL: i64 = 9;

/// Knobs for [`assemble`].
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub algorithms: Vec<ChecksumAlgorithm>,
    /// File-name globs excluded from the archive.
    pub exclude: Vec<String>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            algorithms: ChecksumAlgorithm::DEFAULT.to_vec(),
            exclude: vec![LOCAL_METADATA_PATTERN.to_string()],
        }
    }
}

impl BundleOptions {
    /// Default options plus extra exclusion globs.
    pub fn with_excludes(algorithms: Vec<ChecksumAlgorithm>, extra: &[String]) -> Self {
        let mut options = Self {
            algorithms,
            ..Self::default()
        };
        options.exclude.extend(extra.iter().cloned());
        options
    }

    pub(crate) fn exclude_set(&self) -> miette::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|e| PublishError::Config {
                message: format!("Invalid exclude pattern `{pattern}`: {e}"),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| {
            PublishError::Config {
                message: format!("Invalid exclude patterns: {e}"),
            }
            .into()
        })
    }
}

/// The result of one assembly run.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub archive: PathBuf,
    /// Non-sidecar files in the archive, sorted by path.
    pub artifacts: Vec<Artifact>,
    /// Total number of archive entries, sidecars included.
    pub entries: usize,
}

impl Bundle {
    /// Whether the archive holds nothing worth uploading.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Size of the archive on disk.
    pub fn archive_size(&self) -> std::io::Result<u64> {
        Ok(std::fs::metadata(&self.archive)?.len())
    }
}

/// Generate sidecars for every file under `root`, then zip the tree into `output`.
///
/// Entries are rooted at `root` (no wrapper directory) and compressed at the
/// maximum Deflate level. Files whose name matches an exclusion glob are left
/// out. An empty repository yields an empty (but valid) bundle; the caller
/// decides whether that is worth uploading.
pub fn assemble(root: &Path, output: &Path, options: &BundleOptions) -> miette::Result<Bundle> {
    let exclude = options.exclude_set()?;
    let output_abs = std::fs::canonicalize(output).ok();
    let is_output = |file: &Path| file == output || output_abs.as_deref() == Some(file);

    tracing::info!("Creating checksum files for all files in {}", root.display());
    for file in centralpub_util::fs::walk_files(root).map_err(PublishError::Io)? {
        if is_output(&file) {
            continue;
        }
        checksum::generate_sidecars(&file, &options.algorithms).map_err(PublishError::Io)?;
    }

    let mut included = Vec::new();
    for file in centralpub_util::fs::walk_files(root).map_err(PublishError::Io)? {
        if is_output(&file) {
            continue;
        }
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if exclude.is_match(name) {
            tracing::debug!("Excluding {} from bundle", file.display());
            continue;
        }
        let Ok(relative) = file.strip_prefix(root) else {
            continue;
        };
        included.push((file.clone(), relative.to_path_buf()));
    }

    write_archive(output, &included)?;
    tracing::debug!("Added {} to {}", root.display(), output.display());

    let artifacts = included
        .iter()
        .filter(|(file, _)| {
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            !checksum::is_sidecar(name)
        })
        .map(|(_, relative)| Artifact::from_relative(relative.clone()))
        .collect();

    Ok(Bundle {
        archive: output.to_path_buf(),
        artifacts,
        entries: included.len(),
    })
}

fn write_archive(output: &Path, files: &[(PathBuf, PathBuf)]) -> miette::Result<()> {
    if let Some(parent) = output.parent() {
        centralpub_util::fs::ensure_dir(parent).map_err(PublishError::Io)?;
    }
    let writer = BufWriter::new(File::create(output).map_err(PublishError::Io)?);
    let mut zip = ZipWriter::new(writer);
    let base = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    for (file, relative) in files {
        let len = std::fs::metadata(file).map_err(PublishError::Io)?.len();
        let options = base.large_file(len >= u64::from(u32::MAX));
        zip.start_file(entry_name(relative), options).map_err(zip_error)?;
        let mut source = File::open(file).map_err(PublishError::Io)?;
        std::io::copy(&mut source, &mut zip).map_err(PublishError::Io)?;
    }

    let mut writer = zip.finish().map_err(zip_error)?;
    writer.flush().map_err(PublishError::Io)?;
    Ok(())
}

/// Archive entry name with `/` separators regardless of platform.
pub(crate) fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn zip_error(e: zip::result::ZipError) -> PublishError {
    PublishError::Bundle {
        message: format!("Failed to write archive: {e}"),
    }
}
