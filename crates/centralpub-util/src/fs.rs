use std::path::{Path, PathBuf};

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Recursively list every regular file under `dir`, sorted by path.
///
/// Unlike a best-effort walk, any unreadable directory is an error.
pub fn walk_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    walk_into(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_into(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Copy every file under `src` into `dest`, preserving relative layout.
///
/// Existing files in `dest` are overwritten. Returns the number of files copied.
pub fn copy_tree(src: &Path, dest: &Path) -> std::io::Result<u64> {
    let mut copied = 0;
    for file in walk_files(src)? {
        let Ok(relative) = file.strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        std::fs::copy(&file, &target)?;
        copied += 1;
    }
    Ok(copied)
}
