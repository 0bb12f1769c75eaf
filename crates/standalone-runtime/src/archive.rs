//! Build-tree archiving
//!
//! Package metadata directories (`*.dist-info`) are pruned: they are only
//! needed by the installer, not at run time.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;

use standalone_core::config::consts::installer::METADATA_DIR_SUFFIX;

use crate::error::BuildError;

/// Zips every file under `source_dir` into a new archive at `target_path`
///
/// Entry names are paths relative to `source_dir` with `/` separators.
/// Directories whose name ends in `.dist-info` are skipped entirely.
///
/// # Errors
///
/// - `TargetExists` if `target_path` already exists; it is never overwritten
/// - `ArchiveFailed` on zip writer errors
/// - `IoError` on filesystem errors
pub fn archive_tree(source_dir: &Path, target_path: &Path) -> Result<PathBuf, BuildError> {
    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target_path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => BuildError::TargetExists {
                path: target_path.to_path_buf(),
            },
            _ => BuildError::io(format!("create archive {}", target_path.display()), e),
        })?;

    let archive_failed = |e: zip::result::ZipError| BuildError::ArchiveFailed {
        path: target_path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut zip = zip::ZipWriter::new(file);
    let mut count = 0usize;

    let walker = WalkDir::new(source_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_metadata_dir(entry));

    for entry in walker {
        let entry = entry.map_err(|e| {
            BuildError::io(
                format!("walk directory {}", source_dir.display()),
                io::Error::other(e),
            )
        })?;

        if !is_archived_file(&entry) {
            continue;
        }

        let name = entry_name(source_dir, entry.path())?;
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(file_mode(&entry)?);

        zip.start_file(name.as_str(), options)
            .map_err(archive_failed)?;

        let mut source = fs::File::open(entry.path())
            .map_err(|e| BuildError::io(format!("open {}", entry.path().display()), e))?;
        io::copy(&mut source, &mut zip).map_err(|e| {
            BuildError::io(format!("compress {}", entry.path().display()), e)
        })?;

        debug!(entry = %name, "archived");
        count += 1;
    }

    zip.finish().map_err(archive_failed)?;

    info!(archive = %target_path.display(), files = count, "archive written");
    Ok(target_path.to_path_buf())
}

/// Regular files, and symlinks resolving to one (stored with the target's
/// content). Symlinked directories are not descended into.
fn is_archived_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_symlink() {
        return fs::metadata(entry.path()).is_ok_and(|m| m.is_file());
    }
    file_type.is_file()
}

/// Directory named `*.dist-info`; matched on the final path segment only
fn is_metadata_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && has_metadata_suffix(entry.file_name())
}

fn has_metadata_suffix(name: &OsStr) -> bool {
    name.to_string_lossy().ends_with(METADATA_DIR_SUFFIX)
}

/// In-archive name: `path` relative to `root`, `/`-separated
fn entry_name(root: &Path, path: &Path) -> Result<String, BuildError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        BuildError::io(
            format!("relativize {}", path.display()),
            io::Error::other(format!("not under {}", root.display())),
        )
    })?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

#[cfg(unix)]
fn file_mode(entry: &DirEntry) -> Result<u32, BuildError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(entry.path()).map_err(|e| {
        BuildError::io(format!("get metadata for {}", entry.path().display()), e)
    })?;
    Ok(metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn file_mode(_entry: &DirEntry) -> Result<u32, BuildError> {
    Ok(0o644)
}
