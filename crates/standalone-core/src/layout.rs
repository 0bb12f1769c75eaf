//! Build and dist directory layout
//!
//! ```text
//! {build_root}/
//!     python-3.8.5-embed-amd64.zip        download cache
//!     get-pip.py                          download cache
//!     datasette-standalone-amd64-0.48/    staged runtime, one per variant
//! {dist_root}/
//!     datasette-standalone-amd64-0.48.zip
//! ```

use std::path::{Path, PathBuf};

use crate::config::consts::paths;
use crate::error::{Result, StandaloneError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Per-variant build trees, and the download cache
    pub build_root: PathBuf,
    /// Finished archives
    pub dist_root: PathBuf,
}

impl BuildLayout {
    pub fn new(build_root: impl Into<PathBuf>, dist_root: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
            dist_root: dist_root.into(),
        }
    }

    /// Uses the given roots, falling back to `build/` and `dist/` beside the
    /// running executable
    pub fn resolve(build_root: Option<PathBuf>, dist_root: Option<PathBuf>) -> Result<Self> {
        let (build_root, dist_root) = match (build_root, dist_root) {
            (Some(build), Some(dist)) => (build, dist),
            (build, dist) => {
                let base = executable_dir()?;
                (
                    build.unwrap_or_else(|| base.join(paths::BUILD_DIR)),
                    dist.unwrap_or_else(|| base.join(paths::DIST_DIR)),
                )
            }
        };
        Ok(Self::new(build_root, dist_root))
    }

    /// Downloads are cached directly in the build root
    pub fn cache_dir(&self) -> &Path {
        &self.build_root
    }

    pub fn build_dir(&self, dist_name: &str) -> PathBuf {
        self.build_root.join(dist_name)
    }

    pub fn archive_path(&self, dist_name: &str) -> PathBuf {
        self.dist_root
            .join(format!("{}.{}", dist_name, paths::ARCHIVE_EXTENSION))
    }
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        StandaloneError::LayoutUnresolved(format!(
            "executable {} has no parent directory",
            exe.display()
        ))
    })
}
