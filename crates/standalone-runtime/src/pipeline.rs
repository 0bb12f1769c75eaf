//! Per-variant build orchestration
//!
//! Variants are built strictly one after another. The first failure aborts
//! the run; the half-built directory of the failing variant is left in place
//! for inspection and wiped by the next run.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

use standalone_core::{BuildLayout, BuilderConfig, Variant};

use crate::archive::archive_tree;
use crate::bootstrap::bootstrap_installer;
use crate::error::BuildError;
use crate::fetch::fetch_runtime;
use crate::http::Downloader;
use crate::install::install_application;
use crate::process::Interpreter;

/// Progress notifications emitted while building a variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// Build directory has been reset
    BuildingInto(PathBuf),
    /// Runtime download (or cache lookup) is about to start
    FetchingRuntime(Url),
    /// Bootstrap script is about to run
    InstallingInstaller,
    /// Application requirement is about to be installed
    InstallingApplication(String),
    /// Archive is about to be written
    Archiving(PathBuf),
    /// Archive is complete
    Archived(PathBuf),
}

/// Pipeline configuration
#[derive(Clone)]
pub struct PipelineOptions {
    pub downloader: Downloader,

    /// Optional progress callback
    pub reporter: Option<fn(&BuildEvent)>,
}

impl PipelineOptions {
    fn report(&self, event: BuildEvent) {
        if let Some(reporter) = self.reporter {
            reporter(&event);
        }
    }
}

/// Builds every variant in order and returns the produced archive paths
///
/// The config is validated first, so no directory is touched for a config
/// whose names would resolve outside the build or dist roots.
pub fn build_all(
    config: &BuilderConfig,
    variants: &[Variant],
    layout: &BuildLayout,
    options: &PipelineOptions,
) -> Result<Vec<PathBuf>, BuildError> {
    config.validate()?;

    let mut artifacts = Vec::with_capacity(variants.len());
    for variant in variants {
        artifacts.push(build_variant(config, variant, layout, options)?);
    }
    Ok(artifacts)
}

/// Builds one variant and returns its archive path
///
/// # Errors
///
/// `TargetExists` before any download or subprocess work if the archive is
/// already present; otherwise the first error of any step.
pub fn build_variant(
    config: &BuilderConfig,
    variant: &Variant,
    layout: &BuildLayout,
    options: &PipelineOptions,
) -> Result<PathBuf, BuildError> {
    let dist_name = config.app.dist_name(&variant.name);
    let build_dir = layout.build_dir(&dist_name);
    let target = layout.archive_path(&dist_name);

    reset_dir(&build_dir)?;
    fs::create_dir_all(&layout.dist_root).map_err(|e| {
        BuildError::io(
            format!("create dist directory {}", layout.dist_root.display()),
            e,
        )
    })?;

    info!(variant = %variant.name, build_dir = %build_dir.display(), "building variant");
    options.report(BuildEvent::BuildingInto(build_dir.clone()));

    if target.exists() {
        return Err(BuildError::TargetExists { path: target });
    }

    let cache_dir = layout.cache_dir();
    let bootstrap_url = config.bootstrap_url()?;

    options.report(BuildEvent::FetchingRuntime(variant.url.clone()));
    fetch_runtime(&options.downloader, &variant.url, cache_dir, &build_dir)?;

    let interpreter = Interpreter::in_build_dir(&build_dir, &config.runtime.interpreter);

    options.report(BuildEvent::InstallingInstaller);
    bootstrap_installer(&options.downloader, &bootstrap_url, cache_dir, &interpreter)?;

    options.report(BuildEvent::InstallingApplication(config.app.requirement()));
    install_application(&interpreter, &config.app)?;

    options.report(BuildEvent::Archiving(target.clone()));
    let archive = archive_tree(&build_dir, &target)?;
    options.report(BuildEvent::Archived(archive.clone()));

    Ok(archive)
}

/// Removes `dir` if present, then recreates it empty
fn reset_dir(dir: &Path) -> Result<(), BuildError> {
    if dir.exists() {
        info!(dir = %dir.display(), "removing stale build directory");
        fs::remove_dir_all(dir)
            .map_err(|e| BuildError::io(format!("remove directory {}", dir.display()), e))?;
    }
    fs::create_dir_all(dir)
        .map_err(|e| BuildError::io(format!("create directory {}", dir.display()), e))
}
