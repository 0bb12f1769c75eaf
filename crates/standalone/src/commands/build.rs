//! Build command - one archive per selected variant

use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

use standalone_core::{BuildLayout, BuilderConfig};
use standalone_runtime::{Downloader, PipelineOptions, build_all};

use crate::output;

/// Parsed command-line options for a build run
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    pub build: Option<PathBuf>,
    pub dist: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub variants: Vec<String>,
}

/// Build every selected variant, printing progress and the produced archives
///
/// Stops at the first failing variant; archives already produced stay in the
/// dist directory.
pub fn run(args: BuildArgs) -> Result<()> {
    let config = BuilderConfig::load(args.config.as_deref())?;
    let variants = config.select_variants(&args.variants)?;
    let layout = BuildLayout::resolve(args.build, args.dist)?;

    debug!(
        build_root = %layout.build_root.display(),
        dist_root = %layout.dist_root.display(),
        variants = variants.len(),
        "resolved build layout"
    );

    let options = PipelineOptions {
        downloader: Downloader::new()?.with_progress(output::print_progress),
        reporter: Some(output::print_event),
    };

    let artifacts = build_all(&config, &variants, &layout, &options)?;

    output::print_artifacts(&artifacts);
    Ok(())
}
