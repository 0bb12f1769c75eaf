//! CLI structure using clap

use clap::Parser;
use std::path::PathBuf;

use crate::commands::build::BuildArgs;

/// Build standalone application archives, one per platform variant
#[derive(Parser)]
#[command(name = "standalone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Build root and download cache [default: build/ beside the executable]
    #[arg(long, value_name = "PATH", env = "STANDALONE_BUILD_DIR")]
    pub build: Option<PathBuf>,

    /// Output directory for archives [default: dist/ beside the executable]
    #[arg(long, value_name = "PATH", env = "STANDALONE_DIST_DIR")]
    pub dist: Option<PathBuf>,

    /// Config file overriding the pinned versions and URLs [default: ./standalone.toml if present]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only build these variants (repeatable)
    #[arg(long = "variant", value_name = "NAME")]
    pub variants: Vec<String>,

    /// Debug logging on stderr (overrides RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn build_args(&self) -> BuildArgs {
        BuildArgs {
            build: self.build.clone(),
            dist: self.dist.clone(),
            config: self.config.clone(),
            variants: self.variants.clone(),
        }
    }
}
