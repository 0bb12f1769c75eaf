//! Runtime staging and archiving for standalone builds.
//!
//! # Pipeline
//!
//! ```text
//! build_variant()
//!     ↓
//! 1. Reset {build_root}/{dist_name}, guard {dist_root}/{dist_name}.zip
//!     ↓
//! 2. fetch_runtime()        download (cached) + extract + patch python*._pth
//!     ↓
//! 3. bootstrap_installer()  download (cached) get-pip.py, run it
//!     ↓
//! 4. install_application()  python -m pip install {app}=={version}
//!     ↓
//! 5. archive_tree()         zip the tree minus *.dist-info
//! ```
//!
//! Every step is blocking and fallible; the first error aborts the run.
//!
//! # Example
//!
//! ```no_run
//! use standalone_core::{BuildLayout, BuilderConfig};
//! use standalone_runtime::{Downloader, PipelineOptions, build_all};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuilderConfig::default();
//! let variants = config.catalog()?;
//! let layout = BuildLayout::new("build", "dist");
//!
//! let options = PipelineOptions {
//!     downloader: Downloader::new()?,
//!     reporter: None,
//! };
//! let artifacts = build_all(&config, &variants, &layout, &options)?;
//! for artifact in artifacts {
//!     println!("{}", artifact.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod bootstrap;
pub mod error;
pub mod fetch;
pub mod http;
pub mod install;
pub mod pipeline;
pub mod process;

// Re-export commonly used types
pub use archive::archive_tree;
pub use bootstrap::bootstrap_installer;
pub use error::BuildError;
pub use fetch::fetch_runtime;
pub use http::Downloader;
pub use install::install_application;
pub use pipeline::{BuildEvent, PipelineOptions, build_all, build_variant};
pub use process::Interpreter;

pub type Result<T> = std::result::Result<T, BuildError>;
