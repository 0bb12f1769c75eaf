//! Configuration, naming and error types shared by the standalone builder.
//!
//! The builder produces one zip archive per platform variant. Everything that
//! decides *what* gets built lives here:
//!
//! - [`config`]: pinned versions, the variant catalog and `standalone.toml`
//! - [`layout`]: where build trees and finished archives go
//! - [`error`]: configuration-level errors

// Core modules
pub mod config;
pub mod error;
pub mod layout;

// Re-export commonly used types
pub use config::{BuilderConfig, Variant};
pub use error::{Result, StandaloneError};
pub use layout::BuildLayout;
