//! HTTP downloads with a local file cache
//!
//! - Client construction with user agent and timeout
//! - Cached, streaming downloads keyed by the URL's final path segment

pub mod client;
pub mod download;

// Re-exports for convenient access
pub use client::{DEFAULT_TIMEOUT, USER_AGENT, build_client, build_default_client};
pub use download::{Downloader, ProgressFn, cached_file_name};
