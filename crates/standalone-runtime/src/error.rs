use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;
use url::Url;

/// Errors raised while staging or archiving a variant
///
/// None of these are retried; the first one aborts the whole run.
#[derive(Debug, Error)]
pub enum BuildError {
    /// HTTP client could not be constructed
    #[error("HTTP_CLIENT_FAILED: {0}")]
    HttpClientFailed(#[source] reqwest::Error),

    /// Transport failure or non-success status
    #[error("DOWNLOAD_FAILED: {url}: {source}")]
    DownloadFailed {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// URL has no final path segment to name the cached file after
    #[error("INVALID_URL: {url}: {reason}")]
    InvalidUrl { url: Url, reason: String },

    /// Runtime archive could not be read
    #[error("EXTRACTION_FAILED: {archive}: {reason}")]
    ExtractionFailed { archive: PathBuf, reason: String },

    /// No startup-path file in the extracted runtime
    #[error("RUNTIME_CONFIG_NOT_FOUND: no python*._pth file in {dir}")]
    RuntimeConfigNotFound { dir: PathBuf },

    /// More than one startup-path file in the extracted runtime
    #[error("RUNTIME_CONFIG_AMBIGUOUS: {count} python*._pth files in {dir}")]
    RuntimeConfigAmbiguous { dir: PathBuf, count: usize },

    /// Interpreter could not be started
    #[error("PROCESS_SPAWN_FAILED: {program}: {source}")]
    ProcessSpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Interpreter exited unsuccessfully
    #[error("PROCESS_FAILED: {program} {args} exited with {status}")]
    ProcessFailed {
        program: PathBuf,
        args: String,
        status: ExitStatus,
    },

    /// Refusing to overwrite a published archive
    #[error("TARGET_EXISTS: {path} already exists")]
    TargetExists { path: PathBuf },

    /// Zip writer failure
    #[error("ARCHIVE_FAILED: {path}: {reason}")]
    ArchiveFailed { path: PathBuf, reason: String },

    /// Configuration rejected while building
    #[error(transparent)]
    Config(#[from] standalone_core::StandaloneError),

    #[error("IO_ERROR: {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        BuildError::IoError {
            operation: operation.into(),
            source,
        }
    }
}
