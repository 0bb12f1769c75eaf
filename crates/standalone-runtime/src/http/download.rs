//! Cached downloads
//!
//! A download is stored in the cache directory under the URL's final path
//! segment. When that file already exists no request is made. Transfers go to a
//! temporary file in the cache directory first and are only renamed into place
//! once complete, so an interrupted download is never mistaken for a cached one.

use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use super::client::build_default_client;
use crate::error::BuildError;

/// Progress callback (bytes_downloaded, total_bytes); total is 0 when unknown
pub type ProgressFn = fn(u64, u64);

/// Blocking HTTP downloader with a file cache
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    progress: Option<ProgressFn>,
}

impl Downloader {
    /// Downloader using [`build_default_client`]
    pub fn new() -> Result<Self, BuildError> {
        let client = build_default_client().map_err(BuildError::HttpClientFailed)?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Returns `cache_dir/{file name}`, downloading it first if absent
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` if the URL has no final path segment
    /// - `DownloadFailed` on transport errors or non-success status
    /// - `IoError` if the cache directory cannot be written
    pub fn fetch_cached(&self, url: &Url, cache_dir: &Path) -> Result<PathBuf, BuildError> {
        let dest = cache_dir.join(cached_file_name(url)?);

        if dest.is_file() {
            info!(path = %dest.display(), "using cached download");
            return Ok(dest);
        }

        std::fs::create_dir_all(cache_dir).map_err(|e| {
            BuildError::io(format!("create cache directory {}", cache_dir.display()), e)
        })?;

        info!(url = %url, "downloading");
        self.download_to(url, &dest)?;
        Ok(dest)
    }

    fn download_to(&self, url: &Url, dest: &Path) -> Result<(), BuildError> {
        let download_failed = |source: reqwest::Error| BuildError::DownloadFailed {
            url: url.clone(),
            source,
        };

        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(download_failed)?;

        if let Err(err) = response.error_for_status_ref() {
            return Err(download_failed(err.without_url()));
        }

        let total = response.content_length().unwrap_or(0);

        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            BuildError::io(format!("create temporary file in {}", dir.display()), e)
        })?;

        let mut downloaded: u64 = 0;
        let mut buffer = [0; 8192];

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| BuildError::io(format!("read response from {}", url), e))?;

            if bytes_read == 0 {
                break;
            }

            temp_file
                .write_all(&buffer[..bytes_read])
                .map_err(|e| BuildError::io("write to temporary file", e))?;

            downloaded += bytes_read as u64;

            if let Some(callback) = self.progress {
                callback(downloaded, total);
            }
        }

        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| BuildError::io("sync temporary file", e))?;

        temp_file.persist(dest).map_err(|e| {
            BuildError::io(format!("persist download to {}", dest.display()), e.error)
        })?;

        debug!(path = %dest.display(), bytes = downloaded, "download complete");
        Ok(())
    }
}

/// File name a download is cached under: the URL's final path segment
pub fn cached_file_name(url: &Url) -> Result<&str, BuildError> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| BuildError::InvalidUrl {
            url: url.clone(),
            reason: "no file name in URL path".to_string(),
        })
}
