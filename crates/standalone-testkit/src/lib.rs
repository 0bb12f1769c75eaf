//! Test utilities for the standalone builder
//!
//! This crate provides shared testing utilities used across the workspace.

pub mod fixtures;
pub mod mock;

pub use fixtures::{
    FAKE_PATH_FILE, FAKE_PATH_FILE_CONTENT, FakeRuntime, read_zip_entry, write_zip,
    zip_entry_names,
};
pub use mock::{get_shared_mock_server, mock_url};

use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

/// Static mutex to serialize tests that write and then execute scripts
static EXEC_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that write an executable and then run it
///
/// A child forked by a parallel test can inherit the write handle of a freshly
/// written script, making `exec` fail with ETXTBSY. Hold the guard for the
/// whole test.
pub fn lock_exec() -> MutexGuard<'static, ()> {
    // A failed test leaves nothing to protect
    EXEC_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Creates a temporary directory within `.tmp/` at the crate root
///
/// Keeps test files in one gitignored place that is easy to clean up by hand.
///
/// # Panics
///
/// Panics if the current directory is unavailable or `.tmp/` cannot be created.
///
/// # Examples
///
/// ```rust
/// use standalone_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// let file_path = temp.path().join("test.txt");
/// std::fs::write(&file_path, "test data").unwrap();
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    try_temp_dir_in_workspace().expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for callers that want to handle the error
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let workspace_root = std::env::current_dir()?;
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}
