//! Shared mockito server
//!
//! One server serves every test in a binary. Tests must mock unique paths
//! (for example `/{test_name}/get-pip.py`) so their expectations never overlap.

use lazy_static::lazy_static;
use mockito::{Server, ServerGuard};
use std::sync::Mutex;

lazy_static! {
    /// Global shared mockito server, started on first access
    pub static ref SHARED_MOCK_SERVER: Mutex<ServerGuard> = Mutex::new(Server::new());
}

/// Locks the shared mock server
///
/// Hold the guard only while creating mocks; mocks stay registered after the
/// guard is released and are removed when the `Mock` drops.
///
/// ```no_run
/// use standalone_testkit::get_shared_mock_server;
///
/// let mock = {
///     let mut server = get_shared_mock_server();
///     server.mock("GET", "/unique-path/get-pip.py")
///         .with_status(200)
///         .create()
/// };
/// ```
pub fn get_shared_mock_server() -> std::sync::MutexGuard<'static, ServerGuard> {
    // A panicking test leaves the server usable
    SHARED_MOCK_SERVER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Absolute URL for `path` on the shared server
pub fn mock_url(path: &str) -> String {
    let server = get_shared_mock_server();
    format!("{}{}", server.url(), path)
}
