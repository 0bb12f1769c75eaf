//! Package-installer bootstrap

use std::path::Path;
use tracing::info;
use url::Url;

use crate::error::BuildError;
use crate::http::Downloader;
use crate::process::Interpreter;

/// Downloads (cached) the bootstrap script and runs it with the staged
/// interpreter, installing the package manager into that runtime
pub fn bootstrap_installer(
    downloader: &Downloader,
    bootstrap_url: &Url,
    cache_dir: &Path,
    interpreter: &Interpreter,
) -> Result<(), BuildError> {
    let script = downloader.fetch_cached(bootstrap_url, cache_dir)?;

    info!(script = %script.display(), "bootstrapping package installer");
    interpreter.run([script.as_os_str()], &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use standalone_testkit::temp_dir_in_workspace;

    #[test]
    #[cfg(unix)]
    fn test_bootstrap_runs_script_with_interpreter() {
        use std::os::unix::fs::PermissionsExt;

        let _exec = standalone_testkit::lock_exec();

        let mut server = Server::new();
        let mock = server
            .mock("GET", "/get-pip.py")
            .with_status(200)
            .with_body("bootstrap script")
            .expect(1)
            .create();

        let cache = temp_dir_in_workspace();
        let build = temp_dir_in_workspace();

        // Succeeds only when handed the cached script
        let script = format!(
            "#!/bin/sh\n[ \"$1\" = \"{}\" ] && grep -q 'bootstrap script' \"$1\"\n",
            cache.path().join("get-pip.py").display()
        );
        let path = build.path().join("python.exe");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let url = Url::parse(&format!("{}/get-pip.py", server.url())).unwrap();
        let interpreter = Interpreter::in_build_dir(build.path(), "python.exe");
        let downloader = Downloader::new().unwrap();

        bootstrap_installer(&downloader, &url, cache.path(), &interpreter).unwrap();
        // Second run reuses the cached script
        bootstrap_installer(&downloader, &url, cache.path(), &interpreter).unwrap();

        mock.assert();
    }

    #[test]
    fn test_bootstrap_download_failure_skips_interpreter() {
        let mut server = Server::new();
        let _mock = server.mock("GET", "/get-pip.py").with_status(500).create();

        let cache = temp_dir_in_workspace();
        let build = temp_dir_in_workspace();
        let url = Url::parse(&format!("{}/get-pip.py", server.url())).unwrap();
        let interpreter = Interpreter::in_build_dir(build.path(), "python.exe");

        let result =
            bootstrap_installer(&Downloader::new().unwrap(), &url, cache.path(), &interpreter);
        assert!(matches!(result, Err(BuildError::DownloadFailed { .. })));
    }
}
