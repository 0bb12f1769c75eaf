//! Runtime download, extraction and startup-path patching
//!
//! Embeddable interpreter distributions ship a `python*._pth` file that pins
//! `sys.path` and leaves `import site` commented out, which keeps
//! `site-packages` off the path. After extraction the file gets an
//! `import site` line appended so installed packages become importable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use standalone_core::config::consts::runtime::{
    PATH_FILE_PREFIX, PATH_FILE_SUFFIX, SITE_DIRECTIVE,
};

use crate::error::BuildError;
use crate::http::Downloader;

/// Downloads (cached) and extracts a runtime into `build_dir`, then enables
/// site initialization
///
/// # Returns
///
/// Path of the patched startup-path file
///
/// # Errors
///
/// - Download and extraction errors are returned unchanged
/// - `RuntimeConfigNotFound` / `RuntimeConfigAmbiguous` unless exactly one
///   `python*._pth` file sits at the root of the extracted runtime
pub fn fetch_runtime(
    downloader: &Downloader,
    url: &Url,
    cache_dir: &Path,
    build_dir: &Path,
) -> Result<PathBuf, BuildError> {
    let archive = downloader.fetch_cached(url, cache_dir)?;
    extract_zip(&archive, build_dir)?;

    let path_file = find_path_file(build_dir)?;
    enable_site_import(&path_file)?;
    Ok(path_file)
}

/// Extracts every entry of a zip archive into `dest_dir`
///
/// Entries whose names would escape `dest_dir` are skipped. Unix permission
/// bits recorded in the archive are restored.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), BuildError> {
    let extraction_failed = |reason: String| BuildError::ExtractionFailed {
        archive: archive_path.to_path_buf(),
        reason,
    };

    let file = fs::File::open(archive_path)
        .map_err(|e| BuildError::io(format!("open archive {}", archive_path.display()), e))?;

    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| extraction_failed(e.to_string()))?;

    info!(
        archive = %archive_path.display(),
        entries = archive.len(),
        "extracting runtime"
    );

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extraction_failed(e.to_string()))?;

        let outpath = match entry.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => {
                debug!(name = entry.name(), "skipping entry outside extraction root");
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| {
                BuildError::io(format!("create directory {}", outpath.display()), e)
            })?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BuildError::io(format!("create parent directory {}", parent.display()), e)
            })?;
        }

        let mut outfile = fs::File::create(&outpath)
            .map_err(|e| BuildError::io(format!("create file {}", outpath.display()), e))?;

        io::copy(&mut entry, &mut outfile).map_err(|e| {
            extraction_failed(format!("{}: {}", outpath.display(), e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).map_err(|e| {
                    BuildError::io(format!("set permissions for {}", outpath.display()), e)
                })?;
            }
        }
    }

    Ok(())
}

/// Finds the single `python*._pth` file directly inside `dir`
pub fn find_path_file(dir: &Path) -> Result<PathBuf, BuildError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| BuildError::io(format!("read directory {}", dir.display()), e))?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| BuildError::io(format!("read directory {}", dir.display()), e))?;

        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && is_path_file_name(&entry.file_name().to_string_lossy()) {
            matches.push(entry.path());
        }
    }

    match matches.len() {
        0 => Err(BuildError::RuntimeConfigNotFound {
            dir: dir.to_path_buf(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(BuildError::RuntimeConfigAmbiguous {
            dir: dir.to_path_buf(),
            count,
        }),
    }
}

fn is_path_file_name(name: &str) -> bool {
    name.len() >= PATH_FILE_PREFIX.len() + PATH_FILE_SUFFIX.len()
        && name.starts_with(PATH_FILE_PREFIX)
        && name.ends_with(PATH_FILE_SUFFIX)
}

/// Appends `import site` to a startup-path file, keeping its content
pub fn enable_site_import(path_file: &Path) -> Result<(), BuildError> {
    let mut content = fs::read_to_string(path_file)
        .map_err(|e| BuildError::io(format!("read {}", path_file.display()), e))?;

    content.push('\n');
    content.push_str(SITE_DIRECTIVE);

    fs::write(path_file, content)
        .map_err(|e| BuildError::io(format!("write {}", path_file.display()), e))?;

    debug!(path = %path_file.display(), "enabled site import");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use standalone_testkit::{
        FAKE_PATH_FILE, FAKE_PATH_FILE_CONTENT, FakeRuntime, temp_dir_in_workspace, write_zip,
    };

    // ============================================================================
    // Extraction Tests
    // ============================================================================

    #[test]
    fn test_extract_zip_nested_entries() {
        let temp = temp_dir_in_workspace();
        let archive = temp.path().join("runtime.zip");
        write_zip(&archive, &[("a.txt", b"a"), ("dir/sub/b.txt", b"b")]);

        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        extract_zip(&archive, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dest.join("dir/sub/b.txt")).unwrap(), "b");
    }

    #[test]
    fn test_extract_zip_skips_escaping_entries() {
        let temp = temp_dir_in_workspace();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("../escape.txt", b"x"), ("ok.txt", b"y")]);

        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        extract_zip(&archive, &dest).unwrap();

        assert!(dest.join("ok.txt").exists());
        assert!(!temp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_extract_corrupted_archive() {
        let temp = temp_dir_in_workspace();
        let archive = temp.path().join("corrupted.zip");
        fs::write(&archive, b"not a real archive").unwrap();

        let result = extract_zip(&archive, temp.path());
        assert!(matches!(result, Err(BuildError::ExtractionFailed { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_extract_zip_restores_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = temp_dir_in_workspace();
        let archive = temp.path().join("runtime.zip");
        FakeRuntime::new().write_to(&archive);

        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        extract_zip(&archive, &dest).unwrap();

        let mode = fs::metadata(dest.join("python.exe"))
            .unwrap()
            .permissions()
            .mode();
        assert_ne!(mode & 0o111, 0, "interpreter should be executable");
    }

    // ============================================================================
    // Startup-path File Tests
    // ============================================================================

    #[test]
    fn test_is_path_file_name() {
        assert!(is_path_file_name("python38._pth"));
        assert!(is_path_file_name("python311._pth"));
        assert!(!is_path_file_name("python38.zip"));
        assert!(!is_path_file_name("sitecustomize._pth"));
        assert!(!is_path_file_name("python._pth.bak"));
    }

    #[test]
    fn test_find_path_file() {
        let temp = temp_dir_in_workspace();
        fs::write(temp.path().join("python38._pth"), "").unwrap();
        fs::write(temp.path().join("python38.zip"), "").unwrap();

        let found = find_path_file(temp.path()).unwrap();
        assert_eq!(found, temp.path().join("python38._pth"));
    }

    #[test]
    fn test_find_path_file_ignores_nested() {
        let temp = temp_dir_in_workspace();
        fs::create_dir(temp.path().join("Lib")).unwrap();
        fs::write(temp.path().join("Lib").join("python38._pth"), "").unwrap();

        let result = find_path_file(temp.path());
        assert!(matches!(
            result,
            Err(BuildError::RuntimeConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_find_path_file_missing() {
        let temp = temp_dir_in_workspace();
        let err = find_path_file(temp.path()).unwrap_err();
        assert!(err.to_string().starts_with("RUNTIME_CONFIG_NOT_FOUND"));
    }

    #[test]
    fn test_find_path_file_ambiguous() {
        let temp = temp_dir_in_workspace();
        fs::write(temp.path().join("python38._pth"), "").unwrap();
        fs::write(temp.path().join("python39._pth"), "").unwrap();

        match find_path_file(temp.path()) {
            Err(BuildError::RuntimeConfigAmbiguous { count, .. }) => assert_eq!(count, 2),
            other => panic!("Expected RuntimeConfigAmbiguous, got: {:?}", other),
        }
    }

    #[test]
    fn test_enable_site_import_appends() {
        let temp = temp_dir_in_workspace();
        let path = temp.path().join("python38._pth");
        fs::write(&path, FAKE_PATH_FILE_CONTENT).unwrap();

        enable_site_import(&path).unwrap();

        let patched = fs::read_to_string(&path).unwrap();
        assert!(patched.starts_with(FAKE_PATH_FILE_CONTENT));
        assert!(patched.len() > FAKE_PATH_FILE_CONTENT.len());
        assert!(patched.ends_with("\nimport site"));
    }

    #[test]
    fn test_enable_site_import_preserves_non_ascii() {
        let temp = temp_dir_in_workspace();
        let path = temp.path().join("python38._pth");
        fs::write(&path, "python38.zip\n# Größe\n").unwrap();

        enable_site_import(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "python38.zip\n# Größe\n\nimport site"
        );
    }

    // ============================================================================
    // End-to-End Tests
    // ============================================================================

    #[test]
    fn test_fetch_runtime_complete_flow() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/python-3.8.5-embed-amd64.zip")
            .with_status(200)
            .with_body(FakeRuntime::new().to_zip_bytes())
            .expect(1)
            .create();

        let cache = temp_dir_in_workspace();
        let build = temp_dir_in_workspace();
        let url = Url::parse(&format!("{}/python-3.8.5-embed-amd64.zip", server.url())).unwrap();
        let downloader = Downloader::new().unwrap();

        let path_file = fetch_runtime(&downloader, &url, cache.path(), build.path()).unwrap();

        mock.assert();
        assert_eq!(path_file, build.path().join(FAKE_PATH_FILE));
        assert!(build.path().join("python.exe").is_file());
        assert!(cache.path().join("python-3.8.5-embed-amd64.zip").is_file());
        assert!(
            fs::read_to_string(&path_file)
                .unwrap()
                .ends_with("import site")
        );
    }

    #[test]
    fn test_fetch_runtime_without_path_file() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/bare.zip")
            .with_status(200)
            .with_body(FakeRuntime::new().without_path_file().to_zip_bytes())
            .create();

        let cache = temp_dir_in_workspace();
        let build = temp_dir_in_workspace();
        let url = Url::parse(&format!("{}/bare.zip", server.url())).unwrap();

        let result = fetch_runtime(&Downloader::new().unwrap(), &url, cache.path(), build.path());
        assert!(matches!(
            result,
            Err(BuildError::RuntimeConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_fetch_runtime_with_two_path_files() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/double.zip")
            .with_status(200)
            .with_body(
                FakeRuntime::new()
                    .with_file("python39._pth", b"python39.zip\r\n.\r\n")
                    .to_zip_bytes(),
            )
            .create();

        let cache = temp_dir_in_workspace();
        let build = temp_dir_in_workspace();
        let url = Url::parse(&format!("{}/double.zip", server.url())).unwrap();

        let result = fetch_runtime(&Downloader::new().unwrap(), &url, cache.path(), build.path());
        match result {
            Err(BuildError::RuntimeConfigAmbiguous { count, .. }) => assert_eq!(count, 2),
            other => panic!("Expected RuntimeConfigAmbiguous, got: {:?}", other),
        }
        // Neither file is patched
        assert_eq!(
            fs::read_to_string(build.path().join(FAKE_PATH_FILE)).unwrap(),
            FAKE_PATH_FILE_CONTENT
        );
    }
}
