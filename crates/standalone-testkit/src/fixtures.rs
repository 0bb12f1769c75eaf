//! Archive fixtures
//!
//! [`FakeRuntime`] builds a zip shaped like an embeddable interpreter
//! distribution. Its `python.exe` is a POSIX shell script that imitates the
//! two calls the builder makes:
//!
//! - `python.exe get-pip.py` installs a `pip` package into `Lib/site-packages`
//! - `python.exe -m pip install NAME==VERSION` installs `NAME` plus a
//!   `NAME-VERSION.dist-info` directory, after checking that pip is present and
//!   that the installer environment overrides are set

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Startup-path file shipped in the fake runtime
pub const FAKE_PATH_FILE: &str = "python38._pth";

/// Content of [`FAKE_PATH_FILE`], as shipped by CPython 3.8 embeddable zips
pub const FAKE_PATH_FILE_CONTENT: &str =
    "python38.zip\r\n.\r\n\r\n# Uncomment to run site.main() automatically\r\n#import site\r\n";

/// Interpreter stand-in used by [`FakeRuntime::new`]
pub const FAKE_INTERPRETER_SCRIPT: &str = r#"#!/bin/sh
set -e
here="$(cd "$(dirname "$0")" && pwd)"
site="$here/Lib/site-packages"

if [ "$1" = "-m" ]; then
    [ "$2" = "pip" ] || exit 10
    [ "$3" = "install" ] || exit 11
    [ "$PIP_REQUIRE_VIRTUALENV" = "false" ] || exit 12
    [ "$PIP_DISABLE_PIP_VERSION_CHECK" = "true" ] || exit 13
    [ -f "$site/pip/__init__.py" ] || exit 14
    name="${4%%==*}"
    version="${4##*==}"
    mkdir -p "$site/$name" "$site/$name-$version.dist-info"
    echo "__version__ = '$version'" > "$site/$name/__init__.py"
    echo "Name: $name" > "$site/$name-$version.dist-info/METADATA"
    exit 0
fi

[ -f "$1" ] || exit 20
mkdir -p "$site/pip" "$site/pip-20.2.dist-info"
echo "" > "$site/pip/__init__.py"
echo "Name: pip" > "$site/pip-20.2.dist-info/METADATA"
"#;

struct Entry {
    name: String,
    content: Vec<u8>,
    mode: u32,
}

/// Builder for an embeddable-runtime lookalike zip
pub struct FakeRuntime {
    entries: Vec<Entry>,
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self {
            entries: vec![
                Entry {
                    name: "python.exe".to_string(),
                    content: FAKE_INTERPRETER_SCRIPT.as_bytes().to_vec(),
                    mode: 0o755,
                },
                Entry {
                    name: FAKE_PATH_FILE.to_string(),
                    content: FAKE_PATH_FILE_CONTENT.as_bytes().to_vec(),
                    mode: 0o644,
                },
                Entry {
                    name: "python38.zip".to_string(),
                    content: b"stdlib placeholder".to_vec(),
                    mode: 0o644,
                },
                Entry {
                    name: "LICENSE.txt".to_string(),
                    content: b"license placeholder".to_vec(),
                    mode: 0o644,
                },
            ],
        }
    }

    /// Drops the startup-path file
    pub fn without_path_file(mut self) -> Self {
        self.entries.retain(|e| e.name != FAKE_PATH_FILE);
        self
    }

    /// Adds (or replaces) a regular file
    pub fn with_file(mut self, name: &str, content: &[u8]) -> Self {
        self.entries.retain(|e| e.name != name);
        self.entries.push(Entry {
            name: name.to_string(),
            content: content.to_vec(),
            mode: 0o644,
        });
        self
    }

    /// Replaces the interpreter script
    pub fn with_interpreter_script(mut self, script: &str) -> Self {
        self.entries.retain(|e| e.name != "python.exe");
        self.entries.push(Entry {
            name: "python.exe".to_string(),
            content: script.as_bytes().to_vec(),
            mode: 0o755,
        });
        self
    }

    pub fn to_zip_bytes(&self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored)
                .unix_permissions(entry.mode);
            zip.start_file(entry.name.as_str(), options).unwrap();
            zip.write_all(&entry.content).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn write_to(&self, path: &Path) {
        fs::write(path, self.to_zip_bytes()).unwrap();
    }
}

/// Writes a zip with the given `(name, content)` entries
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
}

/// Entry names of a zip, in archive order
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    archive.file_names().map(str::to_string).collect::<Vec<_>>()
}

/// Reads a single entry from a zip
pub fn read_zip_entry(path: &Path, name: &str) -> Vec<u8> {
    let file = fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive
        .by_name(name)
        .unwrap_or_else(|e| panic!("entry {} missing from {}: {}", name, path.display(), e));
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    content
}
