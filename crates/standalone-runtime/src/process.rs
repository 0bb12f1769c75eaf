//! Foreign-process invocation of the staged interpreter

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::error::BuildError;

/// The interpreter executable inside a build directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    path: PathBuf,
}

impl Interpreter {
    /// `build_dir/{file_name}`; the file is not required to exist yet
    pub fn in_build_dir(build_dir: &Path, file_name: &str) -> Self {
        Self {
            path: build_dir.join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the interpreter to completion with inherited stdio
    ///
    /// `env` is layered over the inherited environment.
    ///
    /// # Errors
    ///
    /// - `ProcessSpawnFailed` if the interpreter cannot be started
    /// - `ProcessFailed` on a non-zero exit status
    pub fn run<I, S>(&self, args: I, env: &[(&str, &str)]) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();
        let display_args = args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        info!(program = %self.path.display(), args = %display_args, "running interpreter");
        debug!(env = ?env, "environment overrides");

        let status = Command::new(&self.path)
            .args(&args)
            .envs(env.iter().copied())
            .status()
            .map_err(|e| BuildError::ProcessSpawnFailed {
                program: self.path.clone(),
                source: e,
            })?;

        if !status.success() {
            return Err(BuildError::ProcessFailed {
                program: self.path.clone(),
                args: display_args,
                status,
            });
        }

        Ok(())
    }
}
