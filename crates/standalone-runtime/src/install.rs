//! Application install through the bootstrapped package manager

use tracing::info;

use standalone_core::config::AppConfig;
use standalone_core::config::consts::installer::ENV_OVERRIDES;

use crate::error::BuildError;
use crate::process::Interpreter;

/// Installs the application's pinned requirement into the staged runtime
///
/// Runs `{interpreter} -m pip install {name}=={version}` with virtualenv
/// enforcement and the pip version check switched off.
pub fn install_application(interpreter: &Interpreter, app: &AppConfig) -> Result<(), BuildError> {
    let requirement = app.requirement();
    info!(requirement = %requirement, "installing application");

    interpreter.run(install_args(&requirement), ENV_OVERRIDES)
}

fn install_args(requirement: &str) -> [&str; 4] {
    ["-m", "pip", "install", requirement]
}
