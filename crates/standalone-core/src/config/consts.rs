//! Pinned versions and fixed names used by every build

/// The application packaged into each archive
pub mod app {
    pub const NAME: &str = "datasette";

    pub const VERSION: &str = "0.48";

    /// Re-releases manifest fixes without bumping the application version.
    /// `0` leaves the suffix out of archive names.
    pub const MANIFEST_BUILD_NUMBER: u32 = 0;

    /// Infix between the application name and the variant in archive names
    pub const DIST_INFIX: &str = "standalone";
}

/// The portable interpreter distribution
pub mod runtime {
    pub const VERSION: &str = "3.8.5";

    /// `{version}` and `{variant}` are substituted per catalog entry
    pub const URL_TEMPLATE: &str =
        "https://www.python.org/ftp/python/{version}/python-{version}-embed-{variant}.zip";

    pub const VARIANTS: &[&str] = &["amd64", "win32"];

    /// Interpreter executable at the root of the extracted runtime
    pub const INTERPRETER: &str = "python.exe";

    /// Startup-path file shipped by embeddable runtimes (`python38._pth`)
    pub const PATH_FILE_PREFIX: &str = "python";
    pub const PATH_FILE_SUFFIX: &str = "._pth";

    /// Appended to the startup-path file; embeddable runtimes ship with it commented out
    pub const SITE_DIRECTIVE: &str = "import site";
}

/// The package installer and its bootstrap
pub mod installer {
    pub const BOOTSTRAP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";

    /// Layered over the inherited environment for `pip install`
    pub const ENV_OVERRIDES: &[(&str, &str)] = &[
        ("PIP_REQUIRE_VIRTUALENV", "false"),
        ("PIP_DISABLE_PIP_VERSION_CHECK", "true"),
    ];

    /// Package metadata directories left out of archives
    pub const METADATA_DIR_SUFFIX: &str = ".dist-info";
}

/// Filesystem names
pub mod paths {
    pub const CONFIG_FILE: &str = "standalone.toml";
    pub const BUILD_DIR: &str = "build";
    pub const DIST_DIR: &str = "dist";
    pub const ARCHIVE_EXTENSION: &str = "zip";
}
