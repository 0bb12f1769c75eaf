use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

use crate::config::consts;
use crate::error::{Result, StandaloneError};

/// standalone.toml schema
///
/// Every table and field is optional; missing values fall back to the pins in
/// [`consts`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BuilderConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub installer: InstallerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_app_version")]
    pub version: String,
    #[serde(default)]
    pub build_number: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
            build_number: consts::app::MANIFEST_BUILD_NUMBER,
        }
    }
}

fn default_app_name() -> String {
    consts::app::NAME.to_string()
}

fn default_app_version() -> String {
    consts::app::VERSION.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeConfig {
    #[serde(default = "default_runtime_version")]
    pub version: String,
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default = "default_variants")]
    pub variants: Vec<String>,
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: default_runtime_version(),
            url_template: default_url_template(),
            variants: default_variants(),
            interpreter: default_interpreter(),
        }
    }
}

fn default_runtime_version() -> String {
    consts::runtime::VERSION.to_string()
}

fn default_url_template() -> String {
    consts::runtime::URL_TEMPLATE.to_string()
}

fn default_variants() -> Vec<String> {
    consts::runtime::VARIANTS
        .iter()
        .map(|v| v.to_string())
        .collect()
}

fn default_interpreter() -> String {
    consts::runtime::INTERPRETER.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerConfig {
    #[serde(default = "default_bootstrap_url")]
    pub bootstrap_url: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            bootstrap_url: default_bootstrap_url(),
        }
    }
}

fn default_bootstrap_url() -> String {
    consts::installer::BOOTSTRAP_URL.to_string()
}

/// One catalog entry: a platform variant and its runtime download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub url: Url,
}

impl BuilderConfig {
    /// Reads and validates a standalone.toml
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| StandaloneError::ConfigReadError {
                path: path.to_path_buf(),
                source: e,
            })?;

        let config: Self = toml::from_str(&content).map_err(|e| StandaloneError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise looks in the working directory
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load_from_dir(&std::env::current_dir()?),
        }
    }

    /// Loads `dir/standalone.toml` if present, otherwise the pinned defaults
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let candidate = dir.join(consts::paths::CONFIG_FILE);
        if candidate.is_file() {
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("app.name", &self.app.name)?;
        require_non_empty("app.version", &self.app.version)?;
        // Name and version end up in build directory and archive names
        require_name_component("app.name", &self.app.name)?;
        require_name_component("app.version", &self.app.version)?;
        require_non_empty("runtime.version", &self.runtime.version)?;
        require_non_empty("runtime.interpreter", &self.runtime.interpreter)?;

        if !self.runtime.url_template.contains("{variant}") {
            return Err(invalid(
                "runtime.url_template",
                "template must contain a {variant} placeholder",
            ));
        }

        if self.runtime.variants.is_empty() {
            return Err(invalid("runtime.variants", "at least one variant is required"));
        }

        let mut seen = HashSet::new();
        for variant in &self.runtime.variants {
            require_non_empty("runtime.variants", variant)?;
            require_name_component("runtime.variants", variant)?;
            if !seen.insert(variant.as_str()) {
                return Err(invalid(
                    "runtime.variants",
                    &format!("'{}' is listed more than once", variant),
                ));
            }
        }

        self.bootstrap_url()?;
        Ok(())
    }

    /// Builds the variant catalog, in declaration order
    pub fn catalog(&self) -> Result<Vec<Variant>> {
        self.runtime
            .variants
            .iter()
            .map(|name| {
                let raw = self.runtime.download_url(name);
                let url = Url::parse(&raw).map_err(|e| {
                    invalid("runtime.url_template", &format!("'{}': {}", raw, e))
                })?;
                Ok(Variant {
                    name: name.clone(),
                    url,
                })
            })
            .collect()
    }

    /// Catalog entries named in `names`, kept in catalog order.
    ///
    /// An empty selection means the whole catalog.
    pub fn select_variants(&self, names: &[String]) -> Result<Vec<Variant>> {
        let catalog = self.catalog()?;
        if names.is_empty() {
            return Ok(catalog);
        }

        if let Some(unknown) = names
            .iter()
            .find(|name| !catalog.iter().any(|v| &v.name == *name))
        {
            return Err(StandaloneError::VariantUnknown {
                name: unknown.clone(),
                known: self.runtime.variants.join(", "),
            });
        }

        Ok(catalog
            .into_iter()
            .filter(|v| names.contains(&v.name))
            .collect())
    }

    pub fn bootstrap_url(&self) -> Result<Url> {
        Url::parse(&self.installer.bootstrap_url).map_err(|e| {
            invalid(
                "installer.bootstrap_url",
                &format!("'{}': {}", self.installer.bootstrap_url, e),
            )
        })
    }
}

impl RuntimeConfig {
    /// Expands the URL template for one variant
    pub fn download_url(&self, variant: &str) -> String {
        self.url_template
            .replace("{version}", &self.version)
            .replace("{variant}", variant)
    }
}

impl AppConfig {
    /// Name shared by a variant's build directory and its archive
    ///
    /// `{name}-standalone-{variant}-{version}`, with `-{build_number}` appended
    /// unless the build number is zero.
    pub fn dist_name(&self, variant: &str) -> String {
        let mut name = format!(
            "{}-{}-{}-{}",
            self.name,
            consts::app::DIST_INFIX,
            variant,
            self.version
        );
        if self.build_number != 0 {
            name.push_str(&format!("-{}", self.build_number));
        }
        name
    }

    /// Requirement specifier handed to the package installer
    pub fn requirement(&self) -> String {
        format!("{}=={}", self.name, self.version)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(())
}

/// Rejects values that could steer a joined path out of its parent
fn require_name_component(field: &str, value: &str) -> Result<()> {
    if value.contains(['/', '\\']) {
        return Err(invalid(
            field,
            &format!("'{}' contains a path separator", value),
        ));
    }
    if value.contains("..") {
        return Err(invalid(field, &format!("'{}' contains '..'", value)));
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> StandaloneError {
    StandaloneError::ConfigInvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pins() {
        let config = BuilderConfig::default();
        assert_eq!(config.app.name, "datasette");
        assert_eq!(config.app.version, "0.48");
        assert_eq!(config.app.build_number, 0);
        assert_eq!(config.runtime.version, "3.8.5");
        assert_eq!(config.runtime.variants, vec!["amd64", "win32"]);
        assert_eq!(config.runtime.interpreter, "python.exe");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: BuilderConfig = toml::from_str("").unwrap();
        assert_eq!(config, BuilderConfig::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[app]
name = "widget"
version = "1.2"
build_number = 3

[runtime]
variants = ["amd64"]
"#;
        let config: BuilderConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.app.name, "widget");
        assert_eq!(config.app.build_number, 3);
        assert_eq!(config.runtime.variants, vec!["amd64"]);
        assert_eq!(config.runtime.version, "3.8.5");
        assert_eq!(config.installer.bootstrap_url, consts::installer::BOOTSTRAP_URL);
    }

    #[test]
    fn test_default_catalog_urls() {
        let catalog = BuilderConfig::default().catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].name, "amd64");
        assert_eq!(
            catalog[0].url.as_str(),
            "https://www.python.org/ftp/python/3.8.5/python-3.8.5-embed-amd64.zip"
        );
        assert_eq!(catalog[1].name, "win32");
        assert_eq!(
            catalog[1].url.as_str(),
            "https://www.python.org/ftp/python/3.8.5/python-3.8.5-embed-win32.zip"
        );
    }

    #[test]
    fn test_dist_name_without_build_number() {
        let app = AppConfig {
            name: "widget".to_string(),
            version: "1.2".to_string(),
            build_number: 0,
        };
        assert_eq!(app.dist_name("amd64"), "widget-standalone-amd64-1.2");
    }

    #[test]
    fn test_dist_name_with_build_number() {
        let app = AppConfig {
            name: "widget".to_string(),
            version: "1.2".to_string(),
            build_number: 2,
        };
        assert_eq!(app.dist_name("win32"), "widget-standalone-win32-1.2-2");
    }

    #[test]
    fn test_dist_name_distinct_across_variants_and_builds() {
        let mut names = HashSet::new();
        for build_number in 0..4 {
            let app = AppConfig {
                name: "widget".to_string(),
                version: "1.2".to_string(),
                build_number,
            };
            for variant in ["amd64", "win32", "arm64"] {
                assert!(
                    names.insert(app.dist_name(variant)),
                    "duplicate dist name for {} / {}",
                    variant,
                    build_number
                );
            }
        }
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_requirement() {
        let app = AppConfig {
            name: "widget".to_string(),
            version: "1.2".to_string(),
            build_number: 0,
        };
        assert_eq!(app.requirement(), "widget==1.2");
    }

    #[test]
    fn test_select_variants_keeps_catalog_order() {
        let config = BuilderConfig::default();
        let selected = config
            .select_variants(&["win32".to_string(), "amd64".to_string()])
            .unwrap();
        let names: Vec<_> = selected.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["amd64", "win32"]);
    }

    #[test]
    fn test_select_variants_empty_means_all() {
        let config = BuilderConfig::default();
        assert_eq!(config.select_variants(&[]).unwrap().len(), 2);
    }

    #[test]
    fn test_select_unknown_variant() {
        let config = BuilderConfig::default();
        let err = config.select_variants(&["arm64".to_string()]).unwrap_err();
        match err {
            StandaloneError::VariantUnknown { name, known } => {
                assert_eq!(name, "arm64");
                assert_eq!(known, "amd64, win32");
            }
            other => panic!("Expected VariantUnknown, got: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_variants() {
        let mut config = BuilderConfig::default();
        config.runtime.variants = vec!["amd64".to_string(), "amd64".to_string()];
        assert!(matches!(
            config.validate(),
            Err(StandaloneError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_template_without_variant() {
        let mut config = BuilderConfig::default();
        config.runtime.url_template = "https://example.com/python.zip".to_string();
        assert!(matches!(
            config.validate(),
            Err(StandaloneError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_variants() {
        let mut config = BuilderConfig::default();
        config.runtime.variants.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_app_name() {
        let mut config = BuilderConfig::default();
        config.app.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bootstrap_url() {
        let mut config = BuilderConfig::default();
        config.installer.bootstrap_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    fn assert_rejected(config: &BuilderConfig, field: &str) {
        match config.validate() {
            Err(StandaloneError::ConfigInvalidValue { field: f, .. }) => assert_eq!(f, field),
            other => panic!("Expected ConfigInvalidValue for {}, got: {:?}", field, other),
        }
    }

    #[test]
    fn test_validate_rejects_app_name_with_separator() {
        let mut config = BuilderConfig::default();
        config.app.name = "../victim".to_string();
        assert_rejected(&config, "app.name");

        config.app.name = "sub\\dir".to_string();
        assert_rejected(&config, "app.name");
    }

    #[test]
    fn test_validate_rejects_app_name_parent_reference() {
        let mut config = BuilderConfig::default();
        config.app.name = "..".to_string();
        assert_rejected(&config, "app.name");
    }

    #[test]
    fn test_validate_rejects_app_version_with_separator() {
        let mut config = BuilderConfig::default();
        config.app.version = "1.0/../../x".to_string();
        assert_rejected(&config, "app.version");
    }

    #[test]
    fn test_validate_rejects_app_version_parent_reference() {
        let mut config = BuilderConfig::default();
        config.app.version = "..".to_string();
        assert_rejected(&config, "app.version");
    }

    #[test]
    fn test_validate_rejects_variant_with_separator() {
        let mut config = BuilderConfig::default();
        config.runtime.variants = vec!["amd64".to_string(), "../win32".to_string()];
        assert_rejected(&config, "runtime.variants");
    }

    #[test]
    fn test_validated_names_stay_inside_build_root() {
        let config = BuilderConfig::default();
        config.validate().unwrap();

        let root = Path::new("/srv/build");
        for variant in &config.runtime.variants {
            let dir = root.join(config.app.dist_name(variant));
            assert_eq!(dir.parent(), Some(root));
        }
    }
}
