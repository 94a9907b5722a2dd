//! Configuration management for tagkit.
//!
//! Parses `tagkit.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `partials.root` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tagkit.toml";

/// Largest accepted `partials.max_depth`.
pub const MAX_PARTIAL_DEPTH_LIMIT: usize = 64;

/// Valid attribute and tag names for directives.
static DIRECTIVE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("valid regex"));

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override partials root directory.
    pub partials_root: Option<PathBuf>,
    /// Override maximum partial nesting depth.
    pub max_depth: Option<usize>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directive names.
    pub directives: DirectivesConfig,
    /// Partial lookup configuration (root as a relative string from TOML).
    partials: PartialsConfigRaw,

    /// Resolved partials configuration (set after loading).
    #[serde(skip)]
    pub partials_resolved: PartialsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Attribute and tag names recognized as directives.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DirectivesConfig {
    /// Attribute that hides an element when false.
    pub condition_attribute: String,
    /// Tag rendering its children only when `is` is true.
    pub if_tag: String,
    /// Tag including a partial.
    pub partial_tag: String,
    /// Tag including a partial only when `when` is true.
    pub conditional_partial_tag: String,
}

impl Default for DirectivesConfig {
    fn default() -> Self {
        Self {
            condition_attribute: "condition".to_owned(),
            if_tag: "if".to_owned(),
            partial_tag: "partial".to_owned(),
            conditional_partial_tag: "partial-c".to_owned(),
        }
    }
}

/// Raw partials configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PartialsConfigRaw {
    root: Option<String>,
    extension: Option<String>,
    max_depth: Option<usize>,
}

/// Resolved partials configuration with an absolute root.
#[derive(Debug, PartialEq, Eq)]
pub struct PartialsConfig {
    /// Directory partial names are resolved against.
    pub root: PathBuf,
    /// Extension appended to partial names without one.
    pub extension: String,
    /// Maximum partial nesting depth.
    pub max_depth: usize,
}

impl Default for PartialsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("views"),
            extension: "html".to_owned(),
            max_depth: 10,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`partials.root`").
        field: String,
        /// Error message (e.g., "${`VIEWS_DIR`} not set").
        message: String,
    },
}

/// Require a directive name to be a lowercase markup name.
fn require_directive_name(value: &str, field: &str) -> Result<(), ConfigError> {
    if !DIRECTIVE_NAME_RE.is_match(value) {
        return Err(ConfigError::Validation(format!(
            "{field} must match [a-z][a-z0-9-]*, got '{value}'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `tagkit.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.partials_root {
            self.partials_resolved.root.clone_from(root);
        }
        if let Some(max_depth) = settings.max_depth {
            self.partials_resolved.max_depth = max_depth;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let defaults = PartialsConfig::default();
        Self {
            directives: DirectivesConfig::default(),
            partials: PartialsConfigRaw::default(),
            partials_resolved: PartialsConfig {
                root: base.join(&defaults.root),
                ..defaults
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after applying CLI
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_directives()?;
        self.validate_partials()?;
        Ok(())
    }

    /// Validate directive names.
    fn validate_directives(&self) -> Result<(), ConfigError> {
        let d = &self.directives;
        let tags = [
            ("directives.if_tag", d.if_tag.as_str()),
            ("directives.partial_tag", d.partial_tag.as_str()),
            (
                "directives.conditional_partial_tag",
                d.conditional_partial_tag.as_str(),
            ),
        ];

        require_directive_name(&d.condition_attribute, "directives.condition_attribute")?;
        for (field, name) in tags {
            require_directive_name(name, field)?;
        }

        for (i, (field, name)) in tags.iter().enumerate() {
            if let Some((other, _)) = tags[i + 1..].iter().find(|(_, n)| n == name) {
                return Err(ConfigError::Validation(format!(
                    "{field} and {other} cannot both be '{name}'"
                )));
            }
        }

        Ok(())
    }

    /// Validate partials configuration.
    fn validate_partials(&self) -> Result<(), ConfigError> {
        let partials = &self.partials_resolved;

        if partials.extension.is_empty() {
            return Err(ConfigError::Validation(
                "partials.extension cannot be empty".to_owned(),
            ));
        }
        if partials.max_depth == 0 || partials.max_depth > MAX_PARTIAL_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "partials.max_depth must be between 1 and {MAX_PARTIAL_DEPTH_LIMIT}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref root) = self.partials.root {
            self.partials.root = Some(expand::expand_env(root, "partials.root")?);
        }
        Ok(())
    }

    /// Resolve the partials root against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = PartialsConfig::default();
        let root = self
            .partials
            .root
            .as_deref()
            .map_or(defaults.root, PathBuf::from);

        self.partials_resolved = PartialsConfig {
            root: config_dir.join(root),
            extension: self
                .partials
                .extension
                .clone()
                .unwrap_or(defaults.extension)
                .trim_start_matches('.')
                .to_owned(),
            max_depth: self.partials.max_depth.unwrap_or(defaults.max_depth),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/site"));
        assert_eq!(config.directives, DirectivesConfig::default());
        assert_eq!(config.directives.conditional_partial_tag, "partial-c");
        assert_eq!(
            config.partials_resolved.root,
            PathBuf::from("/site/views")
        );
        assert_eq!(config.partials_resolved.extension, "html");
        assert_eq!(config.partials_resolved.max_depth, 10);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.directives.condition_attribute, "condition");
        assert_eq!(config.directives.if_tag, "if");
    }

    #[test]
    fn test_parse_directives() {
        let toml = r#"
[directives]
condition_attribute = "visible-if"
if_tag = "when"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.directives.condition_attribute, "visible-if");
        assert_eq!(config.directives.if_tag, "when");
        assert_eq!(config.directives.partial_tag, "partial");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[partials]
root = "templates/shared"
extension = ".xhtml"
max_depth = 4
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.partials_resolved,
            PartialsConfig {
                root: PathBuf::from("/project/templates/shared"),
                extension: "xhtml".to_owned(),
                max_depth: 4,
            }
        );
    }

    #[test]
    fn test_resolve_paths_absolute_root() {
        let toml = r#"
[partials]
root = "/srv/views"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.partials_resolved.root, PathBuf::from("/srv/views"));
    }

    #[test]
    fn test_expand_env_vars_partials_root() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TAGKIT_TEST_ROOT", "/opt/site");
        }

        let toml = r#"
[partials]
root = "${TAGKIT_TEST_ROOT}/views"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.partials_resolved.root,
            PathBuf::from("/opt/site/views")
        );

        unsafe {
            std::env::remove_var("TAGKIT_TEST_ROOT");
        }
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/site"));
        let overrides = CliSettings {
            partials_root: Some(PathBuf::from("/custom/views")),
            max_depth: Some(3),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.partials_resolved.root,
            PathBuf::from("/custom/views")
        );
        assert_eq!(config.partials_resolved.max_depth, 3);
        assert_eq!(config.partials_resolved.extension, "html"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.partials_resolved.root, PathBuf::from("/site/views"));
        assert_eq!(config.partials_resolved.max_depth, 10);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagkit.toml");
        std::fs::write(
            &path,
            "[partials]\nroot = \"shared\"\nmax_depth = 5\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.partials_resolved.root, dir.path().join("shared"));
        assert_eq!(config.partials_resolved.max_depth, 5);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/tagkit.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagkit.toml");
        std::fs::write(&path, "[partials\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_cli_override_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagkit.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            max_depth: Some(0),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(err.to_string().contains("partials.max_depth"));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_config(&nested),
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(msg.contains(s), "Expected error to contain '{s}', got: {msg}");
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/site"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_directive_name_format() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.directives.condition_attribute = "Show If".to_owned();
        assert_validation_error(&config, &["directives.condition_attribute", "Show If"]);
    }

    #[test]
    fn test_validate_directive_name_empty() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.directives.partial_tag = String::new();
        assert_validation_error(&config, &["directives.partial_tag"]);
    }

    #[test]
    fn test_validate_duplicate_tags() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.directives.conditional_partial_tag = "partial".to_owned();
        assert_validation_error(
            &config,
            &["directives.partial_tag", "directives.conditional_partial_tag"],
        );
    }

    #[test]
    fn test_validate_condition_attribute_may_equal_tag_name() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.directives.condition_attribute = "if".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_depth_bounds() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.partials_resolved.max_depth = 0;
        assert_validation_error(&config, &["partials.max_depth"]);

        config.partials_resolved.max_depth = MAX_PARTIAL_DEPTH_LIMIT + 1;
        assert_validation_error(&config, &["partials.max_depth"]);

        config.partials_resolved.max_depth = MAX_PARTIAL_DEPTH_LIMIT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_extension_empty() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.partials_resolved.extension = String::new();
        assert_validation_error(&config, &["partials.extension"]);
    }
}
