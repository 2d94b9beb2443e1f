//! Configuration management for Xeo.
//!
//! Parses `xeo.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `content.fallback_url`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override content root directory.
    pub content_dir: Option<PathBuf>,
    /// Override router base path.
    pub base_path: Option<String>,
    /// Override HTTP fallback origin.
    pub fallback_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "xeo.toml";

/// Default site settings document name.
const DEFAULT_SETTINGS_FILE: &str = "xeocontext.config.json";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Viewer behaviour.
    pub viewer: ViewerConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    root: Option<String>,
    settings_file: Option<String>,
    fallback_url: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Directory holding markdown documents and the settings file.
    pub root: PathBuf,
    /// Settings document path, relative to `root`.
    pub settings_file: String,
    /// HTTP origin consulted when a probe misses locally.
    pub fallback_url: Option<String>,
}

/// Viewer behaviour configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// URL prefix documents are mounted under (empty for the site root).
    pub base_path: String,
    /// Delay between anchor lookups while waiting for rendered content.
    pub poll_interval_ms: u64,
    /// Retry budget after the first anchor lookup.
    pub poll_attempts: u32,
    /// Quiet period before a scroll offset is persisted.
    pub scroll_debounce_ms: u64,
    /// Fraction of the viewport height, from the top, that counts as "reading".
    pub spy_band: f64,
    /// Prefix for persisted scroll keys.
    pub scroll_key_prefix: String,
    /// Ignore `#` lines inside fenced code blocks when extracting headings.
    pub skip_code_fences: bool,
    /// Directory for the persisted scroll record. In-memory when unset.
    pub state_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            poll_interval_ms: 100,
            poll_attempts: 20,
            scroll_debounce_ms: 100,
            spy_band: 0.2,
            scroll_key_prefix: "scroll-".to_owned(),
            skip_code_fences: false,
            state_dir: None,
        }
    }
}

impl ViewerConfig {
    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Scroll debounce as a [`Duration`].
    #[must_use]
    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
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
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`XEO_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `xeo.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, and the
    /// result is validated again so overrides cannot smuggle in bad values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
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
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(content_dir) = &settings.content_dir {
            self.content_resolved.root.clone_from(content_dir);
        }
        if let Some(base_path) = &settings.base_path {
            self.viewer.base_path.clone_from(base_path);
        }
        if let Some(fallback_url) = &settings.fallback_url {
            self.content_resolved.fallback_url = Some(fallback_url.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        discover_from(&current)
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            content: ContentConfigRaw::default(),
            viewer: ViewerConfig::default(),
            content_resolved: ContentConfig {
                root: base.join("content"),
                settings_file: DEFAULT_SETTINGS_FILE.to_owned(),
                fallback_url: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_content()?;
        self.validate_viewer()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_content(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.content_resolved.settings_file, "content.settings_file")?;

        if let Some(ref url) = self.content_resolved.fallback_url {
            require_non_empty(url, "content.fallback_url")?;
            require_http_url(url, "content.fallback_url")?;
        }

        Ok(())
    }

    fn validate_viewer(&self) -> Result<(), ConfigError> {
        let viewer = &self.viewer;

        if !viewer.base_path.is_empty() {
            if !viewer.base_path.starts_with('/') {
                return Err(ConfigError::Validation(
                    "viewer.base_path must start with /".to_owned(),
                ));
            }
            if viewer.base_path.ends_with('/') {
                return Err(ConfigError::Validation(
                    "viewer.base_path must not end with /".to_owned(),
                ));
            }
        }

        if viewer.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "viewer.poll_interval_ms must be greater than 0".to_owned(),
            ));
        }
        if viewer.poll_attempts == 0 {
            return Err(ConfigError::Validation(
                "viewer.poll_attempts must be greater than 0".to_owned(),
            ));
        }
        if !(viewer.spy_band > 0.0 && viewer.spy_band <= 1.0) {
            return Err(ConfigError::Validation(
                "viewer.spy_band must be in (0, 1]".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref url) = self.content.fallback_url {
            self.content.fallback_url = Some(expand::expand_env(url, "content.fallback_url")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_resolved = ContentConfig {
            root: config_dir.join(self.content.root.as_deref().unwrap_or("content")),
            settings_file: self
                .content
                .settings_file
                .clone()
                .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_owned()),
            fallback_url: self.content.fallback_url.clone(),
        };

        if let Some(ref dir) = self.viewer.state_dir {
            self.viewer.state_dir = Some(config_dir.join(dir));
        }
    }
}

/// Walk from `start` up to the filesystem root looking for `xeo.toml`.
fn discover_from(start: &Path) -> Option<PathBuf> {
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
