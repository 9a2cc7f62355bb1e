//! Configuration management for archview.
//!
//! Parses `archview.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [generation]
//! max_depth = 32
//! format = "md"
//!
//! [diagrams]
//! palette = ["lightblue", "lightcoral", "lightsalmon"]
//!
//! [output]
//! path = "views/${VIEW_NAME:-model}.md"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `diagrams.palette` (each entry)
//! - `output.path`

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "archview.toml";

/// Default limit on nested sub-views.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Upper bound accepted for `generation.max_depth`.
const MAX_MAX_DEPTH: usize = 1024;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override maximum sub-view nesting.
    pub max_depth: Option<usize>,
    /// Override output format.
    pub format: Option<OutputFormat>,
    /// Override output file.
    pub output: Option<PathBuf>,
}

/// Document output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum OutputFormat {
    /// Markdown, as produced by the blueprints.
    #[default]
    #[serde(rename = "md")]
    Markdown,
    /// Markdown converted to an HTML fragment.
    #[serde(rename = "html")]
    Html,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => f.write_str("md"),
            Self::Html => f.write_str("html"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// View generation settings.
    pub generation: GenerationConfig,
    /// Diagram settings.
    pub diagrams: DiagramsConfig,
    /// Output configuration (path is a relative string from TOML).
    output: OutputConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// View generation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum number of nested views, root included.
    pub max_depth: usize,
    /// Output format.
    pub format: OutputFormat,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            format: OutputFormat::default(),
        }
    }
}

/// Diagram settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// State colors by nesting depth. `None` keeps the built-in palette.
    pub palette: Option<Vec<String>>,
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutputConfigRaw {
    path: Option<String>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Output file. `None` writes to stdout.
    pub path: Option<PathBuf>,
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
        /// Config field path (e.g., "`output.path`").
        field: String,
        /// Error message (e.g., "${`VIEW_DIR`} not set").
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

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `archview.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The merged result
    /// is validated again.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(max_depth) = settings.max_depth {
            self.generation.max_depth = max_depth;
        }
        if let Some(format) = settings.format {
            self.generation.format = format;
        }
        if let Some(output) = &settings.output {
            self.output_resolved.path = Some(output.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_generation()?;
        self.validate_diagrams()?;
        Ok(())
    }

    fn validate_generation(&self) -> Result<(), ConfigError> {
        let max_depth = self.generation.max_depth;
        if max_depth == 0 {
            return Err(ConfigError::Validation(
                "generation.max_depth must be greater than 0".to_owned(),
            ));
        }
        if max_depth > MAX_MAX_DEPTH {
            return Err(ConfigError::Validation(format!(
                "generation.max_depth cannot exceed {MAX_MAX_DEPTH}"
            )));
        }
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        let Some(palette) = &self.diagrams.palette else {
            return Ok(());
        };
        if palette.is_empty() {
            return Err(ConfigError::Validation(
                "diagrams.palette must contain at least one color".to_owned(),
            ));
        }
        for color in palette {
            require_non_empty(color, "diagrams.palette entry")?;
            if color.chars().any(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "diagrams.palette entry '{color}' cannot contain whitespace"
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut palette) = self.diagrams.palette {
            for color in palette.iter_mut() {
                *color = expand::expand_env(color, "diagrams.palette")?;
            }
        }

        if let Some(ref path) = self.output.path {
            self.output.path = Some(expand::expand_env(path, "output.path")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.output_resolved = OutputConfig {
            path: self.output.path.as_deref().map(|path| config_dir.join(path)),
        };
    }
}
