// Configuration loading and parsing (toolbox.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "toolbox.toml";

/// Database file name used when `[database] path` is not set.
const DEFAULT_DB_FILE: &str = "toolbox.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub draw: DrawConfig,
    pub grouping: GroupingConfig,
    pub export: ExportConfig,
    /// Resolved SQLite path (explicit setting or platform data dir).
    pub db_path: String,
}

// ---------------------------------------------------------------------------
// toolbox.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire toolbox.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ToolboxFile {
    #[serde(default)]
    database: DatabaseSection,
    draw: DrawConfig,
    grouping: GroupingConfig,
    export: ExportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrawConfig {
    /// Animation steps per spin.
    pub ticks: u32,
    pub base_delay_ms: u64,
    /// Added to the delay after every tick.
    pub delay_increment_ms: u64,
    /// Initial state of the repeat-winners toggle.
    #[serde(default)]
    pub allow_repeat: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupingConfig {
    pub default_group_size: usize,
    /// Pause before a grouping is generated. 0 disables it.
    pub generation_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory CSV exports are written to.
    pub dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            draw: DrawConfig {
                ticks: 40,
                base_delay_ms: 50,
                delay_increment_ms: 5,
                allow_repeat: false,
            },
            grouping: GroupingConfig {
                default_group_size: 4,
                generation_delay_ms: 800,
            },
            export: ExportConfig {
                dir: "exports".into(),
            },
            db_path: default_db_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/toolbox.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&config_path)?;
    parse_config(&text, &config_path)
}

/// Parse and validate toolbox.toml content. `path` is only used in errors.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ToolboxFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let db_path = match file.database.path {
        Some(p) if !p.trim().is_empty() => p,
        _ => default_db_path(),
    };

    let config = Config {
        draw: file.draw,
        grouping: file.grouping,
        export: file.export,
        db_path,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// `<platform data dir>/toolbox.db`, or `toolbox.db` in the working
/// directory when no home directory can be determined.
fn default_db_path() -> String {
    directories::ProjectDirs::from("", "", "hr-toolbox")
        .map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.draw.ticks == 0 {
        return Err(ConfigError::ValidationError {
            field: "draw.ticks".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.grouping.default_group_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "grouping.default_group_size".into(),
            message: "must be at least 1".into(),
        });
    }

    if config.export.dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "export.dir".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
