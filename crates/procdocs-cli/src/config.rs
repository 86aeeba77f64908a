//! # Configuration
//!
//! Layered settings for the CLI. Later layers override earlier ones:
//!
//! 1. built-in defaults (`schema_paths = ["./document_schemas"]`),
//! 2. the global file `~/.config/procdocs/config.json`,
//! 3. the project file `./procdocs.json`, or the `--config` path,
//! 4. environment variables:
//!    - `PROCDOCS_SCHEMA_PATHS` (OS path-list separator)
//!    - `PROCDOCS_DEFAULT_SCHEMA`
//!    - `PROCDOCS_LOG_LEVEL`
//!
//! Files are JSON objects merged key by key; nested objects merge
//! recursively. A missing file is skipped, a malformed one is an error.
//!
//! ```json
//! {
//!   "schema_paths": ["./document_schemas", "/srv/shared/schemas"],
//!   "default_schema": "maintenance",
//!   "logging": { "level": "debug" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Project-level config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "procdocs.json";

pub const ENV_SCHEMA_PATHS: &str = "PROCDOCS_SCHEMA_PATHS";
pub const ENV_DEFAULT_SCHEMA: &str = "PROCDOCS_DEFAULT_SCHEMA";
pub const ENV_LOG_LEVEL: &str = "PROCDOCS_LOG_LEVEL";

/// Resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directories scanned for `*.json` schema definitions.
    pub schema_paths: Vec<PathBuf>,
    /// Schema used by commands that take an optional schema name.
    pub default_schema: Option<String>,
    /// Tracing filter directive that replaces the `-v` derived one.
    pub log_level: Option<String>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config file '{}': {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config file '{}' must contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },
    #[error("explicit config file '{}' does not exist", path.display())]
    ExplicitMissing { path: PathBuf },
}

/// Shape of the merged JSON tree.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    schema_paths: Vec<PathBuf>,
    #[serde(default)]
    default_schema: Option<String>,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Deserialize, Default)]
struct RawLogging {
    #[serde(default)]
    level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_paths: vec![PathBuf::from("./document_schemas")],
            default_schema: None,
            log_level: None,
        }
    }
}

impl Config {
    /// Load from the standard locations and the process environment.
    ///
    /// An explicit `--config` path replaces the project file and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::ExplicitMissing {
                    path: path.to_path_buf(),
                });
            }
        }
        let global = global_config_path();
        let project = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
        Self::layered(global.as_deref(), &project, |key| std::env::var(key).ok())
    }

    /// Merge defaults, the two files, and the variables returned by `env`.
    pub fn layered<F>(global: Option<&Path>, project: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut tree = Self::default().to_value();
        for path in global.into_iter().chain(std::iter::once(project)) {
            if let Some(layer) = read_layer(path)? {
                tracing::debug!(path = %path.display(), "applying config file");
                merge_json(&mut tree, layer);
            }
        }

        let raw: RawConfig =
            serde_json::from_value(tree).map_err(|source| ConfigError::Malformed {
                path: project.to_path_buf(),
                source,
            })?;
        let mut config = Self {
            schema_paths: raw.schema_paths,
            default_schema: raw.default_schema.filter(|s| !s.trim().is_empty()),
            log_level: raw.logging.level.filter(|s| !s.trim().is_empty()),
        };
        config.apply_env(env);
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(paths) = env(ENV_SCHEMA_PATHS).filter(|v| !v.is_empty()) {
            self.schema_paths = std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(name) = env(ENV_DEFAULT_SCHEMA).filter(|v| !v.is_empty()) {
            self.default_schema = Some(name);
        }
        if let Some(level) = env(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.log_level = Some(level);
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "schema_paths": self.schema_paths,
            "default_schema": self.default_schema,
            "logging": { "level": self.log_level },
        })
    }
}

/// `~/.config/procdocs/config.json`, if a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("procdocs").join("config.json"))
}

fn read_layer(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    if !value.is_object() {
        return Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        });
    }
    Ok(Some(value))
}

/// Merge `overlay` into `base`. Objects merge recursively; anything else
/// in the overlay replaces the base value.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => merge_maps(base, overlay),
        (base, overlay) => *base = overlay,
    }
}

fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) if existing.is_object() && value.is_object() => {
                merge_json(existing, value);
            }
            _ => {
                base.insert(key, value);
            }
        }
    }
}
