//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/formtree/formtree.toml` (or `--config`)
//! 3. Environment variables: `FORMTREE_*` prefix, `__` for nesting

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::identity::DEFAULT_ID_PREFIX;
use crate::domain::SelectionPolicy;

/// How fresh node ids are minted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `<prefix>-<9 base36 chars>` from a random source
    #[default]
    Random,
    /// `<prefix>-1`, `<prefix>-2`, ... (reproducible output)
    Sequential,
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(IdStrategy::Random),
            "sequential" => Ok(IdStrategy::Sequential),
            other => Err(format!("unknown id strategy '{other}' (random|sequential)")),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Random => f.write_str("random"),
            IdStrategy::Sequential => f.write_str("sequential"),
        }
    }
}

/// Raw selection settings; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSelectionSettings {
    pub multiple: Option<bool>,
    pub parent_selection: Option<bool>,
    pub highlight_on_click: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub id_prefix: Option<String>,
    pub id_strategy: Option<IdStrategy>,
    pub default_node_name: Option<String>,
    pub pretty_json: Option<bool>,
    pub selection: RawSelectionSettings,
}

/// Unified configuration for formtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Prefix of generated node ids
    pub id_prefix: String,
    pub id_strategy: IdStrategy,
    /// Name given to nodes added without an explicit name
    pub default_node_name: String,
    /// Write documents indented
    pub pretty_json: bool,
    pub selection: SelectionPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            id_strategy: IdStrategy::default(),
            default_node_name: "New node".to_string(),
            pretty_json: true,
            selection: SelectionPolicy::default(),
        }
    }
}

/// Get the XDG config directory for formtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "formtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("formtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay the values a config file specifies; the rest is kept.
    pub fn apply_global(&self, global: &RawSettings) -> Self {
        let sel = &global.selection;
        Self {
            id_prefix: global
                .id_prefix
                .clone()
                .unwrap_or_else(|| self.id_prefix.clone()),
            id_strategy: global.id_strategy.unwrap_or(self.id_strategy),
            default_node_name: global
                .default_node_name
                .clone()
                .unwrap_or_else(|| self.default_node_name.clone()),
            pretty_json: global.pretty_json.unwrap_or(self.pretty_json),
            selection: SelectionPolicy {
                multiple: sel.multiple.unwrap_or(self.selection.multiple),
                parent_selection: sel
                    .parent_selection
                    .unwrap_or(self.selection.parent_selection),
                highlight_on_click: sel
                    .highlight_on_click
                    .unwrap_or(self.selection.highlight_on_click),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// `config_file` replaces the XDG location; it must exist when given.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        let global_path = match config_file {
            Some(path) if !path.exists() => {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                })
            }
            Some(path) => Some(path.to_path_buf()),
            None => global_config_path().filter(|p| p.exists()),
        };
        if let Some(path) = global_path {
            let raw = load_raw_settings(&path)?;
            current = current.apply_global(&raw);
        }

        let settings = current.apply_env_overrides(env_source())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values that would make every generated id invalid.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self
            .id_prefix
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ApplicationError::Config {
                message: format!(
                    "id_prefix '{}' must not contain whitespace or control characters",
                    self.id_prefix.escape_debug()
                ),
            });
        }
        Ok(())
    }

    /// Apply FORMTREE_* environment variables as explicit overrides.
    pub fn apply_env_overrides(mut self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("id_prefix") {
            self.id_prefix = val;
        }
        if let Ok(val) = config.get_string("id_strategy") {
            self.id_strategy = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("default_node_name") {
            self.default_node_name = val;
        }
        if let Ok(val) = config.get_bool("pretty_json") {
            self.pretty_json = val;
        }
        if let Ok(val) = config.get_bool("selection.multiple") {
            self.selection.multiple = val;
        }
        if let Ok(val) = config.get_bool("selection.parent_selection") {
            self.selection.parent_selection = val;
        }
        if let Ok(val) = config.get_bool("selection.highlight_on_click") {
            self.selection.highlight_on_click = val;
        }

        Ok(self)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# formtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/formtree/formtree.toml
#   Env:    FORMTREE_* environment variables, e.g.
#           FORMTREE_ID_PREFIX=item  FORMTREE_SELECTION__MULTIPLE=false

# Prefix of generated node ids ("<prefix>-<suffix>")
# id_prefix = "node"

# "random" (9 base36 chars) or "sequential" (1, 2, 3, ...)
# id_strategy = "random"

# Name given to nodes added without --name
# default_node_name = "New node"

# Indent written documents
# pretty_json = true

[selection]
# Several subtrees may be checked at once
# multiple = true

# Branch nodes can be checked themselves
# parent_selection = true

# Clicking a row highlights it (UI hint only)
# highlight_on_click = false
"#
        .to_string()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("FORMTREE")
        .prefix_separator("_")
        .separator("__")
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
