//! Engine configuration at ~/.config/calgrid/config.toml
//!
//! Values can be overridden with `CALGRID_*` environment variables, using
//! `__` for nesting (e.g. `CALGRID_WINDOW__START_HOUR=7`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::compositor::{Density, ViewConfig};
use crate::date_range::{SlotWindow, ViewMode};
use crate::error::{CalGridError, CalGridResult};

static DEFAULT_STORE_PATH: &str = "~/.calgrid/events.json";

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub density: Density,

    #[serde(default)]
    pub default_mode: ViewMode,

    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    // Tables go last for TOML output
    #[serde(default)]
    pub window: SlotWindow,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            window: SlotWindow::default(),
            density: Density::default(),
            default_mode: ViewMode::default(),
            store_path: default_store_path(),
        }
    }
}

impl EngineConfig {
    pub fn config_path() -> CalGridResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalGridError::Config("Could not determine config directory".into()))?
            .join("calgrid");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first
    /// if there is none.
    pub fn load() -> CalGridResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            Self::create_default_config(&path)?;
        }
        Self::load_from(&path)
    }

    /// Load from `path` (optional) layered with environment overrides.
    pub fn load_from(path: &Path) -> CalGridResult<Self> {
        let config: EngineConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("CALGRID").separator("__"))
            .build()
            .map_err(|e| CalGridError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalGridError::Config(e.to_string()))?;

        config.window.validate()?;
        Ok(config)
    }

    /// Store path with `~` expanded.
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.store_path.to_string_lossy()).into_owned())
    }

    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            mode: self.default_mode,
            density: self.density,
            window: self.window,
        }
    }

    /// Write the current settings as TOML.
    pub fn save(&self, path: &Path) -> CalGridResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CalGridError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| CalGridError::Config(format!("Could not write config file: {e}")))?;
        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalGridResult<()> {
        let window = SlotWindow::default();
        let contents = format!(
            "\
# calgrid configuration

# Where events are stored:
# store_path = \"{}\"

# View shown when none is requested (day, week, month):
# default_mode = \"week\"

# Density preset (standard, compact, ultra-compact):
# density = \"standard\"

# Working window for day and week views:
# [window]
# start_hour = {}
# end_hour = {}
# step_minutes = {}
",
            DEFAULT_STORE_PATH, window.start_hour, window.end_hour, window.step_minutes
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalGridError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalGridError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
