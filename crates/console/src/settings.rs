use models::ModelDefinition;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConsoleError, Result};

pub const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"models=debug"`.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub log: Option<LogSettings>,
    /// Model the console seeds and searches.
    pub model: ModelDefinition,
}

impl Settings {
    /// Load settings from `<dir>/settings.toml`.
    #[tracing::instrument(skip_all)]
    pub fn load(dir: &Path) -> Result<Settings> {
        if !dir.exists() {
            return Err(ConsoleError::Config(format!(
                "Settings directory does not exist: {}",
                dir.display()
            )));
        }

        let mut path = PathBuf::from(dir);
        path.push(SETTINGS_FILE);

        if !path.exists() {
            return Err(ConsoleError::Config(format!(
                "{SETTINGS_FILE} not found at {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(&path).map_err(|err| {
            ConsoleError::Config(format!("Failed reading {}: {}", path.display(), err))
        })?;

        let settings = Self::parse(&text).map_err(|err| {
            ConsoleError::Config(format!("Invalid {SETTINGS_FILE} at {}: {}", path.display(), err))
        })?;
        debug!(model = %settings.model, "settings loaded");
        Ok(settings)
    }

    pub fn parse(text: &str) -> std::result::Result<Settings, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn log_filter(&self) -> Option<&str> {
        self.log.as_ref().and_then(|l| l.filter.as_deref())
    }
}
