//! Settings persisted as a TOML file
//!
//! Lives at `~/.config/earshot/settings.toml` on Linux and the platform
//! equivalent elsewhere. A missing file yields (and writes) defaults; a file
//! that cannot be parsed is kept aside as `settings.toml.corrupt` and
//! defaults are used instead.

use earshot_core::domain::settings::{Result, Settings, SettingsError, SettingsStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, Clone)]
pub struct TomlSettingsFile {
    path: PathBuf,
}

impl TomlSettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform configuration directory joined with `earshot/settings.toml`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("earshot").join(SETTINGS_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::Location("Could not determine config directory".to_string())
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read(&self) -> Result<Settings> {
        let contents = fs::read_to_string(&self.path)?;
        toml::from_str(&contents).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    fn write(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let toml_str =
            toml::to_string_pretty(settings).map_err(|e| SettingsError::Serialize(e.to_string()))?;
        fs::write(&self.path, toml_str)?;
        Ok(())
    }
}

impl SettingsStore for TomlSettingsFile {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Settings {
        if !self.path.exists() {
            info!("Settings file not found, writing defaults");
            let settings = Settings::default();
            if let Err(e) = self.write(&settings) {
                error!(error = %e, "Failed to save default settings");
            }
            return settings;
        }

        match self.read() {
            Ok(settings) => {
                info!("Settings loaded");
                settings
            }
            Err(e) => {
                error!(error = %e, "Failed to load settings, using defaults");

                let backup_path = self.path.with_extension("toml.corrupt");
                if let Err(copy_err) = fs::copy(&self.path, &backup_path) {
                    error!(
                        path = %backup_path.display(),
                        error = %copy_err,
                        "Failed to backup corrupt settings"
                    );
                }

                Settings::default()
            }
        }
    }

    #[instrument(skip(self, settings), fields(path = %self.path.display()))]
    fn save(&mut self, settings: &Settings) -> Result<()> {
        self.write(settings)?;
        info!("Settings saved");
        Ok(())
    }
}
