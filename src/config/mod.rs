use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const APP_DIR: &str = "rpomolog";
pub const CONFIG_FILE: &str = "rpomolog.conf";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// caches, identity files and logs
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// root of the file-backed remote stores; `<data_dir>/sheets` when unset
    #[serde(default)]
    pub remote_dir: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,
}

fn default_data_dir() -> String {
    Config::config_dir().to_string_lossy().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_duration_minutes() -> i64 {
    25
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            remote_dir: None,
            log_level: default_log_level(),
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

impl Config {
    /// `~/.rpomolog` (`%APPDATA%\rpomolog` on Windows)
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(format!(".{APP_DIR}"))
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    /// Load the configuration file, or defaults when there is none.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self) -> AppResult<()> {
        fs::create_dir_all(Self::config_dir()).map_err(|_| AppError::ConfigSave)?;
        let yaml = serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))?;
        fs::write(Self::config_file(), yaml).map_err(|_| AppError::ConfigSave)
    }

    pub fn data_path(&self) -> PathBuf {
        expand_tilde(&self.data_dir)
    }

    pub fn remote_path(&self) -> PathBuf {
        match &self.remote_dir {
            Some(dir) => expand_tilde(dir),
            None => self.data_path().join("sheets"),
        }
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Create the data directories and, unless `is_test`, write the config file.
    pub fn init_all(&self, is_test: bool) -> AppResult<()> {
        fs::create_dir_all(self.data_path())?;
        fs::create_dir_all(self.remote_path())?;

        if !is_test {
            self.save()?;
        }
        Ok(())
    }
}
