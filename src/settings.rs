use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const SETTINGS_FILE_NAME: &str = "settings.toml";
pub const DEFAULT_LOG_FILE_NAME: &str = "mongo_manager.log";
pub const DEFAULT_CONNECTION_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE_NAME: &str = "scraping_db";
pub const URI_ENV_VAR: &str = "MONGO_MANAGER_URI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    pub const fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub connection_uri: String,
    pub database_name: String,
    pub logging_enabled: bool,
    pub logging_level: LogLevel,
    pub logging_path: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            connection_uri: DEFAULT_CONNECTION_URI.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            logging_enabled: true,
            logging_level: LogLevel::Info,
            logging_path: DEFAULT_LOG_FILE_NAME.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum SettingsLoadError {
    Io(io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for SettingsLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsLoadError::Io(error) => write!(f, "I/O error: {}", error),
            SettingsLoadError::Parse(error) => write!(f, "Parse error: {}", error),
        }
    }
}

impl std::error::Error for SettingsLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsLoadError::Io(error) => Some(error),
            SettingsLoadError::Parse(error) => Some(error),
        }
    }
}

pub fn settings_path() -> PathBuf {
    PathBuf::from(SETTINGS_FILE_NAME)
}

pub fn load_from_disk() -> Result<AppSettings, SettingsLoadError> {
    match fs::read_to_string(settings_path()) {
        Ok(contents) => parse(&contents),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            let mut settings = AppSettings::default();
            settings.normalize();
            Ok(settings)
        }
        Err(error) => Err(SettingsLoadError::Io(error)),
    }
}

pub fn parse(contents: &str) -> Result<AppSettings, SettingsLoadError> {
    toml::from_str::<AppSettings>(contents)
        .map(|mut settings| {
            settings.normalize();
            settings
        })
        .map_err(SettingsLoadError::Parse)
}

impl AppSettings {
    pub fn normalize(&mut self) {
        if self.logging_path.trim().is_empty() {
            self.logging_path = DEFAULT_LOG_FILE_NAME.to_string();
        }
        if self.connection_uri.trim().is_empty() {
            self.connection_uri = DEFAULT_CONNECTION_URI.to_string();
        }
        if self.database_name.trim().is_empty() {
            self.database_name = DEFAULT_DATABASE_NAME.to_string();
        }
    }

    /// Applies an override taken from `MONGO_MANAGER_URI`, if one is present.
    pub fn apply_env_override(&mut self) {
        self.apply_uri_override(env::var(URI_ENV_VAR).ok());
    }

    fn apply_uri_override(&mut self, value: Option<String>) {
        if let Some(uri) = value {
            let trimmed = uri.trim();
            if !trimmed.is_empty() {
                self.connection_uri = trimmed.to_string();
            }
        }
    }
}
