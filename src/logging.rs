use crate::settings::{AppSettings, DEFAULT_LOG_FILE_NAME};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

const LOG_ROTATE_BYTES: u64 = 100 * 1024;
const APP_TARGET: &str = "mongo_manager";

#[derive(Debug, Clone)]
struct LoggingConfig {
    file_enabled: bool,
    level: LevelFilter,
    file_path: PathBuf,
}

struct FileState {
    path: PathBuf,
    file: Option<File>,
    size: u64,
}

impl FileState {
    fn open(path: PathBuf) -> io::Result<Self> {
        let (file, size) = open_log_file(&path, true)?;
        Ok(Self { path, file: Some(file), size })
    }

    fn rotate_if_needed(&mut self, next_len: u64) -> io::Result<()> {
        if self.size + next_len <= LOG_ROTATE_BYTES {
            return Ok(());
        }

        self.file = None;
        rotate_log_file(&self.path)?;
        let (file, _) = open_log_file(&self.path, false)?;
        self.file = Some(file);
        self.size = 0;
        Ok(())
    }
}

struct Logger {
    config: LoggingConfig,
    file_state: Mutex<Option<FileState>>,
}

impl Logger {
    fn new(config: LoggingConfig) -> Self {
        Self { config, file_state: Mutex::new(None) }
    }

    fn write_line(&self, line: &str) {
        let _ = io::stderr().write_all(line.as_bytes());

        if !self.config.file_enabled {
            return;
        }

        let mut guard = self.file_state.lock().expect("logger file state lock poisoned");
        if guard.is_none() {
            *guard = FileState::open(self.config.file_path.clone()).ok();
        }
        let Some(state) = guard.as_mut() else {
            return;
        };

        let bytes = line.as_bytes();
        if state.rotate_if_needed(bytes.len() as u64).is_err() {
            *guard = None;
            return;
        }

        if let Some(file) = state.file.as_mut() {
            if file.write_all(bytes).is_ok() {
                state.size = state.size.saturating_add(bytes.len() as u64);
            } else {
                *guard = None;
            }
        }
    }
}

fn is_app_target(target: &str) -> bool {
    target == APP_TARGET || target.starts_with("mongo_manager::")
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.config.level && is_app_target(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let line = format!(
            "{timestamp} [{level}] {message}\n",
            level = record.level(),
            message = record.args()
        );
        self.write_line(&line);
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Installs the process logger. Diagnostics always reach stderr; the log file
/// is only written when logging is enabled in settings.
pub fn init(settings: &AppSettings) {
    let trimmed = settings.logging_path.trim();
    let file_path = if trimmed.is_empty() {
        PathBuf::from(DEFAULT_LOG_FILE_NAME)
    } else {
        PathBuf::from(trimmed)
    };

    let config = LoggingConfig {
        file_enabled: settings.logging_enabled,
        level: settings.logging_level.to_level_filter(),
        file_path,
    };
    let level = config.level;
    let logger = LOGGER.get_or_init(|| Logger::new(config));
    let _ = log::set_logger(logger);
    log::set_max_level(level);
}

fn open_log_file(path: &Path, append: bool) -> io::Result<(File, u64)> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file =
        OpenOptions::new().create(true).write(true).append(append).truncate(!append).open(path)?;
    let size = file.metadata().map(|meta| meta.len()).unwrap_or(0);
    Ok((file, size))
}

fn rotate_log_file(path: &Path) -> io::Result<()> {
    let rotated = rotated_log_path(path);
    if rotated.exists() {
        let _ = fs::remove_file(&rotated);
    }
    if path.exists() {
        fs::rename(path, rotated)?;
    }
    Ok(())
}

fn rotated_log_path(path: &Path) -> PathBuf {
    let file_name =
        path.file_name().and_then(|name| name.to_str()).unwrap_or(DEFAULT_LOG_FILE_NAME);
    path.with_file_name(format!("{file_name}.1"))
}
