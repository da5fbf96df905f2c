//! CLI runner for common setup.
//!
//! Loads the config file and initializes logging once, so command handlers
//! start from a ready environment.

use std::path::{Path, PathBuf};

use tracing::info;
use valvelink::config::{config_file_path, ConfigFile};
use valvelink::logging::{init_from_settings, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps logging active while the runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Load config from `config_path` (or the default path) and start logging.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;

        let logging_guard = init_from_settings(&config.logging)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("ValveLink v{}", valvelink::VERSION);
        info!(
            config = %self.config_path.display(),
            "ValveLink CLI: {} command", command
        );
    }
}
