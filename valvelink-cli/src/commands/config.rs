//! Configuration management CLI commands.
//!
//! Provides `config init`, `config show` and `config path`. These commands
//! do not start logging, so they work before a log directory exists.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use valvelink::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a commented default config file if none exists
    Init,

    /// Print the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against `path` (or the default location).
pub fn run(command: ConfigCommands, path: Option<PathBuf>) -> Result<(), CliError> {
    let path = path.unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Init => run_init(&path),
        ConfigCommands::Show => run_show(&path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn run_init(path: &Path) -> Result<(), CliError> {
    if ConfigFile::ensure_exists_at(path)? {
        println!("Created {}", path.display());
    } else {
        println!("Config file already exists: {}", path.display());
    }
    Ok(())
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    let source = if path.exists() {
        path.display().to_string()
    } else {
        "(defaults, no config file)".to_string()
    };

    println!("Config: {}", source);
    println!();
    println!("[serial]");
    println!(
        "  port             = {}",
        config.serial.port.as_deref().unwrap_or("(not set)")
    );
    println!("  baud_rate        = {}", config.serial.baud_rate);
    println!("  read_timeout_ms  = {}", config.serial.read_timeout_ms);
    println!("  write_timeout_ms = {}", config.serial.write_timeout_ms);
    println!("[link]");
    println!("  writer_poll_ms    = {}", config.link.writer_poll_ms);
    println!("  join_timeout_ms   = {}", config.link.join_timeout_ms);
    println!(
        "  outbound_capacity = {}",
        match config.link.outbound_capacity {
            0 => "unbounded".to_string(),
            n => n.to_string(),
        }
    );
    println!("  write_failure     = {}", config.link.write_failure);
    println!("[recording]");
    println!("  enabled        = {}", config.recording.enabled);
    println!("  path           = {}", config.recording.path.display());
    println!("  interval_ms    = {}", config.recording.interval_ms);
    println!("  fresh_on_start = {}", config.recording.fresh_on_start);
    println!("[display]");
    println!("  tick_ms       = {}", config.display.tick_ms);
    println!("  target_points = {}", config.display.target_points);
    println!("[logging]");
    println!("  directory = {}", config.logging.directory.display());
    println!("  file      = {}", config.logging.file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_loadable_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");

        run(ConfigCommands::Init, Some(path.clone())).unwrap();

        assert!(path.exists());
        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_show_reports_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, "[serial]\nbaud_rate = fast\n").unwrap();

        let err = run(ConfigCommands::Show, Some(path)).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
