//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::link::WriteFailurePolicy;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [serial] section
    if let Some(section) = ini.section(Some("serial")) {
        if let Some(v) = section.get("port") {
            let v = v.trim();
            if !v.is_empty() {
                config.serial.port = Some(v.to_string());
            }
        }
        if let Some(v) = parse_key(section, "serial", "baud_rate", "must be a positive integer")? {
            config.serial.baud_rate = positive(v, "serial", "baud_rate")?;
        }
        if let Some(v) = parse_key(
            section,
            "serial",
            "read_timeout_ms",
            "must be a positive integer (milliseconds)",
        )? {
            config.serial.read_timeout_ms = positive(v, "serial", "read_timeout_ms")?;
        }
        if let Some(v) = parse_key(
            section,
            "serial",
            "write_timeout_ms",
            "must be a positive integer (milliseconds)",
        )? {
            config.serial.write_timeout_ms = positive(v, "serial", "write_timeout_ms")?;
        }
    }

    // [link] section
    if let Some(section) = ini.section(Some("link")) {
        if let Some(v) = parse_key(
            section,
            "link",
            "writer_poll_ms",
            "must be a positive integer (milliseconds)",
        )? {
            config.link.writer_poll_ms = positive(v, "link", "writer_poll_ms")?;
        }
        if let Some(v) = parse_key(
            section,
            "link",
            "join_timeout_ms",
            "must be a non-negative integer (milliseconds)",
        )? {
            config.link.join_timeout_ms = v;
        }
        if let Some(v) = parse_key(
            section,
            "link",
            "outbound_capacity",
            "must be a non-negative integer (0 = unbounded)",
        )? {
            config.link.outbound_capacity = v;
        }
        if let Some(v) = section.get("write_failure") {
            config.link.write_failure =
                v.parse::<WriteFailurePolicy>()
                    .map_err(|_| ConfigFileError::InvalidValue {
                        section: "link".to_string(),
                        key: "write_failure".to_string(),
                        value: v.to_string(),
                        reason: "must be 'continue', 'stop' or 'retry:<attempts>'".to_string(),
                    })?;
        }
    }

    // [recording] section
    if let Some(section) = ini.section(Some("recording")) {
        if let Some(v) = section.get("enabled") {
            config.recording.enabled = parse_bool(v).ok_or_else(|| {
                ConfigFileError::InvalidValue {
                    section: "recording".to_string(),
                    key: "enabled".to_string(),
                    value: v.to_string(),
                    reason: "must be 'true' or 'false'".to_string(),
                }
            })?;
        }
        if let Some(v) = section.get("path") {
            let v = v.trim();
            if !v.is_empty() {
                config.recording.path = expand_tilde(v);
            }
        }
        if let Some(v) = parse_key(
            section,
            "recording",
            "interval_ms",
            "must be a non-negative integer (milliseconds)",
        )? {
            config.recording.interval_ms = v;
        }
        if let Some(v) = section.get("fresh_on_start") {
            config.recording.fresh_on_start = parse_bool(v).ok_or_else(|| {
                ConfigFileError::InvalidValue {
                    section: "recording".to_string(),
                    key: "fresh_on_start".to_string(),
                    value: v.to_string(),
                    reason: "must be 'true' or 'false'".to_string(),
                }
            })?;
        }
    }

    // [display] section
    if let Some(section) = ini.section(Some("display")) {
        if let Some(v) = parse_key(
            section,
            "display",
            "tick_ms",
            "must be a positive integer (milliseconds)",
        )? {
            config.display.tick_ms = positive(v, "display", "tick_ms")?;
        }
        if let Some(v) = parse_key(
            section,
            "display",
            "target_points",
            "must be a positive integer",
        )? {
            config.display.target_points = positive(v, "display", "target_points")?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

/// Parse `key` from `section` if present.
fn parse_key<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    let Some(v) = section.get(key) else {
        return Ok(None);
    };
    v.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigFileError::InvalidValue {
            section: section_name.to_string(),
            key: key.to_string(),
            value: v.to_string(),
            reason: reason.to_string(),
        })
}

/// Reject zero for settings that must be positive.
fn positive<T: PartialEq + Default + ToString>(
    value: T,
    section: &str,
    key: &str,
) -> Result<T, ConfigFileError> {
    if value == T::default() {
        return Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
