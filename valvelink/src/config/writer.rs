//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let port = config.serial.port.as_deref().unwrap_or("");
    let enabled = if config.recording.enabled {
        "true"
    } else {
        "false"
    };
    let fresh_on_start = if config.recording.fresh_on_start {
        "true"
    } else {
        "false"
    };

    format!(
        r#"[serial]
; Serial device of the valve controller (e.g. /dev/ttyACM0, COM3)
; If empty, the port must be passed with --port
port = {}
; Line speed in baud (default: 115200)
baud_rate = {}
; Maximum wait for one incoming line, in milliseconds (default: 500)
read_timeout_ms = {}
; Maximum wait for one outgoing write, in milliseconds (default: 100)
write_timeout_ms = {}

[link]
; How long the writer waits on an empty command queue before
; checking for shutdown, in milliseconds (default: 200)
writer_poll_ms = {}
; How long disconnect waits for each worker thread, in milliseconds (default: 1000)
join_timeout_ms = {}
; Maximum queued commands; 0 means unbounded (default: 0)
outbound_capacity = {}
; What to do when a command cannot be written:
;   continue - log the failure and move on (default)
;   retry:N  - retry up to N more times, then move on
;   stop     - stop the writer until the next connect
write_failure = {}

[recording]
; Append accepted telemetry to a CSV file (default: true)
enabled = {}
; Record file, opened in append mode (default: ServoData.csv)
path = {}
; Minimum time between records, in milliseconds (default: 20)
interval_ms = {}
; Delete the previous run's record file at startup so runs don't merge
; (default: true, override once with --append)
fresh_on_start = {}

[display]
; Display refresh interval, in milliseconds (default: 20)
tick_ms = {}
; Maximum points per plotted series (default: 2000)
target_points = {}

[logging]
; Diagnostic log directory (default: logs)
directory = {}
; Diagnostic log file name (default: valvelink.log)
file = {}
"#,
        port,
        config.serial.baud_rate,
        config.serial.read_timeout_ms,
        config.serial.write_timeout_ms,
        config.link.writer_poll_ms,
        config.link.join_timeout_ms,
        config.link.outbound_capacity,
        config.link.write_failure,
        enabled,
        path_to_string(&config.recording.path),
        config.recording.interval_ms,
        fresh_on_start,
        config.display.tick_ms,
        config.display.target_points,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Render a path, collapsing the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
