//! Configuration file for the rig console.
//!
//! Settings live in `~/.valvelink/config.ini`. A missing file yields
//! defaults; every key is optional and overlays the default value.
//!
//! - `settings` holds one struct per `[section]`
//! - `defaults` holds every `DEFAULT_*` constant
//! - `parser` maps INI keys to struct fields
//! - `writer` renders the commented INI file
//!
//! # Example
//!
//! ```
//! use valvelink::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let link = config.to_link_config("/dev/ttyACM0");
//! assert_eq!(link.serial.baud_rate, 115_200);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, DisplaySettings, LinkSettings, LoggingSettings, RecordingSettings, SerialSection,
};
