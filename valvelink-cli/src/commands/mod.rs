//! CLI command implementations.
//!
//! - [`config`] - Configuration file management (init, show, path)
//! - [`monitor`] - Live link to the rig controller
//! - [`ports`] - Serial port listing

pub mod config;
pub mod monitor;
pub mod ports;
