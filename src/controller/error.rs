//! Error definitions for the input host

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    /// Device id does not name a registered device
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// Config key cannot be changed at runtime
    #[error("Unsupported config key: {0}")]
    UnsupportedConfig(String),

    /// Platform backend could not be opened
    #[error("Platform error: {0}")]
    PlatformError(String),
}
