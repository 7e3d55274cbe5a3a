/// Error types for the compare workflow
///
/// Only picking and transforming are allowed to fail outwardly. Analysis and
/// lookup failures are `CapabilityError`s that get reported and absorbed.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain an image from the library or the camera
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickError {
    #[error("Permission to access photos or the camera was denied")]
    PermissionDenied,

    /// Not an error for the workflow: it returns to Idle
    #[error("Image selection was cancelled")]
    UserCancelled,

    #[error("No camera or photo library is available on this device")]
    DeviceUnavailable,

    /// A second pick was requested while the first is still open
    #[error("An image selection is already in progress")]
    AlreadyInProgress,
}

/// Failure to turn a picked image into an analyzable payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Could not read {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Even at the lowest quality the JPEG was not smaller than the source
    #[error("Image could not be reduced below its original size ({source_len} bytes, best {encoded_len} bytes)")]
    NotReduced { source_len: usize, encoded_len: usize },
}

/// Failure of an external capability (analysis or lookup)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("No response within {0:?}")]
    TimedOut(Duration),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Rejected workflow action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("A comparison is already running ({state})")]
    Busy { state: &'static str },
}

/// Configuration loading or validation error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
