//! Semantic error types for the podnet library.
//!
//! This module defines the error hierarchy for podnet, following the principle of
//! using semantic error enums (via `thiserror`) for conditions the caller might
//! inspect, retry, or map to an exit status, while reserving opaque errors
//! (`eyre::Report`) for the application boundary.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors that can occur while talking to the container engine about
/// containers.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Failed to connect to the container engine socket.
    #[error("failed to connect to container engine: {message}")]
    ConnectionFailed {
        /// A description of the connection failure.
        message: String,
    },

    /// The container engine socket was not found.
    #[error("container engine socket not found: {path}")]
    SocketNotFound {
        /// The path where the socket was expected.
        path: PathBuf,
    },

    /// Permission denied when accessing the container engine socket.
    #[error("permission denied accessing container socket: {path}")]
    PermissionDenied {
        /// The path to the socket.
        path: PathBuf,
    },

    /// Failed to create the Tokio runtime used by synchronous helpers.
    #[error("failed to create async runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the runtime failure.
        message: String,
    },

    /// Health check failed - engine did not respond correctly.
    #[error("container engine health check failed: {message}")]
    HealthCheckFailed {
        /// A description of the health check failure.
        message: String,
    },

    /// Health check timed out.
    #[error("container engine health check timed out after {seconds} seconds")]
    HealthCheckTimeout {
        /// The timeout duration in seconds.
        seconds: u64,
    },

    /// The engine could not inspect the container.
    #[error("failed to inspect container '{container_id}': {message}")]
    InspectFailed {
        /// The ID or name of the container.
        container_id: String,
        /// A description of the inspect failure.
        message: String,
    },

    /// The container has no IP address on any attached network.
    #[error("container '{container_id}' has no IP address on any network")]
    NoIpAddress {
        /// The ID or name of the container.
        container_id: String,
    },
}

/// Errors that can occur during network operations.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The engine rejected the network create request.
    #[error("failed to create network '{name}': {message}")]
    CreateFailed {
        /// The requested network name.
        name: String,
        /// A description of the creation failure.
        message: String,
    },

    /// The engine failed to list networks.
    #[error("failed to list networks: {message}")]
    ListFailed {
        /// A description of the listing failure.
        message: String,
    },

    /// The engine failed to remove a network.
    #[error("failed to remove network '{name}': {message}")]
    RemoveFailed {
        /// The network name or ID.
        name: String,
        /// A description of the removal failure.
        message: String,
    },

    /// No network with the given name exists.
    #[error("network not found: {name}")]
    NotFound {
        /// The network name that was looked up.
        name: String,
    },

    /// A network operation did not finish before its deadline.
    #[error("network operation '{operation}' timed out after {millis} ms")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The deadline in milliseconds.
        millis: u128,
    },

    /// A user-supplied label uses the namespace reserved for generic labels.
    #[error("label '{key}' uses the reserved namespace '{namespace}'")]
    ReservedLabel {
        /// The offending label key.
        key: String,
        /// The reserved namespace.
        namespace: String,
    },
}

/// Top-level error type for the podnet library.
///
/// This enum aggregates all domain-specific errors into a single type that can
/// be used throughout the library. At the application boundary (main.rs),
/// these errors are converted to `eyre::Report` for human-readable reporting.
#[derive(Debug, Error)]
pub enum PodnetError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while talking to the engine about containers.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// An error occurred during network operations.
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// A specialised `Result` type for podnet operations.
pub type Result<T> = std::result::Result<T, PodnetError>;
