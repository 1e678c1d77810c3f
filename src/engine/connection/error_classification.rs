//! Error classification helpers for container engine connection failures.
//!
//! This module converts low-level `Bollard` errors into semantic
//! `ContainerError` variants so callers receive actionable diagnostics.

use std::path::Path;

use crate::error::ContainerError;

/// Extract the filesystem path from a socket URI.
///
/// HTTP endpoints have no filesystem path and yield `None`.
pub(super) fn extract_socket_path(socket_uri: &str) -> Option<&Path> {
    socket_uri
        .strip_prefix("unix://")
        .or_else(|| socket_uri.strip_prefix("npipe://"))
        .map(Path::new)
}

fn classify_io_error_kind(
    kind: std::io::ErrorKind,
    socket_path: Option<&Path>,
    error_msg: &str,
) -> ContainerError {
    match kind {
        std::io::ErrorKind::PermissionDenied => socket_path.map_or_else(
            || ContainerError::ConnectionFailed {
                message: error_msg.to_owned(),
            },
            |path| ContainerError::PermissionDenied {
                path: path.to_path_buf(),
            },
        ),
        std::io::ErrorKind::NotFound => socket_path.map_or_else(
            || ContainerError::ConnectionFailed {
                message: error_msg.to_owned(),
            },
            |path| ContainerError::SocketNotFound {
                path: path.to_path_buf(),
            },
        ),
        _ => ContainerError::ConnectionFailed {
            message: error_msg.to_owned(),
        },
    }
}

/// Classify a `Bollard` connection error into a semantic `ContainerError`.
///
/// Falls back to `ConnectionFailed` for errors that do not match a known
/// pattern or for endpoints without filesystem paths.
pub(super) fn classify_connection_error(
    bollard_error: &bollard::errors::Error,
    socket_uri: &str,
) -> ContainerError {
    let socket_path = extract_socket_path(socket_uri);
    let error_msg = bollard_error.to_string();

    match bollard_error {
        bollard::errors::Error::SocketNotFoundError(_) => {
            if let Some(path) = socket_path {
                return ContainerError::SocketNotFound {
                    path: path.to_path_buf(),
                };
            }
        }
        bollard::errors::Error::IOError { err } => {
            let kind = io_error_kind_in_chain(err).unwrap_or_else(|| err.kind());
            return classify_io_error_kind(kind, socket_path, &error_msg);
        }
        _ => {}
    }

    if let Some(kind) = io_error_kind_in_chain(bollard_error) {
        return classify_io_error_kind(kind, socket_path, &error_msg);
    }

    ContainerError::ConnectionFailed { message: error_msg }
}

fn io_error_kind_in_chain(error: &dyn std::error::Error) -> Option<std::io::ErrorKind> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = error.source();
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            return Some(io_err.kind());
        }
        current = err.source();
    }
    None
}
