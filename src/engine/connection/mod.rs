//! Socket resolution and container engine connection.
//!
//! This module resolves the engine endpoint from configuration, environment
//! variables and platform defaults, then builds a Bollard client for it.

mod error_classification;
mod health_check;

use bollard::Docker;
use tracing::debug;

use self::error_classification::classify_connection_error;
use crate::error::PodnetError;

/// Environment variable names checked in fallback order after configuration sources.
const FALLBACK_ENV_VARS: &[&str] = &["DOCKER_HOST", "CONTAINER_HOST", "PODMAN_HOST"];

/// Connection timeout in seconds for Docker/Podman API connections.
const CONNECTION_TIMEOUT_SECS: u64 = 120;

/// Timeout in seconds for health check operations.
const HEALTH_CHECK_TIMEOUT_SECS: u64 = 10;

#[cfg(unix)]
const DEFAULT_SOCKET: &str = "unix:///var/run/docker.sock";

#[cfg(windows)]
const DEFAULT_SOCKET: &str = "npipe:////./pipe/docker_engine";

/// Resolves container engine socket endpoints from environment variables.
///
/// # Type Parameters
///
/// * `E` - An environment provider implementing the `mockable::Env` trait,
///   allowing for testable environment variable access.
///
/// # Example
///
/// ```ignore
/// use mockable::DefaultEnv;
/// use podnet::engine::SocketResolver;
///
/// let env = DefaultEnv::new();
/// let resolver = SocketResolver::new(&env);
///
/// if let Some(socket) = resolver.resolve_from_env() {
///     println!("Found socket: {}", socket);
/// }
/// ```
pub struct SocketResolver<'a, E: mockable::Env> {
    env: &'a E,
}

impl<'a, E: mockable::Env> SocketResolver<'a, E> {
    /// Creates a new socket resolver with the given environment provider.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Resolves the socket endpoint from fallback environment variables.
    ///
    /// Checks `DOCKER_HOST`, `CONTAINER_HOST` and `PODMAN_HOST` in that order
    /// and returns the first non-empty value.
    #[must_use]
    pub fn resolve_from_env(&self) -> Option<String> {
        FALLBACK_ENV_VARS
            .iter()
            .filter_map(|var_name| self.env.string(var_name))
            .find(|value| !value.is_empty())
    }

    /// Returns the platform default socket path.
    #[must_use]
    pub const fn default_socket() -> &'static str {
        DEFAULT_SOCKET
    }
}

/// Classifies socket endpoint types for connection handling.
enum SocketType {
    /// Unix socket or Windows named pipe with explicit scheme.
    Socket,
    /// HTTP, HTTPS, or TCP endpoint (TCP is rewritten to HTTP).
    Http,
    /// Bare path without scheme prefix.
    BarePath,
}

impl SocketType {
    fn is_socket_scheme(socket: &str) -> bool {
        socket.starts_with("unix://") || socket.starts_with("npipe://")
    }

    fn is_http_scheme(socket: &str) -> bool {
        socket.starts_with("tcp://")
            || socket.starts_with("http://")
            || socket.starts_with("https://")
    }

    fn classify(socket: &str) -> Self {
        match (Self::is_socket_scheme(socket), Self::is_http_scheme(socket)) {
            (true, _) => Self::Socket,
            (_, true) => Self::Http,
            _ => Self::BarePath,
        }
    }
}

/// Entry point for talking to Docker or Podman engines.
///
/// Connection helpers live here; network and inspection helpers are added
/// as further `impl` blocks in the `network` module.
pub struct EngineConnector;

impl EngineConnector {
    /// Connect to the container engine at the specified socket path.
    ///
    /// Supports `unix://`, `npipe://`, `tcp://` (treated as HTTP), `http://`
    /// and `https://` endpoints. Bare paths starting with `\\` or `//` are
    /// treated as Windows named pipes and all other bare paths as Unix
    /// sockets.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::SocketNotFound`, `PermissionDenied` or
    /// `ConnectionFailed` if the client cannot be built.
    pub fn connect(socket: impl AsRef<str>) -> Result<Docker, PodnetError> {
        let socket_str = socket.as_ref();
        let socket_uri = match SocketType::classify(socket_str) {
            SocketType::Socket => String::from(socket_str),
            SocketType::Http => socket_str.replacen("tcp://", "http://", 1),
            SocketType::BarePath => Self::normalize_bare_path(socket_str),
        };
        debug!(endpoint = %socket_uri, "connecting to container engine");

        let connected = if matches!(SocketType::classify(&socket_uri), SocketType::Http) {
            Docker::connect_with_http(
                &socket_uri,
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            )
        } else {
            Docker::connect_with_socket(
                &socket_uri,
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            )
        };

        connected.map_err(|error| PodnetError::from(classify_connection_error(&error, &socket_uri)))
    }

    /// Normalize a bare socket path to a URI with the appropriate scheme.
    ///
    /// Detection is based on path syntax, not the current platform.
    fn normalize_bare_path(path: &str) -> String {
        if path.starts_with("\\\\") || path.starts_with("//") {
            format!("npipe://{path}")
        } else {
            format!("unix://{path}")
        }
    }

    /// Connect using the resolved socket from configuration and environment.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::connect`].
    pub fn connect_with_fallback<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> Result<Docker, PodnetError> {
        let socket = Self::resolve_socket(config_socket, resolver);
        Self::connect(&socket)
    }

    /// Resolves the socket endpoint without establishing a connection.
    ///
    /// Resolution order:
    /// 1. `config_socket` (from CLI, config file, or `PODNET_ENGINE_SOCKET`)
    /// 2. `DOCKER_HOST`, `CONTAINER_HOST`, `PODMAN_HOST` (via resolver)
    /// 3. Platform default socket
    #[must_use]
    pub fn resolve_socket<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> String {
        config_socket
            .filter(|s| !s.is_empty())
            .map(String::from)
            .or_else(|| resolver.resolve_from_env())
            .unwrap_or_else(|| SocketResolver::<E>::default_socket().to_owned())
    }
}
