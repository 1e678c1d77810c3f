//! Health check and connect-and-verify functionality.
//!
//! A ping confirms the engine is operational, not just that the socket is
//! reachable. The network commands run this before their first engine call
//! so an unreachable engine is reported as such rather than as a failed
//! network operation.

use std::time::Duration;

use bollard::Docker;
use tracing::debug;

use super::{EngineConnector, HEALTH_CHECK_TIMEOUT_SECS, SocketResolver};
use crate::error::{ContainerError, PodnetError};

impl EngineConnector {
    /// Perform a ping bounded by [`HEALTH_CHECK_TIMEOUT_SECS`].
    async fn ping_with_timeout(docker: &Docker) -> Result<(), PodnetError> {
        let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

        tokio::time::timeout(timeout, docker.ping())
            .await
            .map_err(|_| {
                PodnetError::from(ContainerError::HealthCheckTimeout {
                    seconds: HEALTH_CHECK_TIMEOUT_SECS,
                })
            })?
            .map_err(|e| {
                PodnetError::from(ContainerError::HealthCheckFailed {
                    message: e.to_string(),
                })
            })?;
        debug!("container engine responded to ping");
        Ok(())
    }

    /// Verify the container engine is responsive.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::HealthCheckFailed` if the engine does not
    /// respond correctly.
    ///
    /// Returns `ContainerError::HealthCheckTimeout` if the check times out.
    pub async fn health_check_async(docker: &Docker) -> Result<(), PodnetError> {
        Self::ping_with_timeout(docker).await
    }

    /// Create a Tokio runtime for callers outside an async context.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::RuntimeCreationFailed` if the runtime cannot
    /// be created.
    pub fn create_runtime() -> Result<tokio::runtime::Runtime, PodnetError> {
        tokio::runtime::Runtime::new().map_err(|e| {
            PodnetError::from(ContainerError::RuntimeCreationFailed {
                message: e.to_string(),
            })
        })
    }

    /// Connect using fallback resolution and verify the engine responds.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::ConnectionFailed` (or a more specific
    /// connection variant) if the connection fails.
    ///
    /// Returns `ContainerError::HealthCheckFailed` if the health check fails.
    ///
    /// Returns `ContainerError::HealthCheckTimeout` if the check times out.
    pub async fn connect_with_fallback_and_verify_async<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> Result<Docker, PodnetError> {
        let docker = Self::connect_with_fallback(config_socket, resolver)?;
        Self::ping_with_timeout(&docker).await?;
        Ok(docker)
    }
}
