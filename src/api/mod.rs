//! Library API behind the podnet commands.
//!
//! Each command has a function here that does the work and returns data.
//! Nothing in this module prints or exits; the binary owns presentation.

mod create;

pub use create::{CreateNetworkParams, create_network_async, network_options, parse_label};

use bollard::Docker;
use futures_util::future::join_all;
use tracing::warn;

use crate::config::AppConfig;
use crate::engine::{EngineConnector, NetworkEngine, SocketResolver};
use crate::error::PodnetError;
use crate::network::NetworkSession;

/// Connect to the configured engine and confirm it responds.
///
/// # Errors
///
/// Returns the connection and health-check errors of
/// [`EngineConnector::connect_with_fallback_and_verify_async`].
pub async fn connect_engine_async<E: mockable::Env>(
    config: &AppConfig,
    env: &E,
) -> Result<Docker, PodnetError> {
    let resolver = SocketResolver::new(env);
    EngineConnector::connect_with_fallback_and_verify_async(
        config.engine_socket.as_deref(),
        &resolver,
    )
    .await
}

/// Remove several networks by name or ID.
///
/// Every removal is attempted. Returns the removed references when all
/// succeed.
///
/// # Errors
///
/// Returns the first removal error after all removals have run.
pub async fn remove_networks_async<E: NetworkEngine>(
    session: &NetworkSession,
    engine: &E,
    networks: &[String],
) -> Result<Vec<String>, PodnetError> {
    let removals = networks.iter().map(|network| async move {
        session
            .remove_network_async(engine, network)
            .await
            .map(|()| network.clone())
    });

    let mut removed = Vec::with_capacity(networks.len());
    let mut first_error = None;
    for outcome in join_all(removals).await {
        match outcome {
            Ok(network) => removed.push(network),
            Err(error) => {
                warn!(%error, "failed to remove network");
                first_error.get_or_insert(error);
            }
        }
    }

    first_error.map_or(Ok(removed), Err)
}
