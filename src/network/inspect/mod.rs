//! Network views of inspected containers.
//!
//! The engine reports a container's endpoints keyed by network name. A
//! [`ContainerNetworkView`] keeps them in name order so lookups such as
//! [`ContainerNetworkView::container_ip`] are deterministic.

use std::collections::BTreeMap;

use bollard::models::{ContainerInspectResponse, EndpointSettings};
use tracing::debug;

use crate::engine::{ContainerInspector, EngineConnector};
use crate::error::{ContainerError, PodnetError};

/// One network endpoint of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkEndpoint {
    /// Engine ID of the network, when reported.
    pub network_id: Option<String>,

    /// Aliases the container answers to on this network.
    pub aliases: Vec<String>,

    /// IPv4 address on this network, when assigned.
    pub ip_address: Option<String>,
}

impl From<EndpointSettings> for NetworkEndpoint {
    fn from(settings: EndpointSettings) -> Self {
        Self {
            network_id: settings.network_id.filter(|id| !id.is_empty()),
            aliases: settings.aliases.unwrap_or_default(),
            ip_address: settings.ip_address.filter(|ip| !ip.is_empty()),
        }
    }
}

/// The networks a container is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNetworkView {
    container_id: String,
    endpoints: BTreeMap<String, NetworkEndpoint>,
}

impl ContainerNetworkView {
    /// Build a view from an engine inspect response.
    #[must_use]
    pub fn from_inspect(container_id: &str, response: ContainerInspectResponse) -> Self {
        let endpoints = response
            .network_settings
            .and_then(|settings| settings.networks)
            .unwrap_or_default()
            .into_iter()
            .map(|(name, settings)| (name, NetworkEndpoint::from(settings)))
            .collect();

        Self {
            container_id: response.id.unwrap_or_else(|| String::from(container_id)),
            endpoints,
        }
    }

    /// Return the container ID.
    #[must_use]
    pub const fn container_id(&self) -> &str {
        self.container_id.as_str()
    }

    /// Return the attached network names, sorted.
    #[must_use]
    pub fn networks(&self) -> Vec<&str> {
        self.endpoints.keys().map(String::as_str).collect()
    }

    /// Return the aliases per network.
    #[must_use]
    pub fn network_aliases(&self) -> BTreeMap<&str, &[String]> {
        self.endpoints
            .iter()
            .map(|(name, endpoint)| (name.as_str(), endpoint.aliases.as_slice()))
            .collect()
    }

    /// Return the endpoint on `network`, if attached.
    #[must_use]
    pub fn endpoint(&self, network: &str) -> Option<&NetworkEndpoint> {
        self.endpoints.get(network)
    }

    /// Return the container's address on `network`, if any.
    #[must_use]
    pub fn ip_on(&self, network: &str) -> Option<&str> {
        self.endpoint(network)
            .and_then(|endpoint| endpoint.ip_address.as_deref())
    }

    /// Return every assigned address in network-name order.
    #[must_use]
    pub fn container_ips(&self) -> Vec<&str> {
        self.endpoints
            .values()
            .filter_map(|endpoint| endpoint.ip_address.as_deref())
            .collect()
    }

    /// Return the first assigned address in network-name order.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::NoIpAddress` when no network has assigned
    /// the container an address.
    pub fn container_ip(&self) -> Result<&str, PodnetError> {
        self.container_ips().first().copied().ok_or_else(|| {
            PodnetError::from(ContainerError::NoIpAddress {
                container_id: self.container_id.clone(),
            })
        })
    }
}

impl EngineConnector {
    /// Inspect a container and return its network view.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::InspectFailed` when the engine call fails.
    pub async fn inspect_container_networks_async<I: ContainerInspector>(
        inspector: &I,
        container_id: &str,
    ) -> Result<ContainerNetworkView, PodnetError> {
        let response = inspector
            .inspect_container(container_id)
            .await
            .map_err(|error| ContainerError::InspectFailed {
                container_id: String::from(container_id),
                message: error.to_string(),
            })?;

        let view = ContainerNetworkView::from_inspect(container_id, response);
        debug!(
            container = container_id,
            networks = ?view.networks(),
            "inspected container networks"
        );
        Ok(view)
    }
}
