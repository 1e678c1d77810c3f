//! Trait seams over the Bollard network and container-inspect APIs.
//!
//! Network and inspection helpers are written against these traits rather
//! than `bollard::Docker` directly so they can be exercised without a running
//! daemon.

use std::future::Future;
use std::pin::Pin;

use bollard::models::{
    ContainerInspectResponse, Network, NetworkCreateRequest, NetworkCreateResponse,
};
use bollard::query_parameters::{InspectContainerOptions, ListNetworksOptions};
use bollard::{Docker, errors::Error as BollardError};

/// Boxed future type returned by [`NetworkEngine::create_network`].
pub type CreateNetworkFuture<'a> =
    Pin<Box<dyn Future<Output = Result<NetworkCreateResponse, BollardError>> + Send + 'a>>;

/// Boxed future type returned by [`NetworkEngine::list_networks`].
pub type ListNetworksFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Network>, BollardError>> + Send + 'a>>;

/// Boxed future type returned by [`NetworkEngine::remove_network`].
pub type RemoveNetworkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), BollardError>> + Send + 'a>>;

/// Boxed future type returned by [`ContainerInspector::inspect_container`].
pub type InspectContainerFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ContainerInspectResponse, BollardError>> + Send + 'a>>;

/// Behaviour required to manage networks through a backing engine client.
pub trait NetworkEngine {
    /// Create a network from a Bollard create payload.
    fn create_network(&self, request: NetworkCreateRequest) -> CreateNetworkFuture<'_>;

    /// List networks, optionally narrowed by engine-side filters.
    fn list_networks(&self, options: Option<ListNetworksOptions>) -> ListNetworksFuture<'_>;

    /// Remove a network by name or ID.
    fn remove_network(&self, name: &str) -> RemoveNetworkFuture<'_>;
}

/// Behaviour required to read a container's network metadata.
pub trait ContainerInspector {
    /// Inspect a container by ID or name.
    fn inspect_container(&self, container_id: &str) -> InspectContainerFuture<'_>;
}

impl NetworkEngine for Docker {
    fn create_network(&self, request: NetworkCreateRequest) -> CreateNetworkFuture<'_> {
        Box::pin(async move { Self::create_network(self, request).await })
    }

    fn list_networks(&self, options: Option<ListNetworksOptions>) -> ListNetworksFuture<'_> {
        Box::pin(async move { Self::list_networks(self, options).await })
    }

    fn remove_network(&self, name: &str) -> RemoveNetworkFuture<'_> {
        let name_owned = String::from(name);
        Box::pin(async move { Self::remove_network(self, &name_owned).await })
    }
}

impl ContainerInspector for Docker {
    fn inspect_container(&self, container_id: &str) -> InspectContainerFuture<'_> {
        let container_id_owned = String::from(container_id);
        Box::pin(async move {
            Self::inspect_container(self, &container_id_owned, None::<InspectContainerOptions>)
                .await
        })
    }
}
