//! Container network attachment requests.
//!
//! [`ContainerNetworking`] collects the networks and per-network aliases a
//! container should join and turns them into the networking parts of a
//! Bollard `ContainerCreateBody`. Only
//! [`ContainerNetworking::attach_new_network_async`] talks to the engine.

use std::collections::{BTreeMap, HashMap};

use bollard::models::{ContainerCreateBody, EndpointSettings, NetworkingConfig};
use tracing::debug;

use super::handle::DockerNetwork;
use super::options::NetworkOptions;
use super::session::NetworkSession;
use crate::engine::NetworkEngine;
use crate::error::PodnetError;

/// Networks and aliases requested for one container.
///
/// Networks keep their insertion order and appear at most once. Aliases are
/// kept per network; attaching a network again replaces its aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerNetworking {
    networks: Vec<String>,
    aliases: BTreeMap<String, Vec<String>>,
}

impl ContainerNetworking {
    /// Create a request with no networks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a network by name, replacing any aliases set for it earlier.
    ///
    /// Blank names are ignored. An empty alias list clears the aliases for
    /// the network.
    pub fn attach_network_name<I, S>(&mut self, aliases: I, name: &str)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            debug!("ignoring blank network name");
            return;
        }

        if !self.networks.iter().any(|existing| existing == trimmed) {
            self.networks.push(String::from(trimmed));
        }

        let alias_list: Vec<String> = aliases.into_iter().map(Into::into).collect();
        if alias_list.is_empty() {
            self.aliases.remove(trimmed);
        } else {
            self.aliases.insert(String::from(trimmed), alias_list);
        }
    }

    /// Attach `network` with `aliases`. No engine call is made.
    #[must_use]
    pub fn with_network<I, S>(mut self, aliases: I, network: &DockerNetwork) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attach_network_name(aliases, network.name());
        self
    }

    /// Attach a network by name with `aliases`. No engine call is made.
    #[must_use]
    pub fn with_network_name<I, S>(mut self, aliases: I, name: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attach_network_name(aliases, name);
        self
    }

    /// Create a network from `options` and attach it with `aliases`.
    ///
    /// The request is only modified once the network exists.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`NetworkSession::create_network_async`]. The
    /// request is left unchanged when an error is returned.
    pub async fn attach_new_network_async<E, I, S>(
        &mut self,
        session: &NetworkSession,
        engine: &E,
        aliases: I,
        options: &NetworkOptions,
    ) -> Result<DockerNetwork, PodnetError>
    where
        E: NetworkEngine,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let network = session.create_network_async(engine, options).await?;
        self.attach_network_name(aliases, network.name());
        Ok(network)
    }

    /// Return the attached network names in insertion order.
    #[must_use]
    pub const fn networks(&self) -> &[String] {
        self.networks.as_slice()
    }

    /// Return the aliases per network.
    #[must_use]
    pub const fn network_aliases(&self) -> &BTreeMap<String, Vec<String>> {
        &self.aliases
    }

    /// Return whether no network has been attached.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Build the endpoint configuration, one endpoint per network.
    #[must_use]
    pub fn networking_config(&self) -> Option<NetworkingConfig> {
        if self.networks.is_empty() {
            return None;
        }

        let endpoints = self
            .networks
            .iter()
            .map(|name| {
                let endpoint = EndpointSettings {
                    aliases: self.aliases.get(name).cloned(),
                    ..EndpointSettings::default()
                };
                (name.clone(), endpoint)
            })
            .collect::<HashMap<_, _>>();

        Some(NetworkingConfig {
            endpoints_config: Some(endpoints),
        })
    }

    /// Return the network mode for the container: the first network.
    #[must_use]
    pub fn network_mode(&self) -> Option<&str> {
        self.networks.first().map(String::as_str)
    }

    /// Wire the networks into a caller-supplied create body.
    ///
    /// Other fields of `body` are kept. Endpoints the caller already set up
    /// are merged: for an attached network only its aliases are replaced,
    /// and only when the request carries aliases for it. Endpoints on other
    /// networks are left alone. With no networks attached the body is
    /// returned unchanged.
    #[must_use]
    pub fn apply_to(&self, mut body: ContainerCreateBody) -> ContainerCreateBody {
        if self.networks.is_empty() {
            return body;
        }

        let mut networking_config = body.networking_config.take().unwrap_or_default();
        let endpoints = networking_config
            .endpoints_config
            .get_or_insert_with(HashMap::new);
        for name in &self.networks {
            let endpoint = endpoints.entry(name.clone()).or_default();
            if let Some(aliases) = self.aliases.get(name) {
                endpoint.aliases = Some(aliases.clone());
            }
        }

        let mut host_config = body.host_config.take().unwrap_or_default();
        host_config.network_mode = self.network_mode().map(String::from);
        body.host_config = Some(host_config);
        body.networking_config = Some(networking_config);
        body
    }
}
