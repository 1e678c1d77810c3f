//! Network references and engine-reported network details.

use std::collections::BTreeMap;

use bollard::models::Network;

use super::labels::LABEL_SESSION_ID;
use super::options::IpamSettings;

/// A reference to a network that containers can be attached to.
///
/// Handles come either from a session that created the network, from a
/// lookup of an existing network, or from [`DockerNetwork::synthetic`] for
/// networks the engine may not know about. Attaching a handle to any number
/// of container requests never calls the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerNetwork {
    id: Option<String>,
    name: String,
    driver: Option<String>,
}

impl DockerNetwork {
    pub(crate) fn created(id: String, name: String, driver: String) -> Self {
        Self {
            id: Some(id).filter(|value| !value.is_empty()),
            name,
            driver: Some(driver),
        }
    }

    /// Reference a network by name only.
    ///
    /// No engine network is created for a synthetic reference; the engine
    /// resolves the name when a container using it is created. Surrounding
    /// whitespace is trimmed, as it is when attaching by name.
    #[must_use]
    pub fn synthetic(name: impl Into<String>) -> Self {
        let raw: String = name.into();
        Self {
            id: None,
            name: String::from(raw.trim()),
            driver: None,
        }
    }

    /// Return the engine ID, if known.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Return the network name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Return the driver, if known.
    #[must_use]
    pub fn driver(&self) -> Option<&str> {
        self.driver.as_deref()
    }

    /// Return whether this reference has no engine ID.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.id.is_none()
    }

    /// The identifier used for engine calls: the ID when known, else the name.
    pub(crate) fn engine_ref(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

/// Network attributes as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDetails {
    /// Engine network ID.
    pub id: String,

    /// Network name.
    pub name: String,

    /// Network driver.
    pub driver: Option<String>,

    /// Whether standalone containers may attach.
    pub attachable: bool,

    /// Whether the network is cut off from the host.
    pub internal: bool,

    /// Whether IPv6 is enabled.
    pub enable_ipv6: bool,

    /// All labels on the network, generic labels included.
    pub labels: BTreeMap<String, String>,

    /// IPAM settings, if the engine reported any.
    pub ipam: Option<IpamSettings>,
}

impl NetworkDetails {
    /// Return the session that created the network, if it is managed.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.labels.get(LABEL_SESSION_ID).map(String::as_str)
    }

    /// Return a handle for attaching containers to this network.
    #[must_use]
    pub fn to_network(&self) -> DockerNetwork {
        DockerNetwork {
            id: Some(self.id.clone()).filter(|value| !value.is_empty()),
            name: self.name.clone(),
            driver: self.driver.clone(),
        }
    }
}

impl From<Network> for NetworkDetails {
    fn from(network: Network) -> Self {
        Self {
            id: network.id.unwrap_or_default(),
            name: network.name.unwrap_or_default(),
            driver: network.driver,
            attachable: network.attachable.unwrap_or(false),
            internal: network.internal.unwrap_or(false),
            enable_ipv6: network.enable_ipv6.unwrap_or(false),
            labels: network.labels.unwrap_or_default().into_iter().collect(),
            ipam: network.ipam.map(IpamSettings::from),
        }
    }
}
