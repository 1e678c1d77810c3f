//! Network create options and IPAM settings.
//!
//! [`NetworkOptions`] is an inert builder: nothing reaches the engine until a
//! [`NetworkSession`](super::NetworkSession) creates the network. The
//! conversion into a Bollard `NetworkCreateRequest` merges the session's
//! generic labels over the user labels.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;

use bollard::models::{Ipam, IpamConfig, NetworkCreateRequest};

use super::labels::{LABEL_NAMESPACE, SessionId, generic_labels, is_reserved_key};
use crate::config::NetworkConfig;
use crate::error::{ConfigError, NetworkError, PodnetError};

/// Driver used when none is configured.
pub const DEFAULT_DRIVER: &str = "bridge";

/// One IPAM address pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpamPool {
    /// Subnet in CIDR notation, e.g. `10.1.1.0/24`.
    pub subnet: Option<String>,

    /// Gateway address for the subnet.
    pub gateway: Option<String>,

    /// Sub-range of the subnet to allocate container addresses from.
    pub ip_range: Option<String>,

    /// Addresses the driver must not hand out, keyed by host name.
    pub auxiliary_addresses: BTreeMap<String, String>,
}

/// IP address management settings for a network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpamSettings {
    /// IPAM driver name, e.g. `default`.
    pub driver: Option<String>,

    /// Address pools.
    pub pools: Vec<IpamPool>,

    /// Driver-specific options.
    pub options: BTreeMap<String, String>,
}

impl IpamSettings {
    fn validate(&self) -> Result<(), PodnetError> {
        for pool in &self.pools {
            if let Some(subnet) = pool.subnet.as_deref() {
                validate_cidr("ipam.subnet", subnet)?;
            }
            if let Some(ip_range) = pool.ip_range.as_deref() {
                validate_cidr("ipam.ip_range", ip_range)?;
            }
            if let Some(gateway) = pool.gateway.as_deref() {
                validate_address("ipam.gateway", gateway)?;
            }
            for address in pool.auxiliary_addresses.values() {
                validate_address("ipam.auxiliary_addresses", address)?;
            }
        }
        Ok(())
    }
}

impl From<IpamSettings> for Ipam {
    fn from(settings: IpamSettings) -> Self {
        let pools = settings
            .pools
            .into_iter()
            .map(|pool| IpamConfig {
                subnet: pool.subnet,
                gateway: pool.gateway,
                ip_range: pool.ip_range,
                auxiliary_addresses: (!pool.auxiliary_addresses.is_empty())
                    .then(|| pool.auxiliary_addresses.into_iter().collect()),
                ..IpamConfig::default()
            })
            .collect::<Vec<_>>();

        Self {
            driver: settings.driver,
            config: (!pools.is_empty()).then_some(pools),
            options: (!settings.options.is_empty())
                .then(|| settings.options.into_iter().collect::<HashMap<_, _>>()),
        }
    }
}

impl From<Ipam> for IpamSettings {
    fn from(ipam: Ipam) -> Self {
        let pools = ipam
            .config
            .unwrap_or_default()
            .into_iter()
            .map(|config| IpamPool {
                subnet: non_empty(config.subnet),
                gateway: non_empty(config.gateway),
                ip_range: non_empty(config.ip_range),
                auxiliary_addresses: config
                    .auxiliary_addresses
                    .unwrap_or_default()
                    .into_iter()
                    .collect(),
            })
            .collect();

        Self {
            driver: non_empty(ipam.driver),
            pools,
            options: ipam.options.unwrap_or_default().into_iter().collect(),
        }
    }
}

/// Options for creating a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkOptions {
    name: Option<String>,
    driver: String,
    attachable: bool,
    internal: bool,
    enable_ipv6: bool,
    labels: BTreeMap<String, String>,
    ipam: Option<IpamSettings>,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkOptions {
    /// Create options for a `bridge` network with no flags, labels or IPAM.
    ///
    /// A random name is assigned at create time unless [`Self::with_name`]
    /// is used.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            driver: String::from(DEFAULT_DRIVER),
            attachable: false,
            internal: false,
            enable_ipv6: false,
            labels: BTreeMap::new(),
            ipam: None,
        }
    }

    /// Start from the `[network]` section of the application configuration.
    #[must_use]
    pub fn from_network_config(network: &NetworkConfig) -> Self {
        Self::new()
            .with_driver(network.driver.clone())
            .with_attachable(network.attachable)
            .with_internal(network.internal)
            .with_enable_ipv6(network.enable_ipv6)
    }

    /// Use an explicit network name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use the given network driver, e.g. `bridge` or `overlay`.
    #[must_use]
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    /// Allow standalone containers to attach to the network.
    #[must_use]
    pub const fn with_attachable(mut self, attachable: bool) -> Self {
        self.attachable = attachable;
        self
    }

    /// Make the network internal, cutting it off from the host.
    #[must_use]
    pub const fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// Enable IPv6 on the network.
    #[must_use]
    pub const fn with_enable_ipv6(mut self, enable_ipv6: bool) -> Self {
        self.enable_ipv6 = enable_ipv6;
        self
    }

    /// Add user labels. Later values replace earlier ones for the same key.
    #[must_use]
    pub fn with_labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Use custom IPAM settings.
    #[must_use]
    pub fn with_ipam(mut self, ipam: IpamSettings) -> Self {
        self.ipam = Some(ipam);
        self
    }

    /// Return the explicit name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the configured driver.
    #[must_use]
    pub const fn driver(&self) -> &str {
        self.driver.as_str()
    }

    /// Return whether the network will be attachable.
    #[must_use]
    pub const fn attachable(&self) -> bool {
        self.attachable
    }

    /// Return whether the network will be internal.
    #[must_use]
    pub const fn internal(&self) -> bool {
        self.internal
    }

    /// Return whether IPv6 will be enabled.
    #[must_use]
    pub const fn enable_ipv6(&self) -> bool {
        self.enable_ipv6
    }

    /// Return the user labels.
    #[must_use]
    pub const fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Return the IPAM settings, if any.
    #[must_use]
    pub const fn ipam(&self) -> Option<&IpamSettings> {
        self.ipam.as_ref()
    }

    /// Check the options before they are sent to the engine.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a blank name or driver or a
    /// malformed IPAM address, and `NetworkError::ReservedLabel` for a user
    /// label inside the reserved namespace.
    pub fn validate(&self) -> Result<(), PodnetError> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(invalid_value("network.name", "", "cannot be empty"));
        }
        if self.driver.trim().is_empty() {
            return Err(invalid_value("network.driver", &self.driver, "cannot be empty"));
        }
        if let Some(key) = self.labels.keys().find(|key| is_reserved_key(key)) {
            return Err(NetworkError::ReservedLabel {
                key: key.clone(),
                namespace: String::from(LABEL_NAMESPACE),
            }
            .into());
        }
        self.ipam.as_ref().map_or(Ok(()), IpamSettings::validate)
    }

    /// Build the engine create payload for `name` in `session`.
    pub(crate) fn to_create_request(&self, name: &str, session: &SessionId) -> NetworkCreateRequest {
        let mut labels: HashMap<String, String> = self
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        labels.extend(generic_labels(session));

        NetworkCreateRequest {
            name: String::from(name),
            driver: Some(String::from(self.driver.trim())),
            attachable: Some(self.attachable),
            internal: Some(self.internal),
            enable_ipv6: Some(self.enable_ipv6),
            ipam: self.ipam.clone().map(Ipam::from),
            labels: Some(labels),
            ..NetworkCreateRequest::default()
        }
    }
}

fn validate_cidr(field: &str, value: &str) -> Result<(), PodnetError> {
    let Some((address, prefix)) = value.split_once('/') else {
        return Err(invalid_value(field, value, "expected address/prefix"));
    };
    let ip = address
        .parse::<IpAddr>()
        .map_err(|_| invalid_value(field, value, "not an IP address"))?;
    let max_prefix = if ip.is_ipv4() { 32 } else { 128 };
    match prefix.parse::<u8>() {
        Ok(length) if length <= max_prefix => Ok(()),
        _ => Err(invalid_value(field, value, "invalid prefix length")),
    }
}

fn validate_address(field: &str, value: &str) -> Result<(), PodnetError> {
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| invalid_value(field, value, "not an IP address"))
}

fn invalid_value(field: &str, value: &str, reason: &str) -> PodnetError {
    ConfigError::InvalidValue {
        field: String::from(field),
        reason: format!("{reason}: '{value}'"),
    }
    .into()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
