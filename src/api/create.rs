//! Network creation from command parameters.
//!
//! Translates library-owned create parameters plus the configured network
//! defaults into [`NetworkOptions`] and creates the network through a
//! session.

use crate::config::NetworkConfig;
use crate::engine::NetworkEngine;
use crate::error::{ConfigError, PodnetError, Result as PodnetResult};
use crate::network::{DockerNetwork, IpamPool, IpamSettings, NetworkOptions, NetworkSession};

/// Parameters for creating a network.
///
/// Flags that are `false` fall back to the configured defaults, so a
/// configuration can turn a flag on for every network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateNetworkParams {
    /// Network name. A random name is used when `None`.
    pub name: Option<String>,
    /// Driver override.
    pub driver: Option<String>,
    /// Allow standalone containers to attach.
    pub attachable: bool,
    /// Cut the network off from the host.
    pub internal: bool,
    /// Enable IPv6.
    pub enable_ipv6: bool,
    /// Labels in `key=value` form.
    pub labels: Vec<String>,
    /// IPAM subnet in CIDR notation.
    pub subnet: Option<String>,
    /// IPAM gateway address.
    pub gateway: Option<String>,
    /// IPAM allocation range.
    pub ip_range: Option<String>,
    /// IPAM driver.
    pub ipam_driver: Option<String>,
}

/// Split a `key=value` label.
///
/// The value may be empty and may itself contain `=`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when there is no `=` or the key is
/// blank.
pub fn parse_label(raw: &str) -> PodnetResult<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((String::from(key.trim()), String::from(value)))
        }
        _ => Err(ConfigError::InvalidValue {
            field: String::from("label"),
            reason: format!("expected key=value, got '{raw}'"),
        }
        .into()),
    }
}

/// Build create options from configured defaults and `params`.
///
/// # Errors
///
/// Returns label parse errors from [`parse_label`], `ConfigError::InvalidValue`
/// when a gateway or IP range is given without a subnet, and validation
/// errors from [`NetworkOptions::validate`].
pub fn network_options(
    config: &NetworkConfig,
    params: &CreateNetworkParams,
) -> PodnetResult<NetworkOptions> {
    let labels = params
        .labels
        .iter()
        .map(|raw| parse_label(raw))
        .collect::<PodnetResult<Vec<_>>>()?;

    let mut options = NetworkOptions::from_network_config(config)
        .with_attachable(config.attachable || params.attachable)
        .with_internal(config.internal || params.internal)
        .with_enable_ipv6(config.enable_ipv6 || params.enable_ipv6)
        .with_labels(labels);

    if let Some(ref name) = params.name {
        options = options.with_name(name.clone());
    }
    if let Some(ref driver) = params.driver {
        options = options.with_driver(driver.clone());
    }
    let pool = ipam_pool(params)?;
    if pool.is_some() || params.ipam_driver.is_some() {
        options = options.with_ipam(IpamSettings {
            driver: params.ipam_driver.clone(),
            pools: pool.into_iter().collect(),
            ..IpamSettings::default()
        });
    }

    options.validate()?;
    Ok(options)
}

/// Create a network from `params` within `session`.
///
/// # Errors
///
/// Returns the errors of [`network_options`] and
/// [`NetworkSession::create_network_async`].
pub async fn create_network_async<E: NetworkEngine>(
    session: &NetworkSession,
    engine: &E,
    config: &NetworkConfig,
    params: &CreateNetworkParams,
) -> Result<DockerNetwork, PodnetError> {
    let options = network_options(config, params)?;
    session.create_network_async(engine, &options).await
}

/// Build the single address pool described by `params`.
///
/// A gateway or IP range only makes sense inside a subnet.
fn ipam_pool(params: &CreateNetworkParams) -> PodnetResult<Option<IpamPool>> {
    let Some(ref subnet) = params.subnet else {
        let orphan = [
            ("ipam.gateway", params.gateway.as_deref()),
            ("ipam.ip_range", params.ip_range.as_deref()),
        ]
        .into_iter()
        .find_map(|(field, value)| value.map(|set| (field, set)));
        return match orphan {
            Some((field, value)) => Err(ConfigError::InvalidValue {
                field: String::from(field),
                reason: format!("'{value}' requires a subnet"),
            }
            .into()),
            None => Ok(None),
        };
    };

    Ok(Some(IpamPool {
        subnet: Some(subnet.clone()),
        gateway: params.gateway.clone(),
        ip_range: params.ip_range.clone(),
        ..IpamPool::default()
    }))
}
