//! Then-step assertions for network behavioural scenarios.

use std::collections::BTreeMap;

use bollard::models::Network;
use podnet::network::{
    ContainerNetworkView, IpamPool, IpamSettings, LABEL_SESSION_ID, generic_labels,
};
use rstest_bdd_macros::then;

use super::engine::networks;
use super::state::{FailureKind, NetworkState, StepResult};

fn engine_networks(network_state: &NetworkState) -> StepResult<Vec<Network>> {
    networks(&network_state.engine_record()?)
}

fn latest_engine_network(network_state: &NetworkState) -> StepResult<Network> {
    let network = network_state.latest_network()?;
    engine_networks(network_state)?
        .into_iter()
        .find(|held| held.name.as_deref() == Some(network.name()))
        .ok_or_else(|| format!("engine does not hold network {}", network.name()))
}

fn engine_labels(network: &Network) -> BTreeMap<String, String> {
    network
        .labels
        .clone()
        .unwrap_or_default()
        .into_iter()
        .collect()
}

fn holds_network(network_state: &NetworkState, name: &str) -> StepResult<bool> {
    Ok(engine_networks(network_state)?
        .iter()
        .any(|network| network.name.as_deref() == Some(name)))
}

fn expect_failure(network_state: &NetworkState, expected: FailureKind) -> StepResult<()> {
    let (kind, message) = network_state
        .failure
        .get()
        .ok_or_else(|| String::from("expected the operation to fail"))?;
    if kind == expected {
        return Ok(());
    }
    Err(format!("expected {expected:?} failure, got {kind:?}: {message}"))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| String::from(item.trim())).collect()
}

#[then("the engine holds {count} network")]
fn engine_holds_one(network_state: &NetworkState, count: usize) -> StepResult<()> {
    engine_holds_count(network_state, count)
}

#[then("the engine holds {count} networks")]
fn engine_holds_count(network_state: &NetworkState, count: usize) -> StepResult<()> {
    let held = engine_networks(network_state)?.len();
    if held == count {
        return Ok(());
    }
    Err(format!("expected {count} engine networks, found {held}"))
}

#[then("the engine holds network {name}")]
fn engine_holds_network(network_state: &NetworkState, name: String) -> StepResult<()> {
    if holds_network(network_state, &name)? {
        return Ok(());
    }
    Err(format!("expected the engine to hold network {name}"))
}

#[then("the engine does not hold network {name}")]
fn engine_lacks_network(network_state: &NetworkState, name: String) -> StepResult<()> {
    if holds_network(network_state, &name)? {
        return Err(format!("expected network {name} to be removed"));
    }
    Ok(())
}

#[then("the engine reports the network as attachable and internal")]
fn engine_reports_attachable_internal(network_state: &NetworkState) -> StepResult<()> {
    let network = latest_engine_network(network_state)?;
    if network.attachable == Some(true) && network.internal == Some(true) {
        return Ok(());
    }
    Err(format!(
        "expected attachable and internal network, got attachable={:?} internal={:?}",
        network.attachable, network.internal
    ))
}

#[then("the engine reports the network as neither attachable nor internal")]
fn engine_reports_plain_network(network_state: &NetworkState) -> StepResult<()> {
    let network = latest_engine_network(network_state)?;
    if network.attachable.unwrap_or(false) || network.internal.unwrap_or(false) {
        return Err(format!(
            "expected a plain network, got attachable={:?} internal={:?}",
            network.attachable, network.internal
        ));
    }
    Ok(())
}

#[then("the engine reports label {key} with value {value}")]
fn engine_reports_label(network_state: &NetworkState, key: String, value: String) -> StepResult<()> {
    let labels = engine_labels(&latest_engine_network(network_state)?);
    match labels.get(&key) {
        Some(actual) if *actual == value => Ok(()),
        other => Err(format!("expected label {key}={value}, got {other:?}")),
    }
}

#[then("the engine reports the generic labels")]
fn engine_reports_generic_labels(network_state: &NetworkState) -> StepResult<()> {
    let session = network_state.current_session()?;
    let labels = engine_labels(&latest_engine_network(network_state)?);
    let missing: Vec<_> = generic_labels(session.session_id())
        .into_iter()
        .filter(|(key, value)| labels.get(key) != Some(value))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(format!("missing generic labels: {missing:?}"))
}

#[then("the engine labels are the generic labels plus {label}")]
fn engine_labels_are_exact(network_state: &NetworkState, label: String) -> StepResult<()> {
    let session = network_state.current_session()?;
    let (key, value) = label
        .split_once('=')
        .ok_or_else(|| format!("label {label} has no '='"))?;
    let mut expected = generic_labels(session.session_id());
    expected.insert(String::from(key), String::from(value));

    let actual = engine_labels(&latest_engine_network(network_state)?);
    if actual == expected {
        return Ok(());
    }
    Err(format!("expected labels {expected:?}, got {actual:?}"))
}

#[then("the lookup returns the requested IPAM settings")]
fn lookup_returns_ipam(network_state: &NetworkState) -> StepResult<()> {
    let found = network_state
        .found
        .get()
        .flatten()
        .ok_or_else(|| String::from("expected the lookup to find the network"))?;
    let session = network_state.current_session()?;
    if found.session_id() != Some(session.session_id().as_str()) {
        return Err(format!(
            "expected {LABEL_SESSION_ID} to match the session, got {:?}",
            found.session_id()
        ));
    }

    let expected = IpamSettings {
        driver: None,
        pools: vec![IpamPool {
            subnet: Some(String::from("10.1.1.0/24")),
            gateway: Some(String::from("10.1.1.254")),
            auxiliary_addresses: BTreeMap::from([(
                String::from("host1"),
                String::from("10.1.1.5"),
            )]),
            ..IpamPool::default()
        }],
        options: BTreeMap::from([(String::from("driver"), String::from("host-local"))]),
    };
    if found.ipam.as_ref() == Some(&expected) {
        return Ok(());
    }
    Err(format!("expected IPAM {expected:?}, got {:?}", found.ipam))
}

#[then("the operation fails with a reserved label error")]
fn fails_with_reserved_label(network_state: &NetworkState) -> StepResult<()> {
    expect_failure(network_state, FailureKind::ReservedLabel)
}

#[then("the operation fails with a timeout error")]
fn fails_with_timeout(network_state: &NetworkState) -> StepResult<()> {
    expect_failure(network_state, FailureKind::Timeout)
}

#[then("the container reports {count} network")]
fn container_reports_network_count(network_state: &NetworkState, count: usize) -> StepResult<()> {
    let view = latest_container(network_state)?;
    let attached = view.networks().len();
    if attached == count {
        return Ok(());
    }
    Err(format!("expected {count} networks, found {attached}"))
}

#[then("the container reports networks {names}")]
fn container_reports_networks(network_state: &NetworkState, names: String) -> StepResult<()> {
    let view = latest_container(network_state)?;
    let expected = split_list(&names);
    if view.networks() == expected {
        return Ok(());
    }
    Err(format!(
        "expected networks {expected:?}, got {:?}",
        view.networks()
    ))
}

#[then("the container answers to aliases {aliases} on {network}")]
fn container_answers_to_aliases(
    network_state: &NetworkState,
    aliases: String,
    network: String,
) -> StepResult<()> {
    let view = latest_container(network_state)?;
    let reported = view
        .network_aliases()
        .get(network.as_str())
        .map(|list| list.to_vec())
        .unwrap_or_default();
    let missing: Vec<_> = split_list(&aliases)
        .into_iter()
        .filter(|alias| !reported.contains(alias))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(format!("aliases {missing:?} missing on {network}, got {reported:?}"))
}

#[then("the container has an IP address")]
fn container_has_ip(network_state: &NetworkState) -> StepResult<()> {
    latest_container(network_state)?
        .container_ip()
        .map(|_| ())
        .map_err(|error| error.to_string())
}

#[then("the container reports {count} IP addresses")]
fn container_reports_ip_count(network_state: &NetworkState, count: usize) -> StepResult<()> {
    let view = latest_container(network_state)?;
    let found = view.container_ips().len();
    if found == count {
        return Ok(());
    }
    Err(format!("expected {count} IP addresses, found {found}"))
}

#[then("every container reports only network {network}")]
fn every_container_reports_network(network_state: &NetworkState, network: String) -> StepResult<()> {
    let containers = network_state.containers.get().unwrap_or_default();
    if containers.len() < 2 {
        return Err(format!("expected several containers, found {}", containers.len()));
    }
    for view in &containers {
        if view.networks() != [network.as_str()] {
            return Err(format!(
                "container {} reports {:?}",
                view.container_id(),
                view.networks()
            ));
        }
    }
    Ok(())
}

#[then("every request has {networks} network and {aliases} alias entry")]
fn every_request_has(
    network_state: &NetworkState,
    networks: usize,
    aliases: usize,
) -> StepResult<()> {
    let requests = network_state.requests.get().unwrap_or_default();
    if requests.is_empty() {
        return Err(String::from("no container requests were built"));
    }
    let offending = requests.iter().position(|request| {
        request.networks().len() != networks || request.network_aliases().len() != aliases
    });
    match offending {
        None => Ok(()),
        Some(index) => Err(format!("request {index} has unexpected networks or aliases")),
    }
}

#[then("the request lists network {network} with aliases {aliases}")]
fn request_lists_network(
    network_state: &NetworkState,
    network: String,
    aliases: String,
) -> StepResult<()> {
    let request = network_state.latest_request()?;
    if request.networks() != [network.clone()] {
        return Err(format!(
            "expected only network {network}, got {:?}",
            request.networks()
        ));
    }
    let expected = split_list(&aliases);
    if request.network_aliases().get(&network) == Some(&expected) {
        return Ok(());
    }
    Err(format!(
        "expected aliases {expected:?} on {network}, got {:?}",
        request.network_aliases()
    ))
}

#[then("the request lists the created network with aliases {aliases}")]
fn request_lists_created_network(network_state: &NetworkState, aliases: String) -> StepResult<()> {
    let network = network_state.latest_network()?;
    request_lists_network(network_state, String::from(network.name()), aliases)
}

#[then("the attached handle has no engine ID")]
fn attached_handle_is_synthetic(network_state: &NetworkState) -> StepResult<()> {
    let network = network_state.latest_network()?;
    if network.is_synthetic() && network.id().is_none() {
        return Ok(());
    }
    Err(format!("expected a synthetic handle, got {network:?}"))
}

#[then("the request has no networks and no aliases")]
fn request_is_empty(network_state: &NetworkState) -> StepResult<()> {
    let request = network_state.latest_request()?;
    if request.is_empty() && request.network_aliases().is_empty() {
        return Ok(());
    }
    Err(format!("expected an empty request, got {request:?}"))
}

fn latest_container(network_state: &NetworkState) -> StepResult<ContainerNetworkView> {
    network_state
        .containers
        .get()
        .and_then(|containers| containers.last().cloned())
        .ok_or_else(|| String::from("no container has been started"))
}
