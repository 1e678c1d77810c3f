//! In-memory engine behind the behavioural scenarios.
//!
//! The mocked engine delegates to a shared [`EngineRecord`] so scenarios can
//! create networks, start containers on them, and then inspect what the
//! engine holds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bollard::errors::Error as BollardError;
use bollard::models::{
    ContainerCreateBody, ContainerInspectResponse, EndpointSettings, Network,
    NetworkCreateRequest, NetworkCreateResponse, NetworkSettings,
};
use bollard::query_parameters::ListNetworksOptions;
use mockall::mock;
use podnet::engine::{
    ContainerInspector, CreateNetworkFuture, InspectContainerFuture, ListNetworksFuture,
    NetworkEngine, RemoveNetworkFuture,
};

use super::state::StepResult;

mock! {
    #[derive(Debug)]
    pub Engine {}

    impl NetworkEngine for Engine {
        fn create_network(&self, request: NetworkCreateRequest) -> CreateNetworkFuture<'_>;
        fn list_networks(&self, options: Option<ListNetworksOptions>) -> ListNetworksFuture<'_>;
        fn remove_network(&self, name: &str) -> RemoveNetworkFuture<'_>;
    }

    impl ContainerInspector for Engine {
        fn inspect_container(&self, container_id: &str) -> InspectContainerFuture<'_>;
    }
}

/// Networks and containers held by the simulated engine.
#[derive(Debug, Default)]
pub struct EngineRecord {
    networks: Vec<Network>,
    containers: Vec<ContainerInspectResponse>,
    stalled: bool,
    next_id: u32,
}

/// Engine record shared between the scenario state and mocked engines.
pub type SharedRecord = Arc<Mutex<EngineRecord>>;

fn server_error(status_code: u16, message: impl Into<String>) -> BollardError {
    BollardError::DockerResponseServerError {
        status_code,
        message: message.into(),
    }
}

fn lock(record: &SharedRecord) -> Result<MutexGuard<'_, EngineRecord>, BollardError> {
    record
        .lock()
        .map_err(|_| server_error(500, "engine record mutex is poisoned"))
}

fn label_matches(network: &Network, filter: &str) -> bool {
    let labels = network.labels.as_ref();
    match filter.split_once('=') {
        Some((key, value)) => labels
            .and_then(|map| map.get(key))
            .is_some_and(|actual| actual == value),
        None => labels.is_some_and(|map| map.contains_key(filter)),
    }
}

fn matches_filters(network: &Network, filters: &HashMap<String, Vec<String>>) -> bool {
    let name = network.name.as_deref().unwrap_or_default();
    let names_ok = filters
        .get("name")
        .is_none_or(|wanted| wanted.iter().any(|fragment| name.contains(fragment.as_str())));
    let labels_ok = filters
        .get("label")
        .is_none_or(|wanted| wanted.iter().all(|filter| label_matches(network, filter)));
    names_ok && labels_ok
}

impl EngineRecord {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{:012}", self.next_id)
    }

    fn create_network(&mut self, request: NetworkCreateRequest) -> Result<String, BollardError> {
        if self
            .networks
            .iter()
            .any(|network| network.name.as_deref() == Some(request.name.as_str()))
        {
            return Err(server_error(
                409,
                format!("network with name {} already exists", request.name),
            ));
        }

        let id = self.allocate_id("net");
        self.networks.push(Network {
            id: Some(id.clone()),
            name: Some(request.name),
            driver: request.driver,
            attachable: request.attachable,
            internal: request.internal,
            enable_ipv6: request.enable_ipv6,
            labels: request.labels,
            ipam: request.ipam,
            ..Network::default()
        });
        Ok(id)
    }

    fn remove_network(&mut self, name_or_id: &str) -> Result<(), BollardError> {
        let before = self.networks.len();
        self.networks.retain(|network| {
            network.id.as_deref() != Some(name_or_id) && network.name.as_deref() != Some(name_or_id)
        });
        if self.networks.len() == before {
            return Err(server_error(404, format!("network {name_or_id} not found")));
        }
        Ok(())
    }
}

/// Create an empty shared record.
pub fn new_record() -> SharedRecord {
    Arc::new(Mutex::new(EngineRecord::default()))
}

/// Make every engine call hang until the caller gives up.
pub fn stall(record: &SharedRecord) -> StepResult<()> {
    lock(record).map_err(|e| e.to_string())?.stalled = true;
    Ok(())
}

/// Add a network created outside the scenario's session.
pub fn seed_network(record: &SharedRecord, request: NetworkCreateRequest) -> StepResult<()> {
    lock(record)
        .map_err(|e| e.to_string())?
        .create_network(request)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Return every network the engine holds.
pub fn networks(record: &SharedRecord) -> StepResult<Vec<Network>> {
    Ok(lock(record).map_err(|e| e.to_string())?.networks.clone())
}

/// Start a container from `body`, assigning one address per requested
/// network, and return its ID.
pub fn start_container(record: &SharedRecord, body: &ContainerCreateBody) -> StepResult<String> {
    let mut engine = lock(record).map_err(|e| e.to_string())?;
    let id = engine.allocate_id("ctr");
    let requested = body
        .networking_config
        .as_ref()
        .and_then(|config| config.endpoints_config.clone())
        .unwrap_or_default();

    let mut endpoints = HashMap::new();
    for (name, settings) in requested {
        let resolved_id = if name == "bridge" {
            Some(String::from("bridge"))
        } else {
            engine
                .networks
                .iter()
                .find(|network| network.name.as_deref() == Some(name.as_str()))
                .and_then(|network| network.id.clone())
        };
        let Some(network_id) = resolved_id else {
            return Err(format!("network {name} not found"));
        };
        let host = engine.next_id;
        engine.next_id += 1;
        endpoints.insert(
            name,
            EndpointSettings {
                network_id: Some(network_id),
                aliases: settings.aliases,
                ip_address: Some(format!("10.88.0.{host}")),
                ..EndpointSettings::default()
            },
        );
    }

    engine.containers.push(ContainerInspectResponse {
        id: Some(id.clone()),
        network_settings: Some(NetworkSettings {
            networks: Some(endpoints),
            ..NetworkSettings::default()
        }),
        ..ContainerInspectResponse::default()
    });
    Ok(id)
}

/// Build a mocked engine backed by `record`.
pub fn engine_for(record: &SharedRecord) -> MockEngine {
    let mut engine = MockEngine::new();

    let create_record = Arc::clone(record);
    engine
        .expect_create_network()
        .returning(move |request| -> CreateNetworkFuture<'static> {
            let outcome = lock(&create_record).map(|mut held| {
                if held.stalled {
                    None
                } else {
                    Some(held.create_network(request))
                }
            });
            match outcome {
                Ok(None) => Box::pin(std::future::pending()),
                Ok(Some(result)) => Box::pin(async move {
                    result.map(|id| NetworkCreateResponse {
                        id,
                        ..NetworkCreateResponse::default()
                    })
                }),
                Err(error) => Box::pin(async move { Err(error) }),
            }
        });

    let list_record = Arc::clone(record);
    engine.expect_list_networks().returning(move |options| {
        let filters = options.and_then(|o| o.filters).unwrap_or_default();
        let result = lock(&list_record).map(|held| {
            held.networks
                .iter()
                .filter(|network| matches_filters(network, &filters))
                .cloned()
                .collect::<Vec<_>>()
        });
        Box::pin(async move { result })
    });

    let remove_record = Arc::clone(record);
    engine.expect_remove_network().returning(move |name| {
        let result = lock(&remove_record).and_then(|mut held| held.remove_network(name));
        Box::pin(async move { result })
    });

    let inspect_record = Arc::clone(record);
    engine.expect_inspect_container().returning(move |container_id| {
        let result = lock(&inspect_record).and_then(|held| {
            held.containers
                .iter()
                .find(|container| container.id.as_deref() == Some(container_id))
                .cloned()
                .ok_or_else(|| server_error(404, format!("no such container: {container_id}")))
        });
        Box::pin(async move { result })
    });

    engine
}
