//! Network lifecycle through the container engine.
//!
//! A [`NetworkSession`] stamps its generic labels on every network it
//! creates and bounds every engine call by its timeout.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::time::Duration;

use bollard::query_parameters::ListNetworksOptions;
use futures_util::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::handle::{DockerNetwork, NetworkDetails};
use super::labels::{SessionId, SessionScope, generic_labels, managed_network_filters};
use super::options::NetworkOptions;
use crate::config::AppConfig;
use crate::engine::NetworkEngine;
use crate::error::{NetworkError, PodnetError};

/// Deadline applied to each engine call when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared context for network operations in one test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSession {
    session_id: SessionId,
    timeout: Duration,
}

impl Default for NetworkSession {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkSession {
    /// Create a session using the process-wide session ID and the default
    /// timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_id: SessionId::process(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a session from the resolved application configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the configured session ID is
    /// blank.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, PodnetError> {
        let session_id = config
            .session_id
            .as_deref()
            .map_or_else(|| Ok(SessionId::process()), SessionId::new)?;

        Ok(Self::new()
            .with_session_id(session_id)
            .with_timeout(Duration::from_secs(config.network.timeout_secs)))
    }

    /// Use an explicit session ID.
    #[must_use]
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    /// Use a different per-call deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return the session ID.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Return the per-call deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Return the generic labels stamped on networks from this session.
    #[must_use]
    pub fn generic_labels(&self) -> BTreeMap<String, String> {
        generic_labels(&self.session_id)
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T, PodnetError>
    where
        F: Future<Output = Result<T, PodnetError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                warn!(operation, timeout = ?self.timeout, "network operation timed out");
                PodnetError::from(NetworkError::Timeout {
                    operation: String::from(operation),
                    millis: self.timeout.as_millis(),
                })
            })?
    }

    /// Create a network and return a handle to it.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`NetworkOptions::validate`],
    /// `NetworkError::CreateFailed` when the engine rejects the request, and
    /// `NetworkError::Timeout` when the call exceeds the session deadline.
    pub async fn create_network_async<E: NetworkEngine>(
        &self,
        engine: &E,
        options: &NetworkOptions,
    ) -> Result<DockerNetwork, PodnetError> {
        options.validate()?;

        let name = options
            .name()
            .map_or_else(|| Uuid::new_v4().to_string(), |value| String::from(value.trim()));
        let request = options.to_create_request(&name, &self.session_id);
        debug!(network = %name, driver = options.driver(), "creating network");

        let response = self
            .bounded("create", async {
                engine.create_network(request).await.map_err(|error| {
                    PodnetError::from(NetworkError::CreateFailed {
                        name: name.clone(),
                        message: error.to_string(),
                    })
                })
            })
            .await?;

        info!(network = %name, id = %response.id, session = %self.session_id, "created network");
        Ok(DockerNetwork::created(
            response.id,
            name,
            String::from(options.driver().trim()),
        ))
    }

    async fn list_with_filters<E: NetworkEngine>(
        &self,
        engine: &E,
        filters: HashMap<String, Vec<String>>,
    ) -> Result<Vec<NetworkDetails>, PodnetError> {
        let options = ListNetworksOptions {
            filters: Some(filters),
        };

        let networks = self
            .bounded("list", async {
                engine.list_networks(Some(options)).await.map_err(|error| {
                    PodnetError::from(NetworkError::ListFailed {
                        message: error.to_string(),
                    })
                })
            })
            .await?;

        Ok(networks.into_iter().map(NetworkDetails::from).collect())
    }

    /// Look up a network by exact name.
    ///
    /// The engine's `name` filter matches substrings, so results are narrowed
    /// to exact matches here.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::ListFailed` or `NetworkError::Timeout` when the
    /// engine call fails.
    pub async fn find_network_async<E: NetworkEngine>(
        &self,
        engine: &E,
        name: &str,
    ) -> Result<Option<NetworkDetails>, PodnetError> {
        let filters = HashMap::from([(String::from("name"), vec![String::from(name)])]);
        let found = self
            .list_with_filters(engine, filters)
            .await?
            .into_iter()
            .find(|details| details.name == name);
        debug!(network = name, found = found.is_some(), "looked up network");
        Ok(found)
    }

    /// Look up a network by exact name, failing when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::NotFound` when no network has that name, plus
    /// the errors of [`Self::find_network_async`].
    pub async fn require_network_async<E: NetworkEngine>(
        &self,
        engine: &E,
        name: &str,
    ) -> Result<NetworkDetails, PodnetError> {
        self.find_network_async(engine, name).await?.ok_or_else(|| {
            PodnetError::from(NetworkError::NotFound {
                name: String::from(name),
            })
        })
    }

    /// List managed networks in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::ListFailed` or `NetworkError::Timeout` when the
    /// engine call fails.
    pub async fn list_networks_async<E: NetworkEngine>(
        &self,
        engine: &E,
        scope: SessionScope,
    ) -> Result<Vec<NetworkDetails>, PodnetError> {
        let filters = managed_network_filters(scope, &self.session_id);
        self.list_with_filters(engine, filters).await
    }

    /// Remove a network by name or ID.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::RemoveFailed` when the engine rejects the
    /// removal and `NetworkError::Timeout` when the call exceeds the session
    /// deadline.
    pub async fn remove_network_async<E: NetworkEngine>(
        &self,
        engine: &E,
        name_or_id: &str,
    ) -> Result<(), PodnetError> {
        self.bounded("remove", async {
            engine.remove_network(name_or_id).await.map_err(|error| {
                PodnetError::from(NetworkError::RemoveFailed {
                    name: String::from(name_or_id),
                    message: error.to_string(),
                })
            })
        })
        .await?;
        info!(network = name_or_id, "removed network");
        Ok(())
    }

    /// Remove every managed network in `scope` and return the removed names.
    ///
    /// Removals run concurrently. Every removal is attempted even when some
    /// fail; the first failure is then returned.
    ///
    /// # Errors
    ///
    /// Returns listing errors from [`Self::list_networks_async`] and the
    /// first removal error, if any.
    pub async fn prune_networks_async<E: NetworkEngine>(
        &self,
        engine: &E,
        scope: SessionScope,
    ) -> Result<Vec<String>, PodnetError> {
        let networks = self.list_networks_async(engine, scope).await?;
        let removals = networks.iter().map(|details| async move {
            let target = if details.id.is_empty() {
                &details.name
            } else {
                &details.id
            };
            self.remove_network_async(engine, target)
                .await
                .map(|()| details.name.clone())
        });

        let mut removed = Vec::new();
        let mut first_error = None;
        for outcome in join_all(removals).await {
            match outcome {
                Ok(name) => removed.push(name),
                Err(error) => {
                    warn!(%error, "failed to prune network");
                    first_error.get_or_insert(error);
                }
            }
        }

        first_error.map_or(Ok(removed), Err)
    }
}

impl DockerNetwork {
    /// Remove this network through `session`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`NetworkSession::remove_network_async`].
    pub async fn remove_async<E: NetworkEngine>(
        &self,
        session: &NetworkSession,
        engine: &E,
    ) -> Result<(), PodnetError> {
        session.remove_network_async(engine, self.engine_ref()).await
    }
}
