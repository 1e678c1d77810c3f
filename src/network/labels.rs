//! Generic labels and session identifiers carried by managed networks.
//!
//! Every network created through a [`NetworkSession`](super::NetworkSession)
//! carries the labels returned by [`generic_labels`]. They identify the
//! network as managed, record the library version, and tie the network to
//! the session that created it so it can be listed or pruned later.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

use uuid::Uuid;

use crate::error::{ConfigError, PodnetError};

/// Namespace reserved for generic labels.
pub const LABEL_NAMESPACE: &str = "io.podnet";

/// Label marking a network as managed by podnet.
pub const LABEL_MANAGED: &str = "io.podnet";

/// Label recording the library version that created the network.
pub const LABEL_VERSION: &str = "io.podnet.version";

/// Label recording the session that created the network.
pub const LABEL_SESSION_ID: &str = "io.podnet.session-id";

static PROCESS_SESSION: OnceLock<SessionId> = OnceLock::new();

/// Identifier grouping the networks created by one test run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session identifier from an explicit value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `value` is empty or
    /// whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, PodnetError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: String::from("session_id"),
                reason: String::from("cannot be empty"),
            }
            .into());
        }
        Ok(Self(String::from(trimmed)))
    }

    /// Generate a fresh random session identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Return the identifier shared by every session in this process.
    ///
    /// The value is generated on first use and stays stable afterwards.
    #[must_use]
    pub fn process() -> Self {
        PROCESS_SESSION.get_or_init(Self::generate).clone()
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which managed networks a listing or prune should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionScope {
    /// Only networks created by the current session.
    #[default]
    CurrentSession,
    /// Networks created by any session.
    AllSessions,
}

/// Build the generic labels for networks created in `session`.
#[must_use]
pub fn generic_labels(session: &SessionId) -> BTreeMap<String, String> {
    BTreeMap::from([
        (String::from(LABEL_MANAGED), String::from("true")),
        (
            String::from(LABEL_VERSION),
            String::from(env!("CARGO_PKG_VERSION")),
        ),
        (String::from(LABEL_SESSION_ID), String::from(session.as_str())),
    ])
}

/// Return whether `key` lies inside the reserved label namespace.
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    key == LABEL_NAMESPACE
        || key
            .strip_prefix(LABEL_NAMESPACE)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Engine-side list filters selecting managed networks in `scope`.
pub(crate) fn managed_network_filters(
    scope: SessionScope,
    session: &SessionId,
) -> HashMap<String, Vec<String>> {
    let mut label_filters = vec![format!("{LABEL_MANAGED}=true")];
    if scope == SessionScope::CurrentSession {
        label_filters.push(format!("{LABEL_SESSION_ID}={session}"));
    }
    HashMap::from([(String::from("label"), label_filters)])
}
