//! Test-scoped container networks.
//!
//! This module creates, finds, lists and removes networks through the
//! container engine, and wires networks into container create requests:
//!
//! - [`NetworkOptions`] describes a network to create.
//! - [`NetworkSession`] performs engine calls, stamping generic labels on
//!   every network it creates.
//! - [`DockerNetwork`] references a network for attachment.
//! - [`ContainerNetworking`] collects the networks and aliases for one
//!   container.
//! - [`ContainerNetworkView`] reads a running container's networks back.

mod attach;
mod handle;
mod inspect;
mod labels;
mod options;
mod session;

pub use attach::ContainerNetworking;
pub use handle::{DockerNetwork, NetworkDetails};
pub use inspect::{ContainerNetworkView, NetworkEndpoint};
pub use labels::{
    LABEL_MANAGED, LABEL_NAMESPACE, LABEL_SESSION_ID, LABEL_VERSION, SessionId, SessionScope,
    generic_labels, is_reserved_key,
};
pub use options::{DEFAULT_DRIVER, IpamPool, IpamSettings, NetworkOptions};
pub use session::{DEFAULT_TIMEOUT, NetworkSession};
