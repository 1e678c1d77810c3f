//! Configuration system for podnet.
//!
//! This module provides the configuration structures and CLI definitions for the
//! podnet application. Configuration loading and precedence merging is handled by
//! the `ortho_config` crate. Precedence: CLI flags override environment
//! variables, which override configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/podnet/config.toml` by default.
//!
//! # Example Configuration
//!
//! ```toml
//! engine_socket = "unix:///run/user/1000/podman/podman.sock"
//! session_id = "ci-run-42"
//!
//! [network]
//! driver = "bridge"
//! attachable = true
//! internal = false
//! enable_ipv6 = false
//! timeout_secs = 60
//! ```

mod cli;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Commands, ContainerArgs, CreateArgs, InspectArgs, ListArgs, RemoveArgs};
pub use loader::{env_var_names, load_config, load_config_with_env};
pub use types::{AppConfig, NetworkConfig};
