//! Configuration data types for podnet.

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::network::{DEFAULT_DRIVER, DEFAULT_TIMEOUT};

/// Defaults for networks created by podnet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Network driver, e.g. `bridge`.
    pub driver: String,

    /// Allow standalone containers to attach.
    pub attachable: bool,

    /// Cut networks off from the host.
    pub internal: bool,

    /// Enable IPv6.
    pub enable_ipv6: bool,

    /// Deadline in seconds for each engine call.
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            driver: String::from(DEFAULT_DRIVER),
            attachable: false,
            internal: false,
            enable_ipv6: false,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl NetworkConfig {
    /// Validates the network defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the driver is blank or the
    /// timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.driver.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: String::from("network.driver"),
                reason: String::from("cannot be empty"),
            }
            .into());
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("network.timeout_secs"),
                reason: String::from("must be greater than zero"),
            }
            .into());
        }
        Ok(())
    }
}

/// Root application configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `PODNET_CONFIG_PATH` environment variable
/// 2. `.podnet.toml` in the current working directory
/// 3. `.podnet.toml` in the home directory
/// 4. `~/.config/podnet/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "PODNET",
    post_merge_hook,
    discovery(
        app_name = "podnet",
        env_var = "PODNET_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".podnet.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// The container engine socket path or URL.
    pub engine_socket: Option<String>,

    /// Session ID stamped on created networks. A random ID is used per
    /// process when unset.
    pub session_id: Option<String>,

    /// Network defaults.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub network: NetworkConfig,
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        self.session_id = self
            .session_id
            .take()
            .map(|id| String::from(id.trim()))
            .filter(|id| !id.is_empty());
        Ok(())
    }
}
