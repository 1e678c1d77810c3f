//! Configuration loading with layered precedence.
//!
//! Layers, lowest to highest: application defaults, configuration file,
//! environment variables, command-line arguments.
//!
//! Layers are composed with `MergeComposer` directly rather than through
//! `OrthoConfig::load()`. The `Cli` struct owns subcommand parsing and the
//! `--config` flag, and environment values are parsed here so that a
//! malformed typed value is reported instead of silently ignored.
//!
//! # Environment Variable Handling
//!
//! String fields (e.g., `PODNET_ENGINE_SOCKET`) are always accepted. Typed
//! fields such as `PODNET_NETWORK_INTERNAL` (bool) or
//! `PODNET_NETWORK_TIMEOUT_SECS` (u64) must hold valid values or loading
//! fails with `ConfigError::InvalidValue`.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::{DefaultEnv, Env};
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};
use tracing::debug;

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`).
    Bool,
    /// Unsigned 64-bit integer.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `PODNET_ENGINE_SOCKET`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["network", "internal"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "PODNET_ENGINE_SOCKET",
        path: &["engine_socket"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "PODNET_SESSION_ID",
        path: &["session_id"],
        var_type: EnvVarType::String,
    },
    // Network fields
    EnvVarSpec {
        env_var: "PODNET_NETWORK_DRIVER",
        path: &["network", "driver"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "PODNET_NETWORK_ATTACHABLE",
        path: &["network", "attachable"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "PODNET_NETWORK_INTERNAL",
        path: &["network", "internal"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "PODNET_NETWORK_ENABLE_IPV6",
        path: &["network", "enable_ipv6"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "PODNET_NETWORK_TIMEOUT_SECS",
        path: &["network", "timeout_secs"],
        var_type: EnvVarType::U64,
    },
];

/// Environment variable naming an explicit configuration file.
const CONFIG_PATH_ENV_VAR: &str = "PODNET_CONFIG_PATH";

/// Returns the list of environment variable names recognised by the config loader.
///
/// Tests use this to clear every `PODNET_*` variable without keeping a
/// separate list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
///
/// Reads through `cap_std::fs_utf8` by opening the file's parent directory.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    debug!(path = %path, "loaded configuration file");
    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Load configuration with full layer precedence from the process
/// environment.
///
/// # Errors
///
/// See [`load_config_with_env`].
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    load_config_with_env(cli, &DefaultEnv::new())
}

/// Load configuration with full layer precedence, reading environment
/// variables from `env`.
///
/// Sources, lowest to highest precedence:
/// 1. Application defaults defined in the struct
/// 2. Configuration file (`--config`, or discovered via `PODNET_CONFIG_PATH`
///    and XDG paths)
/// 3. Environment variables prefixed with `PODNET_`
/// 4. Command-line arguments (from the provided `Cli`)
///
/// # Errors
///
/// Returns `ConfigError` if configuration loading fails due to:
/// - Malformed configuration files
/// - Invalid typed environment variable values (e.g., non-boolean for
///   `PODNET_NETWORK_INTERNAL`)
/// - Network defaults that fail [`NetworkConfig::validate`](crate::config::NetworkConfig::validate)
pub fn load_config_with_env<E: Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    let config_path: Option<Utf8PathBuf> =
        cli.config.clone().filter(|p| p.exists()).or_else(|| {
            let discovery = ConfigDiscovery::builder("podnet")
                .env_var(CONFIG_PATH_ENV_VAR)
                .config_file_name("config.toml")
                .dotfile_name(".podnet.toml")
                .build();
            discovery
                .candidates()
                .into_iter()
                .filter(|p| p.exists())
                .find_map(|p| Utf8PathBuf::try_from(p).ok())
        });

    if let Some(ref path) = config_path {
        load_config_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.network.validate()?;
    Ok(config)
}

/// Collect `PODNET_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed environment variable (bool, u64)
/// has an unparseable value.
pub(crate) fn collect_env_vars<E: Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Bool => match raw_value.parse::<bool>() {
                Ok(b) => Value::Bool(b),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected bool (true/false), got '{raw_value}'"),
                    }
                    .into());
                }
            },
            EnvVarType::U64 => match raw_value.parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating intermediate
/// objects as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref socket) = cli.engine_socket {
        overrides.insert(String::from("engine_socket"), Value::String(socket.clone()));
    }

    if let Some(ref session_id) = cli.session_id {
        overrides.insert(String::from("session_id"), Value::String(session_id.clone()));
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
