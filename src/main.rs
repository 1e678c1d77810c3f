//! `podnet` application entry point.
//!
//! This binary manages test-scoped container networks from the command line.
//! It uses `eyre` for opaque error handling at the application boundary,
//! converting domain-specific errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/podnet/config.toml` or path from `PODNET_CONFIG_PATH`)
//! 3. Environment variables (`PODNET_*`)
//! 4. Command-line arguments

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use mockable::DefaultEnv;
use podnet::api::{
    CreateNetworkParams, connect_engine_async, create_network_async, remove_networks_async,
};
use podnet::config::{AppConfig, Cli, Commands, CreateArgs, ListArgs, load_config};
use podnet::engine::EngineConnector;
use podnet::error::Result as PodnetResult;
use podnet::network::{
    ContainerNetworkView, DockerNetwork, NetworkDetails, NetworkSession, SessionScope,
};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// Installs logging, loads configuration, then runs the subcommand on a
/// Tokio runtime.
fn main() -> EyreResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli).map_err(Report::from)?;
    let runtime = EngineConnector::create_runtime().map_err(Report::from)?;

    runtime.block_on(run(&cli, &config)).map_err(Report::from)
}

/// Log to stderr. `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute the CLI command, returning domain-specific errors.
async fn run(cli: &Cli, config: &AppConfig) -> PodnetResult<()> {
    let docker = connect_engine_async(config, &DefaultEnv::new()).await?;
    let session = NetworkSession::from_app_config(config)?;

    match &cli.command {
        Commands::Create(args) => {
            let params = create_params(args);
            let network =
                create_network_async(&session, &docker, &config.network, &params).await?;
            print_created(&network);
        }
        Commands::Ls(args) => {
            let networks = session.list_networks_async(&docker, scope(args)).await?;
            print_networks(&networks);
        }
        Commands::Inspect(args) => {
            let details = session.require_network_async(&docker, &args.network).await?;
            print_details(&details);
        }
        Commands::Rm(args) => {
            let removed = remove_networks_async(&session, &docker, &args.networks).await?;
            print_names(&removed);
        }
        Commands::Prune(args) => {
            let removed = session.prune_networks_async(&docker, scope(args)).await?;
            print_names(&removed);
        }
        Commands::Container(args) => {
            let view =
                EngineConnector::inspect_container_networks_async(&docker, &args.container).await?;
            print_container(&view);
        }
    }
    Ok(())
}

fn create_params(args: &CreateArgs) -> CreateNetworkParams {
    CreateNetworkParams {
        name: args.name.clone(),
        driver: args.driver.clone(),
        attachable: args.attachable,
        internal: args.internal,
        enable_ipv6: args.ipv6,
        labels: args.labels.clone(),
        subnet: args.subnet.clone(),
        gateway: args.gateway.clone(),
        ip_range: args.ip_range.clone(),
        ipam_driver: args.ipam_driver.clone(),
    }
}

const fn scope(args: &ListArgs) -> SessionScope {
    if args.all_sessions {
        SessionScope::AllSessions
    } else {
        SessionScope::CurrentSession
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(12).collect()
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_created(network: &DockerNetwork) {
    println!(
        "{}\t{}",
        network.id().map(short_id).unwrap_or_default(),
        network.name()
    );
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_networks(networks: &[NetworkDetails]) {
    println!("NETWORK ID\tNAME\tDRIVER\tSESSION");
    for details in networks {
        println!(
            "{}\t{}\t{}\t{}",
            short_id(&details.id),
            details.name,
            details.driver.as_deref().unwrap_or("-"),
            details.session_id().unwrap_or("-")
        );
    }
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_details(details: &NetworkDetails) {
    println!("id:          {}", details.id);
    println!("name:        {}", details.name);
    println!("driver:      {}", details.driver.as_deref().unwrap_or("-"));
    println!("attachable:  {}", details.attachable);
    println!("internal:    {}", details.internal);
    println!("enable_ipv6: {}", details.enable_ipv6);
    for (key, value) in &details.labels {
        println!("label:       {key}={value}");
    }
    let pools = details
        .ipam
        .as_ref()
        .map(|ipam| ipam.pools.as_slice())
        .unwrap_or_default();
    for pool in pools {
        println!(
            "subnet:      {} gateway {}",
            pool.subnet.as_deref().unwrap_or("-"),
            pool.gateway.as_deref().unwrap_or("-")
        );
    }
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_names(names: &[String]) {
    for name in names {
        println!("{name}");
    }
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_container(view: &ContainerNetworkView) {
    println!("NETWORK\tIP ADDRESS\tALIASES");
    for (network, aliases) in view.network_aliases() {
        println!(
            "{network}\t{}\t{}",
            view.ip_on(network).unwrap_or("-"),
            aliases.join(",")
        );
    }
}
