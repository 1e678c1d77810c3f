//! Command-line argument definitions for podnet.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for podnet.
#[derive(Debug, Parser)]
#[command(name = "podnet")]
#[command(
    author,
    version,
    about = "Create, inspect and clean up test-scoped container networks"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Container engine socket path or URL.
    #[arg(long, global = true)]
    pub engine_socket: Option<String>,

    /// Session ID to create networks under and to scope listings to.
    #[arg(long, global = true)]
    pub session_id: Option<String>,

    /// Log engine calls at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a network.
    Create(CreateArgs),

    /// List managed networks.
    Ls(ListArgs),

    /// Show a network by exact name.
    Inspect(InspectArgs),

    /// Remove networks by name or ID.
    Rm(RemoveArgs),

    /// Remove managed networks.
    Prune(ListArgs),

    /// Show a container's networks, aliases and addresses.
    Container(ContainerArgs),
}

/// Arguments for the `create` subcommand.
#[derive(Debug, Default, Parser)]
pub struct CreateArgs {
    /// Network name. A random name is used when omitted.
    #[arg(long)]
    pub name: Option<String>,

    /// Network driver. Defaults to the configured driver.
    #[arg(long)]
    pub driver: Option<String>,

    /// Allow standalone containers to attach.
    #[arg(long)]
    pub attachable: bool,

    /// Cut the network off from the host.
    #[arg(long)]
    pub internal: bool,

    /// Enable IPv6.
    #[arg(long)]
    pub ipv6: bool,

    /// Label in `key=value` form. May be repeated.
    #[arg(long = "label")]
    pub labels: Vec<String>,

    /// IPAM subnet in CIDR notation.
    #[arg(long)]
    pub subnet: Option<String>,

    /// IPAM gateway address.
    #[arg(long, requires = "subnet")]
    pub gateway: Option<String>,

    /// IPAM range to allocate container addresses from.
    #[arg(long, requires = "subnet")]
    pub ip_range: Option<String>,

    /// IPAM driver.
    #[arg(long)]
    pub ipam_driver: Option<String>,
}

/// Arguments for the `ls` and `prune` subcommands.
#[derive(Debug, Default, Parser)]
pub struct ListArgs {
    /// Cover networks from every session, not only the current one.
    #[arg(long)]
    pub all_sessions: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Debug, Parser)]
pub struct InspectArgs {
    /// Network name.
    #[arg(required = true)]
    pub network: String,
}

/// Arguments for the `rm` subcommand.
#[derive(Debug, Parser)]
pub struct RemoveArgs {
    /// Network names or IDs.
    #[arg(required = true)]
    pub networks: Vec<String>,
}

/// Arguments for the `container` subcommand.
#[derive(Debug, Parser)]
pub struct ContainerArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,
}
