//! Test-scoped container networks over the Docker-compatible engine API.
//!
//! `podnet` creates networks for integration tests, attaches them to
//! container create requests, reads container addresses back, and cleans the
//! networks up afterwards. Every network it creates carries generic labels
//! that tie it to a session, so leftovers from a run can be listed and
//! pruned.
//!
//! # Modules
//!
//! - [`api`]: Functions behind the `podnet` commands
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`engine`]: Container engine connection and client seams
//! - [`error`]: Semantic error types for the library
//! - [`network`]: Network options, sessions, attachment and inspection

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod network;
