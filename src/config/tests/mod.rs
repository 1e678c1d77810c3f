//! Unit tests for podnet configuration.
//!
//! This module contains tests organised into:
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - Defaults, TOML parsing and `NetworkConfig` validation
//! - [`layer_precedence_tests`] - `MergeComposer` layer precedence tests
//! - [`loader_tests`] - Environment parsing and end-to-end loading
