//! # Runtime Configuration Module
//!
//! Startup configuration for the dispatch core: where controllers live, which
//! discovery registries are assembled and in which order, and how a registry
//! treats a route key registered twice.
//!
//! ## Sources
//!
//! Configuration is read from a YAML file with [`DispatchConfig::load`] and may
//! then be overridden from the environment with [`DispatchConfig::apply_env`].
//! [`DispatchConfig::from_env`] starts from the defaults instead of a file.
//!
//! ```yaml
//! base_packages:
//!   - my_service::controllers
//! mappings: [annotated, interface]
//! duplicate_routes: reject
//! ```
//!
//! ## Environment Variables
//!
//! ### `DISPATCH_BASE_PACKAGES`
//!
//! Comma-separated module paths, e.g. `my_service::controllers,my_service::legacy`.
//! Replaces the configured list. An empty list scans every linked controller.
//!
//! ### `DISPATCH_DUPLICATE_ROUTES`
//!
//! `last_wins` (default) or `reject`.
//!
//! ## Usage
//!
//! ```rust
//! use dispatch_core::runtime_config::{DispatchConfig, MappingKind};
//!
//! let config = DispatchConfig::default();
//! assert_eq!(config.mappings, vec![MappingKind::Annotated, MappingKind::Interface]);
//! ```

use crate::error::InitError;
use crate::mapping::DuplicatePolicy;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::warn;

pub const BASE_PACKAGES_ENV: &str = "DISPATCH_BASE_PACKAGES";
pub const DUPLICATE_ROUTES_ENV: &str = "DISPATCH_DUPLICATE_ROUTES";

/// Discovery registry selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    /// Types marked with `#[controller]`
    Annotated,
    /// Types registered with `#[interface_controller]`
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Module paths scanned for controllers
    pub base_packages: Vec<String>,
    /// Registries in directory order; the first one wins on overlapping keys
    pub mappings: Vec<MappingKind>,
    pub duplicate_routes: DuplicatePolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            base_packages: Vec::new(),
            mappings: vec![MappingKind::Annotated, MappingKind::Interface],
            duplicate_routes: DuplicatePolicy::default(),
        }
    }
}

impl DispatchConfig {
    /// Read a YAML configuration file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InitError> {
        let path = path.as_ref();
        let parsed = std::fs::read_to_string(path)
            .context("failed to read configuration file")
            .and_then(|text| Self::from_yaml(&text));
        parsed.map_err(|source| InitError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        // An empty document is a valid, all-default configuration
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("invalid dispatch configuration")
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(BASE_PACKAGES_ENV) {
            self.base_packages = value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(value) = lookup(DUPLICATE_ROUTES_ENV) {
            match parse_duplicate_policy(&value) {
                Some(policy) => self.duplicate_routes = policy,
                None => warn!(
                    variable = DUPLICATE_ROUTES_ENV,
                    value = %value,
                    "Unknown duplicate route policy, keeping {:?}",
                    self.duplicate_routes
                ),
            }
        }
    }
}

fn parse_duplicate_policy(value: &str) -> Option<DuplicatePolicy> {
    match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "last_wins" => Some(DuplicatePolicy::LastWins),
        "reject" => Some(DuplicatePolicy::Reject),
        _ => None,
    }
}
