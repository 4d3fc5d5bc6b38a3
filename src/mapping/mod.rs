//! # Handler Mapping Module
//!
//! Registries that resolve a request to a [`Handler`], and the ordered
//! directory that queries them.
//!
//! ## Registries
//!
//! - [`DiscoveryHandlerMapping`] builds its table from a
//!   [`ControllerSource`](crate::discovery::ControllerSource). It is
//!   parameterized by a [`DiscoveryStrategy`]; the two stock strategies select
//!   marker-annotated controllers ([`DiscoveryStrategy::ANNOTATED`]) and
//!   controllers implementing the legacy capability
//!   ([`DiscoveryStrategy::INTERFACE`]).
//! - [`ManualHandlerMapping`] holds legacy controllers wired by hand.
//!
//! ## Lifecycle
//!
//! Registries are collected in a [`HandlerMappingsBuilder`] and initialized
//! together by [`HandlerMappingsBuilder::initialize`], which consumes the
//! builder and returns the read-only [`HandlerMappings`]. Route tables are
//! never written after that point.
//!
//! ## Collisions
//!
//! Inside one registry a repeated key follows its [`DuplicatePolicy`]. Across
//! registries the directory stops at the first match, so the registry added
//! first wins.

mod directory;
mod discovery;
mod manual;
mod table;

pub use directory::{HandlerMappings, HandlerMappingsBuilder};
pub use discovery::{ControllerInstances, DiscoveryHandlerMapping, DiscoveryStrategy};
pub use manual::ManualHandlerMapping;
pub use table::{DuplicatePolicy, RouteSummary};

use crate::error::InitError;
use crate::handler::Handler;
use crate::server::HttpRequest;

/// A registry of routes.
pub trait HandlerMapping: Send + Sync {
    /// Name used in logs and route listings
    fn name(&self) -> &str;

    /// Populate the route table. Called exactly once, before any lookup.
    fn initialize(&mut self) -> Result<(), InitError>;

    /// Resolve a request. `None` means no route matched, which is not an error.
    fn get_handler(&self, request: &HttpRequest) -> Option<Handler>;

    fn routes(&self) -> Vec<RouteSummary>;
}
