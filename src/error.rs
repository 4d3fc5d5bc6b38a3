//! Error taxonomy.
//!
//! [`InitError`] is raised while the registries are being built and aborts
//! startup. [`DispatchError`] is raised inside one dispatch cycle and is always
//! converted into a 500 response by the dispatcher. "No route matched" is not an
//! error at all; it is [`DispatchOutcome::NotFound`](crate::dispatcher::DispatchOutcome::NotFound).

use crate::router::RouteKey;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("controller `{controller}` has no zero-argument constructor")]
    MissingConstructor { controller: &'static str },

    #[error("route {key} is mapped to both `{existing}` and `{duplicate}`")]
    DuplicateRoute {
        key: RouteKey,
        existing: String,
        duplicate: String,
    },

    #[error("handler mapping `{mapping}` was already initialized")]
    AlreadyInitialized { mapping: String },

    #[error("failed to load dispatch configuration from {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler mapping panicked while resolving the request.
    #[error("handler lookup failed")]
    Routing {
        #[source]
        source: anyhow::Error,
    },

    /// An adapter panicked while deciding whether it supports the handler.
    #[error("adapter lookup for handler `{handler}` failed")]
    Adapting {
        handler: String,
        #[source]
        source: anyhow::Error,
    },

    /// The registries produced a handler no adapter accepts. This is a wiring defect.
    #[error("no handler adapter supports handler `{handler}`")]
    NoAdapter { handler: String },

    #[error("handler `{handler}` failed")]
    Invocation {
        handler: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("view `{view}` failed to render the result of `{handler}`")]
    Render {
        handler: String,
        view: String,
        #[source]
        source: anyhow::Error,
    },
}
