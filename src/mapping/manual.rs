use super::table::{DuplicatePolicy, RouteSummary, RouteTable};
use super::HandlerMapping;
use crate::error::InitError;
use crate::handler::{Controller, Handler};
use crate::router::{RequestMethod, RouteKey};
use crate::server::HttpRequest;
use std::sync::Arc;
use tracing::info;

/// Registry for legacy [`Controller`] objects wired by hand.
///
/// Controllers are collected with [`with_controller`](Self::with_controller)
/// before the mapping is handed to the directory. They only become routable
/// once [`initialize`](HandlerMapping::initialize) has run.
pub struct ManualHandlerMapping {
    name: String,
    pending: Vec<(RouteKey, Arc<dyn Controller>)>,
    table: RouteTable,
    initialized: bool,
}

impl Default for ManualHandlerMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHandlerMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::named("manual")
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending: Vec::new(),
            table: RouteTable::new(DuplicatePolicy::default()),
            initialized: false,
        }
    }

    #[must_use]
    pub fn with_controller(
        mut self,
        path: impl Into<String>,
        method: RequestMethod,
        controller: Arc<dyn Controller>,
    ) -> Self {
        self.pending.push((RouteKey::new(path, method), controller));
        self
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.table.set_policy(policy);
        self
    }
}

impl HandlerMapping for ManualHandlerMapping {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) -> Result<(), InitError> {
        if self.initialized {
            return Err(InitError::AlreadyInitialized {
                mapping: self.name.clone(),
            });
        }
        for (key, controller) in std::mem::take(&mut self.pending) {
            self.table
                .insert(&self.name, key, Handler::Controller(controller))?;
        }
        self.initialized = true;
        info!(
            mapping = %self.name,
            routes = self.table.len(),
            "Handler mapping initialized"
        );
        Ok(())
    }

    fn get_handler(&self, request: &HttpRequest) -> Option<Handler> {
        self.table.lookup(request)
    }

    fn routes(&self) -> Vec<RouteSummary> {
        self.table.summaries()
    }
}
