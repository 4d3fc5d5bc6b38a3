use crate::error::InitError;
use crate::handler::Handler;
use crate::router::{RequestMethod, RouteKey};
use crate::server::HttpRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// What a registry does when one of its own route keys is registered twice.
///
/// Collisions between *different* registries are not affected: the mapping
/// directory always prefers the registry that comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later registration replaces the earlier one and a warning is logged.
    #[default]
    LastWins,
    /// Initialization fails with [`InitError::DuplicateRoute`].
    Reject,
}

/// Diagnostic view of one route table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    pub key: RouteKey,
    pub handler: String,
}

/// Route table shared by the registry implementations.
///
/// Written only through `&mut self` while its registry initializes.
#[derive(Default)]
pub(crate) struct RouteTable {
    entries: HashMap<RouteKey, Handler>,
    policy: DuplicatePolicy,
}

impl RouteTable {
    pub(crate) fn new(policy: DuplicatePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
        }
    }

    pub(crate) fn set_policy(&mut self, policy: DuplicatePolicy) {
        self.policy = policy;
    }

    pub(crate) fn insert(
        &mut self,
        mapping: &str,
        key: RouteKey,
        handler: Handler,
    ) -> Result<(), InitError> {
        if let Some(existing) = self.entries.get(&key) {
            let existing = existing.describe();
            let duplicate = handler.describe();
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(InitError::DuplicateRoute {
                        key,
                        existing,
                        duplicate,
                    });
                }
                DuplicatePolicy::LastWins => {
                    warn!(
                        mapping = %mapping,
                        route = %key,
                        replaced = %existing,
                        handler = %duplicate,
                        "Route registered twice - later registration wins"
                    );
                }
            }
        }
        self.entries.insert(key, handler);
        Ok(())
    }

    /// Exact lookup of the request's path and method.
    ///
    /// Requests with a method outside [`RequestMethod`] never match.
    pub(crate) fn lookup(&self, request: &HttpRequest) -> Option<Handler> {
        let method = RequestMethod::from_http(request.method())?;
        self.entries
            .get(&RouteKey::new(request.path(), method))
            .cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries sorted by path, then method
    pub(crate) fn summaries(&self) -> Vec<RouteSummary> {
        let mut summaries: Vec<RouteSummary> = self
            .entries
            .iter()
            .map(|(key, handler)| RouteSummary {
                key: key.clone(),
                handler: handler.describe(),
            })
            .collect();
        summaries.sort_by(|a, b| {
            (a.key.path(), a.key.method().as_str()).cmp(&(b.key.path(), b.key.method().as_str()))
        });
        summaries
    }
}
