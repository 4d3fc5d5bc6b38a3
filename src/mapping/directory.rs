use super::table::RouteSummary;
use super::HandlerMapping;
use crate::error::InitError;
use crate::handler::Handler;
use crate::router::RouteKey;
use crate::server::HttpRequest;
use std::collections::HashMap;
use tracing::{info, warn};

/// Collects registries before startup. Consumed by [`initialize`](Self::initialize).
#[derive(Default)]
pub struct HandlerMappingsBuilder {
    mappings: Vec<Box<dyn HandlerMapping>>,
}

impl HandlerMappingsBuilder {
    /// Append a registry. Earlier registries take precedence at lookup time.
    #[must_use]
    pub fn with_mapping(mut self, mapping: impl HandlerMapping + 'static) -> Self {
        self.mappings.push(Box::new(mapping));
        self
    }

    /// Initialize every registry in registration order and freeze the result.
    ///
    /// The first failure aborts startup; nothing partially initialized escapes.
    pub fn initialize(mut self) -> Result<HandlerMappings, InitError> {
        for mapping in &mut self.mappings {
            mapping.initialize()?;
        }

        let mut owners: HashMap<RouteKey, &str> = HashMap::new();
        for mapping in &self.mappings {
            for summary in mapping.routes() {
                match owners.get(&summary.key) {
                    Some(owner) => warn!(
                        route = %summary.key,
                        mapping = mapping.name(),
                        shadowed_by = owner,
                        "Route is shadowed by an earlier handler mapping"
                    ),
                    None => {
                        owners.insert(summary.key, mapping.name());
                    }
                }
            }
        }

        info!(
            mappings = self.mappings.len(),
            routes = owners.len(),
            "Handler mappings initialized"
        );
        Ok(HandlerMappings {
            mappings: self.mappings,
        })
    }
}

/// Ordered, initialized registries.
///
/// There is no way to add or mutate a registry once this value exists, so it
/// can be shared across threads and read without locking.
pub struct HandlerMappings {
    mappings: Vec<Box<dyn HandlerMapping>>,
}

impl HandlerMappings {
    #[must_use]
    pub fn builder() -> HandlerMappingsBuilder {
        HandlerMappingsBuilder::default()
    }

    /// Ask each registry in order; the first match wins.
    #[must_use]
    pub fn find_handler(&self, request: &HttpRequest) -> Option<Handler> {
        self.mappings.iter().find_map(|m| m.get_handler(request))
    }

    /// Every registry's table, in directory order. Shadowed entries are included.
    #[must_use]
    pub fn routes(&self) -> Vec<(String, RouteSummary)> {
        self.mappings
            .iter()
            .flat_map(|m| {
                let name = m.name().to_string();
                m.routes().into_iter().map(move |r| (name.clone(), r))
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
