use super::{ControllerAdapter, DescriptorAdapter, HandlerAdapter};
use crate::error::DispatchError;
use crate::handler::Handler;
use crate::view::ViewResolver;
use std::sync::Arc;

/// Ordered, immutable set of adapters.
pub struct HandlerAdapters {
    adapters: Vec<Box<dyn HandlerAdapter>>,
}

impl HandlerAdapters {
    #[must_use]
    pub fn new(adapters: Vec<Box<dyn HandlerAdapter>>) -> Self {
        Self { adapters }
    }

    /// One adapter per handler shape: descriptors first, then legacy controllers.
    #[must_use]
    pub fn with_defaults(resolver: Arc<dyn ViewResolver>) -> Self {
        Self::new(vec![
            Box::new(DescriptorAdapter),
            Box::new(ControllerAdapter::new(resolver)),
        ])
    }

    /// The first adapter supporting `handler`.
    pub fn find_adapter(&self, handler: &Handler) -> Result<&dyn HandlerAdapter, DispatchError> {
        self.adapters
            .iter()
            .find(|a| a.supports(handler))
            .map(|a| a.as_ref())
            .ok_or_else(|| DispatchError::NoAdapter {
                handler: handler.describe(),
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
