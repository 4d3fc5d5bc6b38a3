//! Handler shapes produced by the registries.
//!
//! A registry resolves a request to a [`Handler`], a closed set of the two
//! shapes the adapters know how to invoke:
//!
//! - [`Handler::Descriptor`]: a route method discovered on a controller type,
//!   bound to the single shared instance of that type.
//! - [`Handler::Controller`]: an object implementing the legacy [`Controller`]
//!   capability, invoked through its well-known [`Controller::execute`] method.
//!
//! # Thread safety
//!
//! Controller instances are created once at startup and shared by every
//! request routed to them. Several dispatch cycles may call the same instance at
//! the same time and nothing in the dispatch core serializes those calls. Controller
//! types must therefore be `Send + Sync`, and any interior state they keep must
//! be synchronized by the controller itself.

use crate::server::{HttpRequest, HttpResponse};
use crate::view::ModelAndView;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The one shared instance of a controller type
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// Type-erased entry point of a route method.
///
/// Receives the controller instance the descriptor was bound to.
pub type InvokeFn =
    fn(&(dyn Any + Send + Sync), &HttpRequest, &mut HttpResponse) -> anyhow::Result<ModelAndView>;

/// Legacy capability interface: a controller that handles a request through a
/// single well-known method and answers with the name of a view.
pub trait Controller: Send + Sync {
    fn execute(&self, request: &HttpRequest, response: &mut HttpResponse)
        -> anyhow::Result<String>;

    /// Name used in log lines and route listings
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Binds one route method to the shared instance of its controller.
///
/// Immutable after construction. Every `(path, method)` key declared by the same
/// route method points at the same `Arc<HandlerDescriptor>`.
pub struct HandlerDescriptor {
    controller: &'static str,
    method_name: &'static str,
    instance: SharedInstance,
    invoke: InvokeFn,
}

impl HandlerDescriptor {
    #[must_use]
    pub fn new(
        controller: &'static str,
        method_name: &'static str,
        instance: SharedInstance,
        invoke: InvokeFn,
    ) -> Self {
        Self {
            controller,
            method_name,
            instance,
            invoke,
        }
    }

    /// Fully qualified type name of the controller
    #[must_use]
    pub fn controller(&self) -> &'static str {
        self.controller
    }

    #[must_use]
    pub fn method_name(&self) -> &'static str {
        self.method_name
    }

    #[must_use]
    pub fn instance(&self) -> &SharedInstance {
        &self.instance
    }

    /// Call the bound route method on the shared instance.
    pub fn execute(
        &self,
        request: &HttpRequest,
        response: &mut HttpResponse,
    ) -> anyhow::Result<ModelAndView> {
        (self.invoke)(self.instance.as_ref(), request, response)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("controller", &self.controller)
            .field("method_name", &self.method_name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.controller, self.method_name)
    }
}

/// A resolved handler, cheap to clone.
#[derive(Clone)]
pub enum Handler {
    Descriptor(Arc<HandlerDescriptor>),
    Controller(Arc<dyn Controller>),
}

impl Handler {
    /// Human-readable handler identity for logs
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Handler::Descriptor(d) => d.to_string(),
            Handler::Controller(c) => c.name().to_string(),
        }
    }

    #[must_use]
    pub fn as_descriptor(&self) -> Option<&Arc<HandlerDescriptor>> {
        match self {
            Handler::Descriptor(d) => Some(d),
            Handler::Controller(_) => None,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Descriptor(d) => f.debug_tuple("Descriptor").field(d).finish(),
            Handler::Controller(c) => f.debug_tuple("Controller").field(&c.name()).finish(),
        }
    }
}

/// Return types accepted from route methods.
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> anyhow::Result<ModelAndView>;
}

impl IntoHandlerResult for ModelAndView {
    fn into_handler_result(self) -> anyhow::Result<ModelAndView> {
        Ok(self)
    }
}

impl<E> IntoHandlerResult for Result<ModelAndView, E>
where
    E: Into<anyhow::Error>,
{
    fn into_handler_result(self) -> anyhow::Result<ModelAndView> {
        self.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        hits: AtomicUsize,
    }

    fn count(
        instance: &(dyn Any + Send + Sync),
        _request: &HttpRequest,
        _response: &mut HttpResponse,
    ) -> anyhow::Result<ModelAndView> {
        let counter = instance
            .downcast_ref::<Counter>()
            .ok_or_else(|| anyhow::anyhow!("wrong instance"))?;
        let hits = counter.hits.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ModelAndView::json().with("hits", hits))
    }

    #[test]
    fn test_descriptor_reuses_bound_instance() {
        let descriptor = HandlerDescriptor::new("Counter", "count", Arc::new(Counter::default()), count);
        let req = HttpRequest::new(Method::GET, "/count");

        for expected in 1..=3 {
            let mut res = HttpResponse::new();
            let mav = descriptor.execute(&req, &mut res).unwrap();
            assert_eq!(mav.get_object("hits"), Some(&serde_json::json!(expected)));
        }
        assert_eq!(descriptor.to_string(), "Counter::count");
    }

    #[test]
    fn test_into_handler_result() {
        assert!(ModelAndView::json().into_handler_result().is_ok());
        let failed: Result<ModelAndView, std::io::Error> =
            Err(std::io::Error::other("disk on fire"));
        let err = failed.into_handler_result().unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
    }

    struct Legacy;

    impl Controller for Legacy {
        fn execute(&self, _: &HttpRequest, _: &mut HttpResponse) -> anyhow::Result<String> {
            Ok("index".into())
        }
    }

    #[test]
    fn test_handler_describe() {
        let handler = Handler::Controller(Arc::new(Legacy));
        assert!(handler.describe().ends_with("Legacy"));
        assert!(handler.as_descriptor().is_none());
    }
}
