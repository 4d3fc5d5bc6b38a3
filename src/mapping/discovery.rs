use super::table::{DuplicatePolicy, RouteSummary, RouteTable};
use super::HandlerMapping;
use crate::discovery::{ControllerRegistration, ControllerSource, RouteDefinition};
use crate::error::InitError;
use crate::handler::{Handler, HandlerDescriptor, SharedInstance};
use crate::router::RouteKey;
use crate::server::HttpRequest;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Which controller types and which of their methods a
/// [`DiscoveryHandlerMapping`] turns into routes.
#[derive(Clone, Copy)]
pub struct DiscoveryStrategy {
    pub name: &'static str,
    pub accepts_type: fn(&ControllerRegistration) -> bool,
    pub accepts_route: fn(&RouteDefinition) -> bool,
}

fn is_annotated(registration: &ControllerRegistration) -> bool {
    registration.annotated
}

fn implements_controller(registration: &ControllerRegistration) -> bool {
    registration.implements_controller
}

fn has_request_methods(route: &RouteDefinition) -> bool {
    !route.methods.is_empty()
}

impl DiscoveryStrategy {
    /// Types carrying the controller marker
    pub const ANNOTATED: DiscoveryStrategy = DiscoveryStrategy {
        name: "annotated",
        accepts_type: is_annotated,
        accepts_route: has_request_methods,
    };

    /// Types implementing the legacy `Controller` capability
    pub const INTERFACE: DiscoveryStrategy = DiscoveryStrategy {
        name: "interface",
        accepts_type: implements_controller,
        accepts_route: has_request_methods,
    };
}

impl fmt::Debug for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryStrategy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Controller instances keyed by type name.
///
/// A type registered by several `impl` blocks, or discovered by several
/// registries sharing one pool, is still constructed only once. Only touched
/// while registries initialize.
#[derive(Default)]
pub struct ControllerInstances {
    instances: Mutex<HashMap<&'static str, SharedInstance>>,
}

impl ControllerInstances {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared instance of the registration's type, built on first request.
    pub fn get_or_construct(&self, registration: &ControllerRegistration) -> Result<SharedInstance, InitError> {
        let mut instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = instances.get(registration.type_name) {
            return Ok(Arc::clone(instance));
        }
        let construct = registration.construct.ok_or(InitError::MissingConstructor {
            controller: registration.type_name,
        })?;
        let instance = construct();
        instances.insert(registration.type_name, Arc::clone(&instance));
        Ok(instance)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registry populated from a [`ControllerSource`].
///
/// On [`initialize`](HandlerMapping::initialize) every eligible controller type
/// is constructed exactly once through its zero-argument constructor, and each
/// eligible route method is registered under one key per declared HTTP method.
/// A type without a constructor aborts initialization.
pub struct DiscoveryHandlerMapping {
    strategy: DiscoveryStrategy,
    source: Arc<dyn ControllerSource>,
    base_packages: Vec<String>,
    instances: Arc<ControllerInstances>,
    table: RouteTable,
    initialized: bool,
}

impl DiscoveryHandlerMapping {
    pub fn new<I, S>(
        strategy: DiscoveryStrategy,
        source: Arc<dyn ControllerSource>,
        base_packages: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strategy,
            source,
            base_packages: base_packages.into_iter().map(Into::into).collect(),
            instances: Arc::new(ControllerInstances::new()),
            table: RouteTable::new(DuplicatePolicy::default()),
            initialized: false,
        }
    }

    /// Registry over marker-annotated controllers
    pub fn annotated<I, S>(source: Arc<dyn ControllerSource>, base_packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(DiscoveryStrategy::ANNOTATED, source, base_packages)
    }

    /// Registry over controllers implementing the legacy capability
    pub fn interface<I, S>(source: Arc<dyn ControllerSource>, base_packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(DiscoveryStrategy::INTERFACE, source, base_packages)
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.table.set_policy(policy);
        self
    }

    /// Share controller instances with other registries.
    #[must_use]
    pub fn with_instances(mut self, instances: Arc<ControllerInstances>) -> Self {
        self.instances = instances;
        self
    }

    fn register_controller(&mut self, registration: &ControllerRegistration) -> Result<usize, InitError> {
        let instance = self.instances.get_or_construct(registration)?;
        let mut registered = 0;

        for route in registration.routes {
            if !(self.strategy.accepts_route)(route) {
                debug!(
                    mapping = self.strategy.name,
                    controller = registration.type_name,
                    method_name = route.name,
                    path = route.path,
                    "Route method skipped - no request method declared"
                );
                continue;
            }

            let descriptor = Arc::new(HandlerDescriptor::new(
                registration.type_name,
                route.name,
                Arc::clone(&instance),
                route.invoke,
            ));
            for method in route.methods {
                let key = RouteKey::new(route.path, *method);
                debug!(
                    mapping = self.strategy.name,
                    route = %key,
                    handler = %descriptor,
                    "Route registered"
                );
                self.table.insert(
                    self.strategy.name,
                    key,
                    Handler::Descriptor(Arc::clone(&descriptor)),
                )?;
                registered += 1;
            }
        }
        Ok(registered)
    }
}

impl HandlerMapping for DiscoveryHandlerMapping {
    fn name(&self) -> &str {
        self.strategy.name
    }

    fn initialize(&mut self) -> Result<(), InitError> {
        if self.initialized {
            return Err(InitError::AlreadyInitialized {
                mapping: self.strategy.name.to_string(),
            });
        }

        let controllers: Vec<ControllerRegistration> = self
            .source
            .controllers(&self.base_packages)
            .into_iter()
            .filter(|r| (self.strategy.accepts_type)(r))
            .collect();

        let mut registered = 0;
        for registration in &controllers {
            registered += self.register_controller(registration)?;
        }
        self.initialized = true;

        info!(
            mapping = self.strategy.name,
            base_packages = ?self.base_packages,
            controllers = controllers.len(),
            registrations = registered,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{default_constructor, downcast_controller, StaticSource};
    use crate::router::RequestMethod;
    use crate::server::HttpResponse;
    use crate::view::ModelAndView;
    use http::Method;
    use std::any::Any;

    #[derive(Default)]
    struct Greeter;

    fn hello(
        instance: &(dyn Any + Send + Sync),
        _: &HttpRequest,
        _: &mut HttpResponse,
    ) -> anyhow::Result<ModelAndView> {
        downcast_controller::<Greeter>(instance)?;
        Ok(ModelAndView::json().with("message", "hi"))
    }

    fn bye(
        _: &(dyn Any + Send + Sync),
        _: &HttpRequest,
        _: &mut HttpResponse,
    ) -> anyhow::Result<ModelAndView> {
        Ok(ModelAndView::json().with("message", "bye"))
    }

    const GREETER_ROUTES: &[RouteDefinition] = &[
        RouteDefinition {
            name: "hello",
            path: "/hello",
            methods: &[RequestMethod::Get, RequestMethod::Post],
            invoke: hello,
        },
        RouteDefinition {
            name: "unmapped",
            path: "/unmapped",
            methods: &[],
            invoke: hello,
        },
    ];

    const SHADOW_ROUTES: &[RouteDefinition] = &[RouteDefinition {
        name: "bye",
        path: "/hello",
        methods: &[RequestMethod::Get],
        invoke: bye,
    }];

    fn greeter(annotated: bool, implements_controller: bool) -> ControllerRegistration {
        ControllerRegistration {
            type_name: "app::web::Greeter",
            module_path: "app::web",
            annotated,
            implements_controller,
            construct: Some(default_constructor::<Greeter>),
            routes: GREETER_ROUTES,
        }
    }

    fn shadow() -> ControllerRegistration {
        ControllerRegistration {
            type_name: "app::web::Shadow",
            module_path: "app::web",
            annotated: true,
            implements_controller: false,
            construct: Some(default_constructor::<Greeter>),
            routes: SHADOW_ROUTES,
        }
    }

    fn mapping(registrations: Vec<ControllerRegistration>) -> DiscoveryHandlerMapping {
        DiscoveryHandlerMapping::annotated(Arc::new(StaticSource::new(registrations)), ["app"])
    }

    fn descriptor(mapping: &DiscoveryHandlerMapping, method: Method, path: &str) -> Option<Arc<HandlerDescriptor>> {
        mapping
            .get_handler(&HttpRequest::new(method, path))
            .and_then(|h| h.as_descriptor().cloned())
    }

    #[test]
    fn test_each_method_gets_a_key_sharing_one_descriptor() {
        let mut m = mapping(vec![greeter(true, false)]);
        m.initialize().unwrap();

        let get = descriptor(&m, Method::GET, "/hello").unwrap();
        let post = descriptor(&m, Method::POST, "/hello").unwrap();
        assert!(Arc::ptr_eq(&get, &post));
        assert_eq!(get.method_name(), "hello");

        assert!(descriptor(&m, Method::PUT, "/hello").is_none());
        assert!(descriptor(&m, Method::GET, "/hello/").is_none());
        assert!(descriptor(&m, Method::GET, "/unmapped").is_none());
        assert_eq!(m.routes().len(), 2);
    }

    #[test]
    fn test_strategy_filters_types() {
        let mut annotated = mapping(vec![greeter(false, true)]);
        annotated.initialize().unwrap();
        assert!(annotated.routes().is_empty());

        let mut interface = DiscoveryHandlerMapping::interface(
            Arc::new(StaticSource::new(vec![greeter(false, true)])),
            ["app"],
        );
        interface.initialize().unwrap();
        assert_eq!(interface.routes().len(), 2);
    }

    #[test]
    fn test_controllers_share_one_instance() {
        let mut m = mapping(vec![greeter(true, false)]);
        m.initialize().unwrap();
        let get = descriptor(&m, Method::GET, "/hello").unwrap();
        let post = descriptor(&m, Method::POST, "/hello").unwrap();
        assert!(Arc::ptr_eq(get.instance(), post.instance()));
    }

    #[test]
    fn test_missing_constructor_aborts_initialization() {
        let mut broken = greeter(true, false);
        broken.construct = None;
        let mut m = mapping(vec![broken]);

        match m.initialize() {
            Err(InitError::MissingConstructor { controller }) => {
                assert_eq!(controller, "app::web::Greeter");
            }
            other => panic!("expected MissingConstructor, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_last_wins_by_default() {
        let mut m = mapping(vec![greeter(true, false), shadow()]);
        m.initialize().unwrap();
        assert_eq!(descriptor(&m, Method::GET, "/hello").unwrap().method_name(), "bye");
        assert_eq!(descriptor(&m, Method::POST, "/hello").unwrap().method_name(), "hello");
    }

    #[test]
    fn test_duplicate_rejected_when_configured() {
        let mut m = mapping(vec![greeter(true, false), shadow()])
            .with_duplicate_policy(DuplicatePolicy::Reject);
        let err = m.initialize().unwrap_err();
        assert!(matches!(err, InitError::DuplicateRoute { ref key, .. } if key.path() == "/hello"));
    }

    const SECOND_BLOCK_ROUTES: &[RouteDefinition] = &[RouteDefinition {
        name: "bye",
        path: "/bye",
        methods: &[RequestMethod::Get],
        invoke: bye,
    }];

    #[test]
    fn test_type_with_several_registrations_is_built_once() {
        let second_block = ControllerRegistration {
            routes: SECOND_BLOCK_ROUTES,
            ..greeter(true, false)
        };
        let mut m = mapping(vec![greeter(true, false), second_block]);
        m.initialize().unwrap();

        let hello = descriptor(&m, Method::GET, "/hello").unwrap();
        let bye = descriptor(&m, Method::GET, "/bye").unwrap();
        assert!(Arc::ptr_eq(hello.instance(), bye.instance()));
    }

    #[test]
    fn test_registries_share_instance_pool() {
        let source: Arc<dyn ControllerSource> = Arc::new(StaticSource::new(vec![greeter(true, true)]));
        let instances = Arc::new(ControllerInstances::new());
        let mut annotated = DiscoveryHandlerMapping::annotated(Arc::clone(&source), ["app"])
            .with_instances(Arc::clone(&instances));
        let mut interface = DiscoveryHandlerMapping::interface(source, ["app"]).with_instances(Arc::clone(&instances));
        annotated.initialize().unwrap();
        interface.initialize().unwrap();

        let a = descriptor(&annotated, Method::GET, "/hello").unwrap();
        let b = descriptor(&interface, Method::GET, "/hello").unwrap();
        assert!(Arc::ptr_eq(a.instance(), b.instance()));
        assert_eq!(instances.len(), 1);
    }

    #[test]
    fn test_initialize_only_once() {
        let mut m = mapping(vec![greeter(true, false)]);
        m.initialize().unwrap();
        assert!(matches!(m.initialize(), Err(InitError::AlreadyInitialized { .. })));
    }

    #[test]
    fn test_base_packages_limit_discovery() {
        let mut m = DiscoveryHandlerMapping::annotated(
            Arc::new(StaticSource::new(vec![greeter(true, false)])),
            ["elsewhere"],
        );
        m.initialize().unwrap();
        assert!(descriptor(&m, Method::GET, "/hello").is_none());
    }
}
