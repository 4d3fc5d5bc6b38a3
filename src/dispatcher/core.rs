use crate::adapter::HandlerAdapters;
use crate::discovery::ControllerSource;
use crate::error::{DispatchError, InitError};
use crate::handler::Handler;
use crate::mapping::{ControllerInstances, DiscoveryHandlerMapping, HandlerMappings, RouteSummary};
use crate::runtime_config::{DispatchConfig, MappingKind};
use crate::server::{HttpRequest, HttpResponse};
use crate::view::ViewResolver;
use http::StatusCode;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Stage of one dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Routing,
    Adapting,
    Invoking,
    Rendering,
    Done,
    Error,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchState::Routing => "routing",
            DispatchState::Adapting => "adapting",
            DispatchState::Invoking => "invoking",
            DispatchState::Rendering => "rendering",
            DispatchState::Done => "done",
            DispatchState::Error => "error",
        };
        f.write_str(name)
    }
}

/// How a dispatch cycle ended. The response has been populated in every case.
#[derive(Debug)]
#[must_use]
pub enum DispatchOutcome {
    /// A handler ran and its view rendered
    Completed,
    /// No registry knows the route; the status is `404 Not Found`
    NotFound,
    /// The cycle failed; the response is a generic `500 Internal Server Error`
    Failed(DispatchError),
}

impl DispatchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, DispatchOutcome::Completed)
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            DispatchOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// The dispatch core: routes a request, adapts the handler, invokes it and
/// renders the result.
#[derive(Clone)]
pub struct Dispatcher {
    mappings: Arc<HandlerMappings>,
    adapters: Arc<HandlerAdapters>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(mappings: HandlerMappings, adapters: HandlerAdapters) -> Self {
        Self {
            mappings: Arc::new(mappings),
            adapters: Arc::new(adapters),
        }
    }

    /// Build the registries named by `config`, initialize them in order and
    /// pair them with the default adapters.
    ///
    /// # Errors
    ///
    /// Any [`InitError`] raised while a registry initializes. Nothing is served
    /// from a partially built directory.
    pub fn bootstrap(
        config: &DispatchConfig,
        source: Arc<dyn ControllerSource>,
        resolver: Arc<dyn ViewResolver>,
    ) -> Result<Self, InitError> {
        let instances = Arc::new(ControllerInstances::new());
        let mut builder = HandlerMappings::builder();
        for kind in &config.mappings {
            let mapping = match kind {
                MappingKind::Annotated => {
                    DiscoveryHandlerMapping::annotated(Arc::clone(&source), config.base_packages.iter().cloned())
                }
                MappingKind::Interface => {
                    DiscoveryHandlerMapping::interface(Arc::clone(&source), config.base_packages.iter().cloned())
                }
            };
            builder = builder.with_mapping(
                mapping
                    .with_instances(Arc::clone(&instances))
                    .with_duplicate_policy(config.duplicate_routes),
            );
        }
        let mappings = builder.initialize()?;

        info!(
            mappings = ?config.mappings,
            base_packages = ?config.base_packages,
            routes = mappings.routes().len(),
            controllers = instances.len(),
            "Dispatcher bootstrapped"
        );
        Ok(Self::new(mappings, HandlerAdapters::with_defaults(resolver)))
    }

    pub fn mappings(&self) -> &HandlerMappings {
        &self.mappings
    }

    pub fn adapters(&self) -> &HandlerAdapters {
        &self.adapters
    }

    /// Every route in directory order, tagged with its registry name
    pub fn routes(&self) -> Vec<(String, RouteSummary)> {
        self.mappings.routes()
    }

    /// Run one dispatch cycle.
    ///
    /// Never panics on behalf of a registry, adapter, handler or view and never
    /// returns an error to the caller: every failure is folded into the
    /// response and reported as [`DispatchOutcome::Failed`].
    pub fn service(&self, request: &HttpRequest, response: &mut HttpResponse) -> DispatchOutcome {
        let started = Instant::now();
        let cycle = Cycle { request };
        cycle.enter(DispatchState::Routing);

        let handler = match self.route(request) {
            Ok(Some(handler)) => handler,
            Ok(None) => {
                response.set_status(StatusCode::NOT_FOUND);
                cycle.enter(DispatchState::Done);
                info!(
                    request_id = %request.request_id(),
                    method = %request.method(),
                    path = %request.path(),
                    "No handler found"
                );
                return DispatchOutcome::NotFound;
            }
            Err(err) => return cycle.fail(None, err, response, started),
        };

        match self.run(&cycle, &handler, response) {
            Ok(()) => {
                cycle.enter(DispatchState::Done);
                info!(
                    request_id = %request.request_id(),
                    method = %request.method(),
                    path = %request.path(),
                    handler = %handler.describe(),
                    status = response.status().as_u16(),
                    duration_us = started.elapsed().as_micros() as u64,
                    "Request dispatched"
                );
                DispatchOutcome::Completed
            }
            Err(err) => cycle.fail(Some(&handler), err, response, started),
        }
    }

    fn route(&self, request: &HttpRequest) -> Result<Option<Handler>, DispatchError> {
        catch_unwind(AssertUnwindSafe(|| self.mappings.find_handler(request))).map_err(|panic| {
            DispatchError::Routing {
                source: anyhow::anyhow!("handler mapping panicked: {}", panic_message(&*panic)),
            }
        })
    }

    fn run(&self, cycle: &Cycle<'_>, handler: &Handler, response: &mut HttpResponse) -> Result<(), DispatchError> {
        let request = cycle.request;

        cycle.enter(DispatchState::Adapting);
        let adapter = catch_unwind(AssertUnwindSafe(|| self.adapters.find_adapter(handler))).unwrap_or_else(|panic| {
            Err(DispatchError::Adapting {
                handler: handler.describe(),
                source: anyhow::anyhow!("handler adapter panicked: {}", panic_message(&*panic)),
            })
        })?;

        cycle.enter(DispatchState::Invoking);
        let result = catch_unwind(AssertUnwindSafe(|| adapter.handle(request, response, handler)))
            .unwrap_or_else(|panic| Err(anyhow::anyhow!("handler panicked: {}", panic_message(&*panic))));
        let model_and_view = result.map_err(|source| DispatchError::Invocation {
            handler: handler.describe(),
            source,
        })?;

        cycle.enter(DispatchState::Rendering);
        let (model, view) = model_and_view.into_parts();
        let rendered = catch_unwind(AssertUnwindSafe(|| view.render(&model, request, response)))
            .unwrap_or_else(|panic| Err(anyhow::anyhow!("view panicked: {}", panic_message(&*panic))));
        rendered.map_err(|source| DispatchError::Render {
            handler: handler.describe(),
            view: view.name().to_string(),
            source,
        })
    }
}

/// Logging context of one cycle
struct Cycle<'a> {
    request: &'a HttpRequest,
}

impl Cycle<'_> {
    fn enter(&self, state: DispatchState) {
        debug!(
            request_id = %self.request.request_id(),
            method = %self.request.method(),
            path = %self.request.path(),
            state = %state,
            "Dispatch state"
        );
    }

    /// Enter ERROR, log the cause and replace the response with a generic 500.
    fn fail(
        &self,
        handler: Option<&Handler>,
        err: DispatchError,
        response: &mut HttpResponse,
        started: Instant,
    ) -> DispatchOutcome {
        self.enter(DispatchState::Error);
        error!(
            request_id = %self.request.request_id(),
            method = %self.request.method(),
            path = %self.request.path(),
            handler = %handler.map_or_else(|| "-".to_string(), Handler::describe),
            error = %error_chain(&err),
            duration_us = started.elapsed().as_micros() as u64,
            "Dispatch failed"
        );
        response.reset_to_error(StatusCode::INTERNAL_SERVER_ERROR);
        DispatchOutcome::Failed(err)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// `outer: inner: root` rendering of an error and its sources
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
