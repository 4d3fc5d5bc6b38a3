//! # dispatch_core
//!
//! **dispatch_core** is a small HTTP request dispatch core: it resolves an
//! incoming request to an application handler, invokes that handler through a
//! uniform adapter, and hands the result to a view for rendering.
//!
//! ## Architecture
//!
//! - **[`router`]** - [`RouteKey`](router::RouteKey): exact `(path, method)` lookup unit
//! - **[`discovery`]** - controller registrations and the sources that yield them
//! - **[`mapping`]** - handler registries and the ordered mapping directory
//! - **[`adapter`]** - handler adapters and the ordered adapter directory
//! - **[`dispatcher`]** - the per-request dispatch state machine
//! - **[`view`]** - `ModelAndView`, views and view resolution
//! - **[`server`]** - request and response representations built on `http`
//! - **[`runtime_config`]**, **[`logging`]**, **[`cli`]** - the ambient surface
//!
//! ### Request Handling Flow
//!
//! ```text
//! HttpRequest
//!   └─▶ HandlerMappings::find_handler ──none──▶ 404
//!         └─▶ HandlerAdapters::find_adapter
//!               └─▶ HandlerAdapter::handle ──▶ ModelAndView
//!                     └─▶ View::render ──▶ HttpResponse
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dispatch_core::{controller, Dispatcher, DispatchConfig, HttpRequest, HttpResponse, InventorySource};
//! use dispatch_core::view::{DefaultViewResolver, ModelAndView};
//!
//! #[derive(Default)]
//! pub struct Greeting;
//!
//! #[controller]
//! impl Greeting {
//!     #[request_mapping("/hello", method = GET)]
//!     fn hello(&self) -> ModelAndView {
//!         ModelAndView::json().with("message", "hi")
//!     }
//! }
//!
//! fn main() {
//!     let dispatcher = Dispatcher::bootstrap(
//!         &DispatchConfig::default(),
//!         Arc::new(InventorySource),
//!         Arc::new(DefaultViewResolver),
//!     )
//!     .unwrap();
//!
//!     let request = HttpRequest::new(http::Method::GET, "/hello");
//!     let mut response = HttpResponse::new();
//!     assert!(dispatcher.service(&request, &mut response).is_completed());
//!     assert_eq!(response.body(), br#""hi""#);
//! }
//! ```
//!
//! ## Runtime Considerations
//!
//! The core is synchronous and transport-agnostic. Registries are built once at
//! startup and never written again, so a single [`Dispatcher`] can be cloned
//! into any number of worker threads. Controller instances are shared by every
//! request; see [`handler`] for the thread-safety contract.

// Generated code refers to this crate by name, including from inside it.
extern crate self as dispatch_core;

pub mod adapter;
pub mod cli;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod mapping;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod view;

pub use dispatch_core_macros::{controller, interface_controller};

pub use adapter::{HandlerAdapter, HandlerAdapters};
pub use discovery::{ControllerRegistration, ControllerSource, InventorySource, StaticSource};
pub use dispatcher::{DispatchOutcome, DispatchState, Dispatcher};
pub use error::{DispatchError, InitError};
pub use handler::{Controller, Handler, HandlerDescriptor};
pub use mapping::{DiscoveryHandlerMapping, DuplicatePolicy, HandlerMapping, HandlerMappings, ManualHandlerMapping};
pub use router::{RequestMethod, RouteKey};
pub use runtime_config::DispatchConfig;
pub use server::{HttpRequest, HttpResponse};
pub use view::{ModelAndView, View, ViewResolver};

#[doc(hidden)]
pub mod __private {
    pub use anyhow;
    pub use inventory;
}
