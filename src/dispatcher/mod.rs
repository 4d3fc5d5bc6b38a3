//! # Dispatcher Module
//!
//! The dispatcher is the per-request orchestration of the dispatch core. It
//! owns nothing mutable: it holds the initialized [`HandlerMappings`] and
//! [`HandlerAdapters`] behind `Arc`s and runs one short state machine per
//! request.
//!
//! ## Dispatch Cycle
//!
//! ```text
//! Routing ──no match──────────────────────────────▶ Done (404)
//!    │
//!    ▼
//! Adapting ──▶ Invoking ──▶ Rendering ──▶ Done
//!    │            │             │
//!    └────────────┴─────────────┴──────▶ Error (500)
//! ```
//!
//! - **Routing** asks the mapping directory for a handler. No match is a normal
//!   outcome: the response status becomes `404 Not Found` and nothing is rendered.
//! - **Adapting** asks the adapter directory for an adapter. A miss is a wiring
//!   defect and fails the request.
//! - **Invoking** calls the adapter. Handler errors and handler panics are both
//!   caught here.
//! - **Rendering** hands the model to the view. Failures are treated like
//!   invocation failures.
//!
//! Failed cycles answer `500 Internal Server Error` with a generic JSON body.
//! The cause goes to the log, never to the client.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use dispatch_core::adapter::HandlerAdapters;
//! use dispatch_core::dispatcher::{DispatchOutcome, Dispatcher};
//! use dispatch_core::mapping::HandlerMappings;
//! use dispatch_core::server::{HttpRequest, HttpResponse};
//! use dispatch_core::view::DefaultViewResolver;
//!
//! let mappings = HandlerMappings::builder().initialize().unwrap();
//! let adapters = HandlerAdapters::with_defaults(Arc::new(DefaultViewResolver));
//! let dispatcher = Dispatcher::new(mappings, adapters);
//!
//! let request = HttpRequest::new(http::Method::GET, "/missing");
//! let mut response = HttpResponse::new();
//! assert!(matches!(dispatcher.service(&request, &mut response), DispatchOutcome::NotFound));
//! assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
//! ```
//!
//! ## Thread Safety
//!
//! `Dispatcher` is `Clone + Send + Sync`; clones share the same directories.
//! Any number of threads may call [`Dispatcher::service`] at once.
//!
//! [`HandlerMappings`]: crate::mapping::HandlerMappings
//! [`HandlerAdapters`]: crate::adapter::HandlerAdapters

mod core;

pub use core::{DispatchOutcome, DispatchState, Dispatcher};
