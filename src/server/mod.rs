//! # Server Module
//!
//! Transport-neutral request and response types consumed by the dispatch core.
//!
//! The network server itself is not part of this crate. A transport converts
//! whatever it receives into an [`HttpRequest`] (usually through
//! [`HttpRequest::from_http`]), calls
//! [`Dispatcher::service`](crate::dispatcher::Dispatcher::service) and writes
//! the resulting [`HttpResponse`] back (see [`HttpResponse::into_http`]).

mod request;
mod response;

pub use request::HttpRequest;
pub use response::HttpResponse;
