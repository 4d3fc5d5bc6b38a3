//! # Handler Adapter Module
//!
//! Adapters decouple *how a handler is invoked* from *how it was found*. Each
//! adapter understands one [`Handler`] shape and normalizes whatever that
//! shape returns into a [`ModelAndView`].
//!
//! - [`DescriptorAdapter`] invokes [`Handler::Descriptor`] route methods.
//! - [`ControllerAdapter`] invokes [`Handler::Controller`] objects and turns
//!   the returned view name into a view through a
//!   [`ViewResolver`](crate::view::ViewResolver).
//!
//! [`HandlerAdapters`] holds them in order and returns the first adapter that
//! supports a handler. If none does, registries and adapters were wired
//! inconsistently, which is reported as
//! [`DispatchError::NoAdapter`](crate::error::DispatchError::NoAdapter).

mod controller;
mod descriptor;
mod directory;

pub use controller::ControllerAdapter;
pub use descriptor::DescriptorAdapter;
pub use directory::HandlerAdapters;

use crate::handler::Handler;
use crate::server::{HttpRequest, HttpResponse};
use crate::view::ModelAndView;

pub trait HandlerAdapter: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    fn supports(&self, handler: &Handler) -> bool;

    /// Invoke `handler`. Only called with handlers this adapter [`supports`](Self::supports).
    fn handle(
        &self,
        request: &HttpRequest,
        response: &mut HttpResponse,
        handler: &Handler,
    ) -> anyhow::Result<ModelAndView>;
}
