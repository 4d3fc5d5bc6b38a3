//! # View Module
//!
//! The normalized handler result ([`ModelAndView`]) and the render
//! collaborator contract ([`View`]).
//!
//! Every handler shape is normalized by its adapter into a `ModelAndView`: a
//! string-keyed model plus an opaque view. The dispatch core never looks into
//! either. It passes both to [`View::render`] together with the request and
//! response.
//!
//! Two views ship with the crate: [`JsonView`] serializes the model as a JSON
//! object and [`RedirectView`] answers with `302 Found`. Anything else (template
//! engines, streaming) is implemented by the application.

mod json;
mod redirect;

pub use json::JsonView;
pub use redirect::RedirectView;

use crate::server::{HttpRequest, HttpResponse};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Prefix that selects a [`RedirectView`] in [`DefaultViewResolver`]
pub const REDIRECT_PREFIX: &str = "redirect:";

/// Model attributes produced by a handler
pub type Model = HashMap<String, Value>;

/// Render collaborator.
///
/// Views are shared between concurrent dispatch cycles and must not keep
/// per-request state. A returned error is reported as a render failure and the
/// response is replaced with a generic 500.
pub trait View: Send + Sync {
    fn render(
        &self,
        model: &Model,
        request: &HttpRequest,
        response: &mut HttpResponse,
    ) -> anyhow::Result<()>;

    /// Short name used in log lines
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Normalized result of a handler invocation.
#[derive(Clone)]
pub struct ModelAndView {
    model: Model,
    view: Arc<dyn View>,
}

impl ModelAndView {
    pub fn new(view: Arc<dyn View>) -> Self {
        Self {
            model: Model::new(),
            view,
        }
    }

    /// Shorthand for a [`JsonView`] result
    #[must_use]
    pub fn json() -> Self {
        Self::new(Arc::new(JsonView))
    }

    /// Add a model attribute, replacing any previous value under the same name
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.model.insert(name.into(), value.into());
        self
    }

    pub fn add_object(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.model.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get_object(&self, name: &str) -> Option<&Value> {
        self.model.get(name)
    }

    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    #[must_use]
    pub fn view(&self) -> &Arc<dyn View> {
        &self.view
    }

    #[must_use]
    pub fn into_parts(self) -> (Model, Arc<dyn View>) {
        (self.model, self.view)
    }
}

impl fmt::Debug for ModelAndView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAndView")
            .field("model", &self.model)
            .field("view", &self.view.name())
            .finish()
    }
}

/// Turns the view name returned by a legacy [`Controller`](crate::handler::Controller)
/// into a [`View`].
pub trait ViewResolver: Send + Sync {
    fn resolve(&self, view_name: &str) -> anyhow::Result<Arc<dyn View>>;
}

impl<F> ViewResolver for F
where
    F: Fn(&str) -> anyhow::Result<Arc<dyn View>> + Send + Sync,
{
    fn resolve(&self, view_name: &str) -> anyhow::Result<Arc<dyn View>> {
        self(view_name)
    }
}

/// `redirect:<location>` resolves to a [`RedirectView`]; every other name
/// resolves to a [`JsonView`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultViewResolver;

impl ViewResolver for DefaultViewResolver {
    fn resolve(&self, view_name: &str) -> anyhow::Result<Arc<dyn View>> {
        match view_name.strip_prefix(REDIRECT_PREFIX) {
            Some(location) => Ok(Arc::new(RedirectView::new(location)?)),
            None => Ok(Arc::new(JsonView)),
        }
    }
}
