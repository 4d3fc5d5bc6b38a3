//! # Controller Discovery
//!
//! Where the registries get their controllers from.
//!
//! A controller type is described by a [`ControllerRegistration`]: its name,
//! the module it lives in, the discovery flags it carries, a zero-argument
//! constructor and the list of its mapped route methods. Registrations are
//! plain `const` data, so they can be produced at compile time.
//!
//! The usual producer is the `#[controller]` / `#[interface_controller]`
//! attribute macros, which submit one registration per annotated `impl` block
//! to a link-time inventory. [`InventorySource`] reads that inventory back.
//! [`StaticSource`] serves a hand-written list instead.
//!
//! ## Base packages
//!
//! A source is always queried with a list of base packages (Rust module
//! paths). A registration is selected when its module path equals one of them
//! or is nested below it, so `app::web` selects `app::web` and
//! `app::web::admin` but not `app::webhooks`. An empty list selects everything.

use crate::handler::{InvokeFn, SharedInstance};
use crate::router::RequestMethod;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// One mapped route method of a controller type.
#[derive(Clone, Copy)]
pub struct RouteDefinition {
    /// Name of the method, for diagnostics
    pub name: &'static str,
    pub path: &'static str,
    pub methods: &'static [RequestMethod],
    pub invoke: InvokeFn,
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Compile-time description of a controller type.
#[derive(Clone, Copy)]
pub struct ControllerRegistration {
    pub type_name: &'static str,
    pub module_path: &'static str,
    /// Carries the controller marker
    pub annotated: bool,
    /// Implements the legacy [`Controller`](crate::handler::Controller) capability
    pub implements_controller: bool,
    /// `None` when the type cannot be built without arguments
    pub construct: Option<fn() -> SharedInstance>,
    pub routes: &'static [RouteDefinition],
}

impl fmt::Debug for ControllerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistration")
            .field("type_name", &self.type_name)
            .field("module_path", &self.module_path)
            .field("annotated", &self.annotated)
            .field("implements_controller", &self.implements_controller)
            .field("constructible", &self.construct.is_some())
            .field("routes", &self.routes)
            .finish()
    }
}

inventory::collect!(ControllerRegistration);

/// Produces controller registrations for a set of base packages.
pub trait ControllerSource: Send + Sync {
    /// Registrations below `base_packages`, in a stable order.
    fn controllers(&self, base_packages: &[String]) -> Vec<ControllerRegistration>;
}

/// Reads registrations submitted by the controller attribute macros.
///
/// Link order is not stable across builds, so results are sorted by module
/// path, type name and route method names.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventorySource;

impl ControllerSource for InventorySource {
    fn controllers(&self, base_packages: &[String]) -> Vec<ControllerRegistration> {
        let mut found: Vec<ControllerRegistration> = inventory::iter::<ControllerRegistration>
            .into_iter()
            .filter(|r| in_base_packages(r.module_path, base_packages))
            .copied()
            .collect();
        // Several impl blocks of one type share a sort key; their route names
        // are disjoint, so they break the tie.
        found.sort_by(|a, b| {
            (a.module_path, a.type_name)
                .cmp(&(b.module_path, b.type_name))
                .then_with(|| route_names(a).cmp(route_names(b)))
        });
        found
    }
}

fn route_names(registration: &ControllerRegistration) -> impl Iterator<Item = &'static str> {
    let routes: &'static [RouteDefinition] = registration.routes;
    routes.iter().map(|r| r.name)
}

/// Serves an explicit list of registrations in the order given.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    registrations: Vec<ControllerRegistration>,
}

impl StaticSource {
    #[must_use]
    pub fn new(registrations: Vec<ControllerRegistration>) -> Self {
        Self { registrations }
    }
}

impl ControllerSource for StaticSource {
    fn controllers(&self, base_packages: &[String]) -> Vec<ControllerRegistration> {
        self.registrations
            .iter()
            .filter(|r| in_base_packages(r.module_path, base_packages))
            .copied()
            .collect()
    }
}

impl<S: ControllerSource + ?Sized> ControllerSource for Arc<S> {
    fn controllers(&self, base_packages: &[String]) -> Vec<ControllerRegistration> {
        (**self).controllers(base_packages)
    }
}

/// `true` when `module_path` is one of `base_packages` or nested below one.
#[must_use]
pub fn in_base_packages(module_path: &str, base_packages: &[String]) -> bool {
    base_packages.is_empty()
        || base_packages.iter().any(|base| {
            let base = base.trim_end_matches("::");
            module_path == base
                || module_path
                    .strip_prefix(base)
                    .is_some_and(|rest| rest.starts_with("::"))
        })
}

/// Zero-argument constructor used by the attribute macros.
pub fn default_constructor<T>() -> SharedInstance
where
    T: Default + Send + Sync + 'static,
{
    Arc::new(T::default())
}

/// Recover the concrete controller from its type-erased shared instance.
pub fn downcast_controller<T: Any>(instance: &(dyn Any + Send + Sync)) -> anyhow::Result<&T> {
    instance.downcast_ref::<T>().ok_or_else(|| {
        anyhow::anyhow!(
            "handler is bound to an instance that is not a `{}`",
            std::any::type_name::<T>()
        )
    })
}
