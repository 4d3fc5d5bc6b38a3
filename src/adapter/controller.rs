use super::HandlerAdapter;
use crate::handler::Handler;
use crate::server::{HttpRequest, HttpResponse};
use crate::view::{DefaultViewResolver, ModelAndView, ViewResolver};
use std::sync::Arc;

/// Invokes legacy [`Controller`](crate::handler::Controller) objects.
///
/// The controller answers with a view name; the adapter resolves it and
/// returns it with an empty model.
#[derive(Clone)]
pub struct ControllerAdapter {
    resolver: Arc<dyn ViewResolver>,
}

impl Default for ControllerAdapter {
    fn default() -> Self {
        Self::new(Arc::new(DefaultViewResolver))
    }
}

impl ControllerAdapter {
    pub fn new(resolver: Arc<dyn ViewResolver>) -> Self {
        Self { resolver }
    }
}

impl HandlerAdapter for ControllerAdapter {
    fn name(&self) -> &str {
        "controller"
    }

    fn supports(&self, handler: &Handler) -> bool {
        matches!(handler, Handler::Controller(_))
    }

    fn handle(
        &self,
        request: &HttpRequest,
        response: &mut HttpResponse,
        handler: &Handler,
    ) -> anyhow::Result<ModelAndView> {
        let Handler::Controller(controller) = handler else {
            anyhow::bail!("controller adapter cannot invoke {}", handler.describe());
        };
        let view_name = controller.execute(request, response)?;
        let view = self.resolver.resolve(&view_name)?;
        Ok(ModelAndView::new(view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Controller;
    use crate::view::View;
    use http::{Method, StatusCode};

    struct Login;

    impl Controller for Login {
        fn execute(&self, request: &HttpRequest, _: &mut HttpResponse) -> anyhow::Result<String> {
            match request.header("x-user") {
                Some(_) => Ok("redirect:/index.html".into()),
                None => Ok("login".into()),
            }
        }
    }

    #[test]
    fn test_view_name_is_resolved() {
        let adapter = ControllerAdapter::default();
        let handler = Handler::Controller(Arc::new(Login));
        assert!(adapter.supports(&handler));

        let req = HttpRequest::new(Method::POST, "/login").with_header(
            http::header::HeaderName::from_static("x-user"),
            http::HeaderValue::from_static("gugu"),
        );
        let mut res = HttpResponse::new();
        let mav = adapter.handle(&req, &mut res, &handler).unwrap();
        assert!(mav.model().is_empty());

        mav.view().render(mav.model(), &req, &mut res).unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.header("location"), Some("/index.html"));
    }

    #[test]
    fn test_resolver_failure_is_an_invocation_error() {
        let resolver = |name: &str| -> anyhow::Result<Arc<dyn View>> {
            anyhow::bail!("no template named {name}")
        };
        let adapter = ControllerAdapter::new(Arc::new(resolver));
        let handler = Handler::Controller(Arc::new(Login));
        let req = HttpRequest::new(Method::GET, "/login");
        let mut res = HttpResponse::new();
        let err = adapter.handle(&req, &mut res, &handler).unwrap_err();
        assert_eq!(err.to_string(), "no template named login");
    }
}
