use dispatch_core::handler::Controller;
use dispatch_core::interface_controller;
use dispatch_core::server::{HttpRequest, HttpResponse};
use dispatch_core::view::{DefaultViewResolver, ModelAndView, ViewResolver};

/// Sends known users on to `/hello`; everyone else gets the login view.
#[derive(Debug, Default)]
pub struct LoginController;

impl Controller for LoginController {
    fn execute(&self, request: &HttpRequest, _response: &mut HttpResponse) -> anyhow::Result<String> {
        match request.header("x-user") {
            Some(user) if !user.trim().is_empty() => Ok("redirect:/hello".to_string()),
            _ => Ok("login".to_string()),
        }
    }
}

#[interface_controller]
impl LoginController {
    #[request_mapping("/login", method = [GET, POST])]
    fn login(&self, request: &HttpRequest, response: &mut HttpResponse) -> anyhow::Result<ModelAndView> {
        let view_name = self.execute(request, response)?;
        let view = DefaultViewResolver.resolve(&view_name)?;
        Ok(ModelAndView::new(view).with("view", view_name))
    }
}
