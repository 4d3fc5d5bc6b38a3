use dispatch_core::controller;
use dispatch_core::server::HttpRequest;
use dispatch_core::view::ModelAndView;
use serde::Deserialize;

#[derive(Debug, Default)]
pub struct GreetingController;

#[derive(Debug, Deserialize)]
struct EchoBody {
    text: String,
}

#[controller]
impl GreetingController {
    #[request_mapping("/hello", method = GET)]
    fn hello(&self) -> ModelAndView {
        ModelAndView::json().with("message", "hi")
    }

    /// Echoes the JSON body's `text`, or the raw query string when there is no body.
    #[request_mapping(path = "/echo", method = [GET, POST])]
    fn echo(&self, request: &HttpRequest) -> anyhow::Result<ModelAndView> {
        let text = if request.body().is_empty() {
            request.query().unwrap_or_default().to_string()
        } else {
            request.json::<EchoBody>()?.text
        };
        Ok(ModelAndView::json()
            .with("echo", text)
            .with("request_id", request.request_id().to_string()))
    }
}
