use super::HandlerAdapter;
use crate::handler::Handler;
use crate::server::{HttpRequest, HttpResponse};
use crate::view::ModelAndView;

/// Invokes route methods discovered on controller types.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorAdapter;

impl HandlerAdapter for DescriptorAdapter {
    fn name(&self) -> &str {
        "descriptor"
    }

    fn supports(&self, handler: &Handler) -> bool {
        matches!(handler, Handler::Descriptor(_))
    }

    fn handle(
        &self,
        request: &HttpRequest,
        response: &mut HttpResponse,
        handler: &Handler,
    ) -> anyhow::Result<ModelAndView> {
        match handler {
            Handler::Descriptor(descriptor) => descriptor.execute(request, response),
            other => anyhow::bail!("descriptor adapter cannot invoke {}", other.describe()),
        }
    }
}
