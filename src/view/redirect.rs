use super::{Model, View};
use crate::server::{HttpRequest, HttpResponse};
use anyhow::Context;
use http::header::{HeaderValue, LOCATION};
use http::StatusCode;

/// Answers with `302 Found` and a `Location` header. The model is ignored.
#[derive(Debug, Clone)]
pub struct RedirectView {
    location: HeaderValue,
}

impl RedirectView {
    pub fn new(location: &str) -> anyhow::Result<Self> {
        let location = HeaderValue::from_str(location)
            .with_context(|| format!("invalid redirect location `{location}`"))?;
        Ok(Self { location })
    }
}

impl View for RedirectView {
    fn render(
        &self,
        _model: &Model,
        _request: &HttpRequest,
        response: &mut HttpResponse,
    ) -> anyhow::Result<()> {
        response.set_status(StatusCode::FOUND);
        response.set_header(LOCATION, self.location.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "redirect"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_control_characters() {
        assert!(RedirectView::new("/ok").is_ok());
        assert!(RedirectView::new("/bad\nheader").is_err());
    }
}
