use super::{Model, View};
use crate::server::{HttpRequest, HttpResponse};
use serde_json::{Map, Value};

/// Writes the model as a JSON object.
///
/// A model with exactly one attribute is written as that attribute's value
/// alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonView;

impl JsonView {
    fn body(model: &Model) -> Value {
        if model.len() == 1 {
            if let Some(value) = model.values().next() {
                return value.clone();
            }
        }
        let object: Map<String, Value> = model
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Value::Object(object)
    }
}

impl View for JsonView {
    fn render(
        &self,
        model: &Model,
        _request: &HttpRequest,
        response: &mut HttpResponse,
    ) -> anyhow::Result<()> {
        response.write_json(&Self::body(model))
    }

    fn name(&self) -> &str {
        "json"
    }
}
