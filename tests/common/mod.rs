#![allow(dead_code)]

use dispatch_core::ids::RequestId;
use dispatch_core::server::{HttpRequest, HttpResponse};
use dispatch_core::view::{Model, View};
use std::io;
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::fmt::MakeWriter;

/// View that records every render call, keyed by request id so that tests
/// running in parallel can pick out their own calls.
#[derive(Default)]
pub struct RecordingView {
    calls: Mutex<Vec<(RequestId, Model)>>,
}

impl RecordingView {
    /// Models rendered for `request_id`
    pub fn rendered_for(&self, request_id: RequestId) -> Vec<Model> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == request_id)
            .map(|(_, model)| model.clone())
            .collect()
    }
}

impl View for RecordingView {
    fn render(&self, model: &Model, request: &HttpRequest, response: &mut HttpResponse) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push((request.request_id(), model.clone()));
        response.set_body("recorded");
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// The one recording view shared by the controllers of a test binary
pub fn recording_view() -> Arc<RecordingView> {
    static VIEW: OnceLock<Arc<RecordingView>> = OnceLock::new();
    Arc::clone(VIEW.get_or_init(|| Arc::new(RecordingView::default())))
}

/// Captures log output of the current thread while alive.
pub struct TestTracing {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl TestTracing {
    pub fn init() -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(BufferWriter(Arc::clone(&buffer)))
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self { buffer, _guard: guard }
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}
