//! Many dispatch cycles running at once against one dispatcher.

use dispatch_core::controller;
use dispatch_core::mapping::DuplicatePolicy;
use dispatch_core::runtime_config::MappingKind;
use dispatch_core::view::{DefaultViewResolver, ModelAndView};
use dispatch_core::{DispatchConfig, DispatchOutcome, Dispatcher, HttpRequest, HttpResponse, InventorySource};
use http::{Method, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const THREADS: usize = 8;
const REQUESTS_PER_THREAD: usize = 250;

/// Shared by every request; the counter is its own synchronization.
#[derive(Default)]
pub struct Counter {
    hits: AtomicUsize,
}

#[controller]
impl Counter {
    #[request_mapping("/count", method = POST)]
    fn count(&self) -> ModelAndView {
        let seen = self.hits.fetch_add(1, Ordering::SeqCst) + 1;
        ModelAndView::json().with("seen", seen)
    }

    #[request_mapping("/total", method = GET)]
    fn total(&self) -> ModelAndView {
        ModelAndView::json().with("total", self.hits.load(Ordering::SeqCst))
    }

    #[request_mapping("/explode", method = GET)]
    fn explode(&self) -> ModelAndView {
        panic!("controller bug")
    }
}

fn dispatcher() -> Dispatcher {
    let config = DispatchConfig {
        base_packages: vec!["concurrency_tests".to_string()],
        mappings: vec![MappingKind::Annotated],
        duplicate_routes: DuplicatePolicy::Reject,
    };
    Dispatcher::bootstrap(&config, Arc::new(InventorySource), Arc::new(DefaultViewResolver)).unwrap()
}

fn total(dispatcher: &Dispatcher) -> usize {
    let mut response = HttpResponse::new();
    assert!(dispatcher
        .service(&HttpRequest::new(Method::GET, "/total"), &mut response)
        .is_completed());
    serde_json::from_slice::<usize>(response.body()).unwrap()
}

#[test]
fn test_concurrent_requests_share_one_instance() {
    let dispatcher = dispatcher();
    let routes_before = dispatcher.routes();

    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            let dispatcher = dispatcher.clone();
            scope.spawn(move || {
                for _ in 0..REQUESTS_PER_THREAD {
                    let request = HttpRequest::new(Method::POST, "/count");
                    let mut response = HttpResponse::new();
                    assert!(dispatcher.service(&request, &mut response).is_completed());
                    assert_eq!(response.status(), StatusCode::OK);
                }
            });
        }
    });

    assert_eq!(total(&dispatcher), THREADS * REQUESTS_PER_THREAD);
    assert_eq!(dispatcher.routes(), routes_before);
}

#[test]
fn test_panicking_requests_do_not_disturb_others() {
    let dispatcher = dispatcher();
    let failures = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for worker in 0..THREADS {
            let dispatcher = &dispatcher;
            let failures = &failures;
            scope.spawn(move || {
                for i in 0..REQUESTS_PER_THREAD {
                    let (method, path) = if (worker + i) % 5 == 0 {
                        (Method::GET, "/explode")
                    } else {
                        (Method::POST, "/count")
                    };
                    let mut response = HttpResponse::new();
                    match dispatcher.service(&HttpRequest::new(method, path), &mut response) {
                        DispatchOutcome::Completed => assert_eq!(response.status(), StatusCode::OK),
                        DispatchOutcome::Failed(_) => {
                            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
                            failures.fetch_add(1, Ordering::SeqCst);
                        }
                        DispatchOutcome::NotFound => panic!("{path} should be routed"),
                    }
                }
            });
        }
    });

    let failed = failures.load(Ordering::SeqCst);
    assert_eq!(failed, THREADS * REQUESTS_PER_THREAD / 5);
    assert_eq!(total(&dispatcher), THREADS * REQUESTS_PER_THREAD - failed);
}
