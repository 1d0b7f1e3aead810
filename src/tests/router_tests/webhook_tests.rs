use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use astra::Body;
use http::Method;

use crate::backend::ChangeFeed;
use crate::config::AppConfig;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{test_state, test_state_with};

fn hook(secret: Option<&str>) -> astra::Request {
    let mut builder = http::Request::builder()
        .method(Method::POST)
        .uri("/hooks/leads-changed");
    if let Some(secret) = secret {
        builder = builder.header("x-webhook-secret", secret);
    }
    builder.body(Body::empty()).unwrap()
}

fn counting(state: &crate::app::AppState) -> (Arc<AtomicUsize>, crate::backend::Subscription) {
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = hits.clone();
    let sub = state.changes().subscribe(Box::new(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    }));
    (hits, sub)
}

#[test]
fn notification_reaches_subscribers() {
    let (state, _) = test_state();
    let (hits, _sub) = counting(&state);

    let resp = handle(hook(None), &state).unwrap();
    assert_eq!(resp.status(), 204);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn secret_is_enforced_when_configured() {
    let config = AppConfig {
        webhook_secret: Some("s3cret".into()),
        ..AppConfig::default()
    };
    let (state, _) = test_state_with(config);
    let (hits, _sub) = counting(&state);

    let err = handle(hook(None), &state).unwrap_err();
    assert!(matches!(err, ServerError::Unauthorized(_)));
    let err = handle(hook(Some("wrong")), &state).unwrap_err();
    assert!(matches!(err, ServerError::Unauthorized(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let resp = handle(hook(Some("s3cret")), &state).unwrap();
    assert_eq!(resp.status(), 204);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
