use std::io::Read;
use std::sync::Arc;

use astra::{Body, Request, Response};
use http::Method;

use crate::app::AppState;
use crate::auth::token::generate_session_token;
use crate::backend::{ChangeHub, SqliteBackend};
use crate::config::AppConfig;
use crate::db::{init_db, Database};
use crate::domain::lead::LeadRecord;

/// Fresh SQLite store in the temp dir, with the production schema.
pub fn test_backend(hub: ChangeHub) -> SqliteBackend {
    let path = std::env::temp_dir().join(format!("router_test_{}.sqlite", generate_session_token()));
    let db = Database::new(path);
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    SqliteBackend::new(db, hub)
}

pub fn seed_user(backend: &SqliteBackend, email: &str, password: &str, role: Option<&str>) {
    backend
        .create_user(email, password, role)
        .unwrap_or_else(|e| panic!("seeding {email} failed: {e}"));
}

pub fn seed_leads(backend: &SqliteBackend, records: &[LeadRecord]) {
    backend.import_leads(records).expect("import leads");
}

/// App state over a fresh store, plus the store itself for seeding.
pub fn test_state() -> (Arc<AppState>, SqliteBackend) {
    test_state_with(AppConfig::default())
}

pub fn test_state_with(config: AppConfig) -> (Arc<AppState>, SqliteBackend) {
    let hub = ChangeHub::new();
    let backend = test_backend(hub.clone());
    let state = Arc::new(AppState::new(Arc::new(backend.clone()), hub, &config));
    (state, backend)
}

pub fn get(uri: &str, token: Option<&str>) -> Request {
    let mut builder = http::Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Cookie", format!("session={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, token: Option<&str>, form: &str) -> Request {
    let mut builder = http::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header("Cookie", format!("session={token}"));
    }
    builder.body(Body::from(form.as_bytes().to_vec())).unwrap()
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn location(resp: &Response) -> Option<&str> {
    resp.headers().get("Location").and_then(|v| v.to_str().ok())
}
