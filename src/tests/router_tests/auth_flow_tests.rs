use crate::router::handle;
use crate::tests::utils::{body_string, get, location, post_form, seed_user, test_state};

fn cookie_token(resp: &astra::Response) -> String {
    let cookie = resp
        .headers()
        .get("Set-Cookie")
        .and_then(|v| v.to_str().ok())
        .expect("Set-Cookie header");
    cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("session="))
        .expect("session cookie")
        .to_string()
}

#[test]
fn login_page_loads_successfully() {
    let (state, _) = test_state();

    let resp = handle(get("/login", None), &state).expect("Failed to handle request");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Connexion"));
    assert!(body.contains(r#"action="/login""#));
}

#[test]
fn valid_credentials_set_cookie_and_open_dashboard() {
    let (state, backend) = test_state();
    seed_user(&backend, "ops@example.com", "secret", None);

    let resp = handle(
        post_form("/login", None, "email=ops%40example.com&password=secret"),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), Some("/dashboard"));
    let token = cookie_token(&resp);
    assert!(!token.is_empty());
    assert_eq!(state.open_dashboards(), 1);
    assert_eq!(state.signed_in_email(&token).as_deref(), Some("ops@example.com"));
}

#[test]
fn wrong_password_rerenders_login() {
    let (state, backend) = test_state();
    seed_user(&backend, "ops@example.com", "secret", None);

    let resp = handle(
        post_form("/login", None, "email=ops%40example.com&password=nope"),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 401);
    let body = body_string(resp);
    assert!(body.contains("Identifiants invalides"));
    assert!(body.contains("ops@example.com"));
    assert_eq!(state.open_dashboards(), 0);
}

#[test]
fn missing_fields_are_a_bad_request() {
    let (state, _) = test_state();
    let resp = handle(post_form("/login", None, "email="), &state).unwrap();
    assert_eq!(resp.status(), 400);
}

#[test]
fn dashboard_without_cookie_redirects_to_login() {
    let (state, _) = test_state();
    let resp = handle(get("/dashboard", None), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), Some("/login"));
}

#[test]
fn unknown_token_is_sent_back_to_login() {
    let (state, _) = test_state();
    let resp = handle(get("/dashboard", Some("not-a-session")), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), Some("/login"));
    let cookie = resp.headers().get("Set-Cookie").unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

#[test]
fn existing_session_is_restored_without_login() {
    let (state, backend) = test_state();
    seed_user(&backend, "ops@example.com", "secret", None);
    let token = state.sign_in("ops@example.com", "secret").unwrap();

    // A second app instance over the same store, e.g. after a restart.
    let other = std::sync::Arc::new(crate::app::AppState::new(
        std::sync::Arc::new(backend.clone()),
        crate::backend::ChangeHub::new(),
        &crate::config::AppConfig::default(),
    ));
    let resp = handle(get("/dashboard", Some(&token)), &other).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("ops@example.com"));
}

#[test]
fn logout_revokes_session() {
    let (state, backend) = test_state();
    seed_user(&backend, "ops@example.com", "secret", None);
    let token = state.sign_in("ops@example.com", "secret").unwrap();

    let resp = handle(post_form("/logout", Some(&token), ""), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), Some("/login"));
    assert_eq!(state.open_dashboards(), 0);

    let resp = handle(get("/dashboard", Some(&token)), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), Some("/login"));
}

#[test]
fn unknown_route_is_not_found() {
    let (state, _) = test_state();
    let err = handle(get("/nope", None), &state).unwrap_err();
    assert!(matches!(err, crate::errors::ServerError::NotFound));
}
