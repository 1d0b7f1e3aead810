use crate::domain::lead::test_support::record;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, get, location, post_form, seed_leads, seed_user, test_state};

fn seeded() -> (std::sync::Arc<crate::app::AppState>, crate::backend::SqliteBackend) {
    let (state, backend) = test_state();
    seed_user(&backend, "admin@example.com", "secret", Some("admin"));
    seed_user(&backend, "agent@example.com", "secret", None);
    let mut roof = record("1", "nouveau", "oui", "2024-01-10T09:00:00Z");
    roof.nom = "Alice Martin".into();
    let mut gutter = record("2", "répondu", "non", "2024-01-11T09:00:00Z");
    gutter.nom = "Bruno Petit".into();
    gutter.type_travaux = "zinguerie".into();
    seed_leads(&backend, &[roof, gutter]);
    (state, backend)
}

#[test]
fn dashboard_shows_kpis_and_table() {
    let (state, _) = seeded();
    let token = state.sign_in("agent@example.com", "secret").unwrap();

    let resp = handle(get("/dashboard", Some(&token)), &state).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);

    assert!(body.contains("agent@example.com"));
    assert!(body.contains("Total Leads"));
    assert!(body.contains("Alice Martin"));
    assert!(body.contains("Bruno Petit"));
    assert!(body.contains("2 leads chargés"));
    // Agents get no delete column.
    assert!(!body.contains("/leads/delete"));
}

#[test]
fn notifications_are_shown_once() {
    let (state, _) = seeded();
    let token = state.sign_in("agent@example.com", "secret").unwrap();

    let first = body_string(handle(get("/dashboard", Some(&token)), &state).unwrap());
    let second = body_string(handle(get("/dashboard", Some(&token)), &state).unwrap());
    assert!(first.contains("leads chargés"));
    assert!(!second.contains("leads chargés"));
}

#[test]
fn status_filter_narrows_the_table_only() {
    let (state, _) = seeded();
    let token = state.sign_in("agent@example.com", "secret").unwrap();

    let resp = handle(get("/dashboard?status=r%C3%A9pondu", Some(&token)), &state).unwrap();
    let body = body_string(resp);
    assert!(body.contains("Bruno Petit"));
    assert!(!body.contains("Alice Martin"));

    let stats_total = state
        .with_dashboard(&token, |c, _| (c.view().stats.total, c.view().filtered.len()))
        .unwrap()
        .unwrap();
    assert_eq!(stats_total, (2, 1));
}

#[test]
fn filters_persist_until_changed() {
    let (state, _) = seeded();
    let token = state.sign_in("agent@example.com", "secret").unwrap();

    handle(get("/dashboard?status=all&date=2024-01-11", Some(&token)), &state).unwrap();
    let body = body_string(handle(get("/dashboard", Some(&token)), &state).unwrap());
    assert!(body.contains("Bruno Petit"));
    assert!(!body.contains("Alice Martin"));

    let body = body_string(handle(get("/dashboard?date=", Some(&token)), &state).unwrap());
    assert!(body.contains("Alice Martin"));
}

#[test]
fn malformed_date_is_a_bad_request() {
    let (state, _) = seeded();
    let token = state.sign_in("agent@example.com", "secret").unwrap();
    let err = handle(get("/dashboard?date=10-01-2024", Some(&token)), &state).unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn admin_can_delete_and_table_refreshes() {
    let (state, _) = seeded();
    let token = state.sign_in("admin@example.com", "secret").unwrap();

    let body = body_string(handle(get("/dashboard", Some(&token)), &state).unwrap());
    assert!(body.contains("/leads/delete"));

    let resp = handle(post_form("/leads/delete", Some(&token), "id=1"), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), Some("/dashboard"));

    let body = body_string(handle(get("/dashboard", Some(&token)), &state).unwrap());
    assert!(body.contains("Lead supprimé avec succès"));
    assert!(!body.contains("Alice Martin"));
    assert!(body.contains("Bruno Petit"));
}

#[test]
fn agent_delete_is_refused_and_lead_kept() {
    let (state, _) = seeded();
    let token = state.sign_in("agent@example.com", "secret").unwrap();

    handle(post_form("/leads/delete", Some(&token), "id=1"), &state).unwrap();
    let body = body_string(handle(get("/dashboard", Some(&token)), &state).unwrap());
    assert!(body.contains("Suppression réservée aux administrateurs"));
    assert!(body.contains("Alice Martin"));
}

#[test]
fn deleting_a_missing_lead_reports_an_error() {
    let (state, _) = seeded();
    let token = state.sign_in("admin@example.com", "secret").unwrap();

    handle(post_form("/leads/delete", Some(&token), "id=999"), &state).unwrap();
    let body = body_string(handle(get("/dashboard", Some(&token)), &state).unwrap());
    assert!(body.contains("Erreur lors de la suppression"));
}

#[test]
fn delete_without_id_is_a_bad_request() {
    let (state, _) = seeded();
    let token = state.sign_in("admin@example.com", "secret").unwrap();
    let err = handle(post_form("/leads/delete", Some(&token), "id="), &state).unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn manual_refresh_picks_up_new_rows() {
    let (state, backend) = seeded();
    let token = state.sign_in("agent@example.com", "secret").unwrap();

    // Written behind the hub so only the manual refresh can see it.
    backend
        .database()
        .with_conn(|conn| {
            crate::db::leads::upsert_lead(conn, &record("3", "chaud", "oui", "2024-01-12T09:00:00Z"))
        })
        .unwrap();

    let resp = handle(post_form("/dashboard/refresh", Some(&token), ""), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), Some("/dashboard"));

    let count = state
        .with_dashboard(&token, |c, _| c.raw_leads().len())
        .unwrap()
        .unwrap();
    assert_eq!(count, 3);
}
