use crate::domain::lead::test_support::record;
use crate::router::handle;
use crate::tests::utils::{body_string, get, location, seed_leads, seed_user, test_state};

#[test]
fn hot_leads_page_lists_only_hot_leads() {
    let (state, backend) = test_state();
    seed_user(&backend, "ops@example.com", "secret", None);
    let mut hot = record("1", "chaud", "oui", "2024-01-10T09:00:00Z");
    hot.nom = "Alice Martin".into();
    hot.telephone = "0611111111".into();
    let mut cold = record("2", "nouveau", "non", "2024-01-11T09:00:00Z");
    cold.nom = "Bruno Petit".into();
    seed_leads(&backend, &[hot, cold]);
    let token = state.sign_in("ops@example.com", "secret").unwrap();

    let resp = handle(get("/hot-leads", Some(&token)), &state).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);

    assert!(body.contains("Leads Chauds à Appeler (1)"));
    assert!(body.contains("Alice Martin: 0611111111"));
    assert!(!body.contains("Bruno Petit"));
    assert!(body.contains("Copier tous les téléphones"));
}

#[test]
fn empty_hot_list_has_placeholder() {
    let (state, backend) = test_state();
    seed_user(&backend, "ops@example.com", "secret", None);
    let token = state.sign_in("ops@example.com", "secret").unwrap();

    let body = body_string(handle(get("/hot-leads", Some(&token)), &state).unwrap());
    assert!(body.contains("Aucun lead chaud disponible"));
    assert!(body.contains("Leads Chauds à Appeler (0)"));
}

#[test]
fn hot_leads_requires_login() {
    let (state, _) = test_state();
    let resp = handle(get("/hot-leads", None), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), Some("/login"));
}
