use std::collections::HashMap;
use std::io::Read;

use astra::Request;
use chrono::NaiveDate;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use url::form_urlencoded;

use crate::app::AppState;
use crate::domain::filter::{parse_date_filter, StatusFilter};
use crate::errors::{DataError, ServerError};
use crate::responses::redirect::SESSION_COOKIE;
use crate::responses::{
    clear_session_cookie, html_response, html_response_with_status, no_content, redirect,
    redirect_with_cookie, session_cookie, ResultResp,
};
use crate::templates::pages::{
    dashboard_page, home_page, hot_leads_page, login_page, DashboardVm,
};

const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();
    let token = session_token(&req);

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => {
            let email = token.as_deref().and_then(|t| state.signed_in_email(t));
            html_response(home_page(email.as_deref()))
        }
        ("GET", "/login") => {
            if token.as_deref().and_then(|t| state.signed_in_email(t)).is_some() {
                return redirect("/dashboard");
            }
            html_response(login_page(None, ""))
        }
        ("POST", "/login") => login(req, state),
        ("POST", "/logout") => logout(token, state),
        ("GET", "/dashboard") => dashboard(&req, token, state),
        ("POST", "/dashboard/refresh") => refresh(token, state),
        ("POST", "/leads/delete") => delete_lead(req, token, state),
        ("GET", "/hot-leads") => hot_leads(token, state),
        ("POST", "/hooks/leads-changed") => leads_changed(&req, state),
        _ => Err(ServerError::NotFound),
    }
}

fn login(req: Request, state: &AppState) -> ResultResp {
    let form = parse_form(req)?;
    let email = form.get("email").map(|s| s.trim()).unwrap_or("");
    let password = form.get("password").map(String::as_str).unwrap_or("");

    if email.is_empty() || password.is_empty() {
        return html_response_with_status(
            400,
            login_page(Some("Email et mot de passe requis"), email),
        );
    }

    match state.sign_in(email, password) {
        Ok(token) => redirect_with_cookie("/dashboard", session_cookie(&token)),
        Err(DataError::Auth(msg)) => {
            warn!(%email, "sign-in rejected: {msg}");
            html_response_with_status(401, login_page(Some("Identifiants invalides"), email))
        }
        Err(err) => Err(err.into()),
    }
}

fn logout(token: Option<String>, state: &AppState) -> ResultResp {
    if let Some(token) = token {
        // The cookie is cleared either way; a failed remote sign-out only
        // leaves the remote token to expire on its own.
        if let Err(err) = state.sign_out(&token) {
            warn!("sign-out failed: {err}");
        }
    }
    redirect_with_cookie("/login", clear_session_cookie())
}

fn dashboard(req: &Request, token: Option<String>, state: &AppState) -> ResultResp {
    let Some(token) = token else {
        return redirect("/login");
    };

    let query = parse_query(req);
    let status = query.get("status").map(|s| StatusFilter::parse(s));
    // Absent keeps the current filter, empty clears it.
    let date: Option<Option<NaiveDate>> = match query.get("date") {
        Some(raw) => Some(
            parse_date_filter(raw)
                .map_err(|_| ServerError::BadRequest(format!("Date invalide: {raw}")))?,
        ),
        None => None,
    };

    let page = state.with_dashboard(&token, |controller, _| {
        if let Some(status) = status {
            controller.set_status_filter(status);
        }
        match date {
            Some(Some(day)) => controller.set_date_filter(Some(day)),
            Some(None) => controller.clear_date_filter(),
            None => {}
        }
        let notifications = controller.take_notifications();
        let email = controller
            .session()
            .map(|s| s.email.clone())
            .unwrap_or_default();

        dashboard_page(&DashboardVm {
            email: &email,
            is_admin: controller.is_admin(),
            loading: controller.is_loading(),
            view: controller.view(),
            status_filter: controller.status_filter(),
            date_filter: controller.date_filter(),
            notifications: &notifications,
        })
    })?;

    match page {
        Some(markup) => html_response(markup),
        None => redirect_with_cookie("/login", clear_session_cookie()),
    }
}

fn refresh(token: Option<String>, state: &AppState) -> ResultResp {
    let Some(token) = token else {
        return redirect("/login");
    };
    let done = state.with_dashboard(&token, |controller, backend| {
        controller.refresh(backend);
    })?;
    match done {
        Some(()) => redirect("/dashboard"),
        None => redirect_with_cookie("/login", clear_session_cookie()),
    }
}

fn delete_lead(req: Request, token: Option<String>, state: &AppState) -> ResultResp {
    let Some(token) = token else {
        return redirect("/login");
    };
    let form = parse_form(req)?;
    let id = form
        .get("id")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Identifiant de lead manquant".into()))?;

    let done = state.with_dashboard(&token, |controller, backend| {
        controller.delete_lead(backend, id);
    })?;
    match done {
        Some(()) => redirect("/dashboard"),
        None => redirect_with_cookie("/login", clear_session_cookie()),
    }
}

fn hot_leads(token: Option<String>, state: &AppState) -> ResultResp {
    let Some(token) = token else {
        return redirect("/login");
    };
    let page = state.with_dashboard(&token, |controller, _| {
        let notifications = controller.take_notifications();
        let email = controller
            .session()
            .map(|s| s.email.clone())
            .unwrap_or_default();
        hot_leads_page(&email, controller.view(), &notifications)
    })?;
    match page {
        Some(markup) => html_response(markup),
        None => redirect_with_cookie("/login", clear_session_cookie()),
    }
}

/// Change notification from the data store. Open dashboards re-fetch on the
/// refresher thread, not on this request.
fn leads_changed(req: &Request, state: &AppState) -> ResultResp {
    if let Some(expected) = state.webhook_secret() {
        let given = req
            .headers()
            .get(WEBHOOK_SECRET_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();
        if !secrets_match(given, expected.as_bytes()) {
            warn!("change notification with a bad secret");
            return Err(ServerError::Unauthorized("Secret invalide".into()));
        }
    }
    info!("leads changed upstream");
    state.changes().notify();
    no_content()
}

/// Constant-time for equal lengths; a length mismatch fails straight away.
fn secrets_match(given: &[u8], expected: &[u8]) -> bool {
    given.ct_eq(expected).into()
}

/// Session token from the `Cookie` header, if any.
fn session_token(req: &Request) -> Option<String> {
    req.headers()
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn parse_form(req: Request) -> Result<HashMap<String, String>, ServerError> {
    let mut raw = Vec::new();
    req.into_body()
        .reader()
        .read_to_end(&mut raw)
        .map_err(|e| ServerError::BadRequest(format!("Corps de requête illisible: {e}")))?;
    Ok(form_urlencoded::parse(&raw).into_owned().collect())
}
