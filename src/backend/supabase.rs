// src/backend/supabase.rs

use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::backend::{LeadSource, Session, SessionProvider};
use crate::domain::lead::LeadRecord;
use crate::errors::DataError;

const LEADS_TABLE: &str = "rest/v1/leads";
const ROLES_TABLE: &str = "rest/v1/user_roles";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Hosted backend: PostgREST for rows, GoTrue for auth.
pub struct SupabaseBackend {
    base: Url,
    anon_key: String,
    client: Client,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct RoleRow {
    role: String,
}

impl SupabaseBackend {
    pub fn new(project_url: &str, anon_key: impl Into<String>) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DataError::Network(format!("http client: {e}")))?;
        Ok(Self {
            base: base_url(project_url)?,
            anon_key: anon_key.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, DataError> {
        self.base
            .join(path)
            .map_err(|e| DataError::Network(format!("bad endpoint {path}: {e}")))
    }

    fn authed(&self, req: RequestBuilder, session: &Session) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, DataError> {
        let resp = req
            .send()
            .map_err(|e| DataError::Network(format!("request failed: {e}")))?;
        check_status(resp)
    }
}

/// Normalize the project URL so relative joins land under it.
fn base_url(project_url: &str) -> Result<Url, DataError> {
    let mut raw = project_url.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| DataError::Network(format!("invalid backend url: {e}")))
}

fn check_status(resp: Response) -> Result<Response, DataError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().unwrap_or_else(|_| "(no body)".to_string());
    Err(classify_status(status, &text))
}

fn classify_status(status: StatusCode, body: &str) -> DataError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DataError::Auth(format!("{status} - {body}"))
        }
        StatusCode::NOT_FOUND => DataError::NotFound(format!("{status} - {body}")),
        // GoTrue answers a bad password with 400 invalid_grant.
        StatusCode::BAD_REQUEST if body.contains("invalid_grant") => {
            DataError::Auth("invalid login credentials".to_string())
        }
        _ => DataError::Network(format!("backend error: {status} - {body}")),
    }
}

impl LeadSource for SupabaseBackend {
    fn fetch_all_leads(&self, session: &Session) -> Result<Vec<LeadRecord>, DataError> {
        let mut url = self.endpoint(LEADS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "timestamp.desc");

        let resp = self.send(self.authed(self.client.get(url), session))?;
        let leads: Vec<LeadRecord> = resp
            .json()
            .map_err(|e| DataError::Network(format!("decode leads: {e}")))?;

        debug!(count = leads.len(), "fetched leads from backend");
        Ok(leads)
    }

    fn delete_lead(&self, session: &Session, id: &str) -> Result<(), DataError> {
        let mut url = self.endpoint(LEADS_TABLE)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));

        let req = self
            .authed(self.client.delete(url), session)
            .header("Prefer", "return=representation");
        let deleted: Vec<serde_json::Value> = self
            .send(req)?
            .json()
            .map_err(|e| DataError::Network(format!("decode delete response: {e}")))?;

        // Row-level security hides rows we may not touch, so an empty
        // representation covers both "gone" and "not yours".
        if deleted.is_empty() {
            return Err(DataError::NotFound(format!("lead {id}")));
        }
        Ok(())
    }
}

impl SessionProvider for SupabaseBackend {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, DataError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let resp = self.send(
            self.client
                .post(url)
                .header("apikey", &self.anon_key)
                .json(&PasswordGrant { email, password }),
        )?;
        let token: TokenResponse = resp
            .json()
            .map_err(|e| DataError::Network(format!("decode token response: {e}")))?;

        let expires_at = token
            .expires_at
            .or_else(|| token.expires_in.map(|secs| Utc::now().timestamp() + secs));

        Ok(Session {
            email: token.user.email.unwrap_or_else(|| email.to_string()),
            user_id: token.user.id,
            access_token: token.access_token,
            expires_at,
        })
    }

    fn get_session(&self, access_token: &str) -> Result<Option<Session>, DataError> {
        let url = self.endpoint("auth/v1/user")?;
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .map_err(|e| DataError::Network(format!("request failed: {e}")))?;

        let user: AuthUser = match check_status(resp) {
            Ok(resp) => resp
                .json()
                .map_err(|e| DataError::Network(format!("decode user: {e}")))?,
            Err(DataError::Auth(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(Some(Session {
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            access_token: access_token.to_string(),
            expires_at: None,
        }))
    }

    fn get_role(&self, session: &Session) -> Result<Option<String>, DataError> {
        let mut url = self.endpoint(ROLES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "role")
            .append_pair("user_id", &format!("eq.{}", session.user_id));

        let rows: Vec<RoleRow> = self
            .send(self.authed(self.client.get(url), session))?
            .json()
            .map_err(|e| DataError::Network(format!("decode roles: {e}")))?;

        Ok(rows.into_iter().next().map(|r| r.role))
    }

    fn sign_out(&self, session: &Session) -> Result<(), DataError> {
        let url = self.endpoint("auth/v1/logout")?;
        match self.send(self.authed(self.client.post(url), session)) {
            Ok(_) => Ok(()),
            // Already expired on the provider side: nothing left to revoke.
            Err(DataError::Auth(_)) => Ok(()),
            Err(e) => {
                error!("sign out failed: {e}");
                Err(e)
            }
        }
    }
}
