// src/backend/sqlite.rs

use chrono::Utc;
use tracing::{debug, info};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::sessions;
use crate::backend::{ChangeHub, LeadSource, Session, SessionProvider};
use crate::db::{leads, users, Database};
use crate::domain::lead::LeadRecord;
use crate::errors::{DataError, ServerError};

/// Local backend on a SQLite file. Same contract as the hosted one; deletes
/// and imports are announced on the change hub the way the hosted realtime
/// feed would.
#[derive(Clone)]
pub struct SqliteBackend {
    db: Database,
    changes: ChangeHub,
}

fn now_unix() -> i64 {
    Utc::now().timestamp()
}

fn storage(err: ServerError) -> DataError {
    match err {
        ServerError::NotFound => DataError::NotFound("record".to_string()),
        ServerError::Unauthorized(msg) => DataError::Auth(msg),
        other => DataError::Network(other.to_string()),
    }
}

/// Trim + lowercase, minimal sanity check.
pub fn normalize_email(email: &str) -> Result<String, DataError> {
    let e = email.trim().to_lowercase();
    if e.is_empty() || !e.contains('@') || e.starts_with('@') || e.ends_with('@') {
        return Err(DataError::Auth("invalid email".into()));
    }
    Ok(e)
}

impl SqliteBackend {
    pub fn new(db: Database, changes: ChangeHub) -> Self {
        Self { db, changes }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Reject tokens that no longer map to a live session.
    fn authorize(&self, session: &Session) -> Result<i64, DataError> {
        let stored = self
            .db
            .with_conn(|conn| sessions::load_session(conn, &session.access_token, now_unix()))
            .map_err(storage)?;
        stored
            .map(|s| s.user_id)
            .ok_or_else(|| DataError::Auth("session expired or revoked".into()))
    }

    /// Create an operator account, optionally with a role.
    pub fn create_user(
        &self,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<i64, DataError> {
        let email = normalize_email(email)?;
        let hash = hash_password(password).map_err(storage)?;

        let user_id = self
            .db
            .with_conn(|conn| {
                let tx = conn
                    .transaction()
                    .map_err(|e| ServerError::DbError(format!("begin failed: {e}")))?;
                let id = users::create_user(&tx, &email, &hash, now_unix())?;
                if let Some(role) = role {
                    users::set_role(&tx, id, role)?;
                }
                tx.commit()
                    .map_err(|e| ServerError::DbError(format!("commit failed: {e}")))?;
                Ok(id)
            })
            .map_err(storage)?;

        info!(%email, role = role.unwrap_or("-"), "created user");
        Ok(user_id)
    }

    /// Upsert rows in one transaction, then announce the change.
    pub fn import_leads(&self, records: &[LeadRecord]) -> Result<usize, DataError> {
        let count = self
            .db
            .with_conn(|conn| {
                let tx = conn
                    .transaction()
                    .map_err(|e| ServerError::DbError(format!("begin failed: {e}")))?;
                for record in records {
                    leads::upsert_lead(&tx, record)?;
                }
                tx.commit()
                    .map_err(|e| ServerError::DbError(format!("commit failed: {e}")))?;
                Ok(records.len())
            })
            .map_err(storage)?;

        self.changes.notify();
        Ok(count)
    }
}

impl LeadSource for SqliteBackend {
    fn fetch_all_leads(&self, session: &Session) -> Result<Vec<LeadRecord>, DataError> {
        self.authorize(session)?;
        let rows = self.db.with_conn(|conn| leads::list_leads(conn)).map_err(storage)?;
        debug!(count = rows.len(), "fetched leads from sqlite");
        Ok(rows)
    }

    fn delete_lead(&self, session: &Session, id: &str) -> Result<(), DataError> {
        self.authorize(session)?;
        let removed = self
            .db
            .with_conn(|conn| leads::delete_lead(conn, id))
            .map_err(storage)?;
        if removed == 0 {
            return Err(DataError::NotFound(format!("lead {id}")));
        }
        self.changes.notify();
        Ok(())
    }
}

impl SessionProvider for SqliteBackend {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, DataError> {
        let email = normalize_email(email)?;
        let now = now_unix();

        let user = self
            .db
            .with_conn(|conn| users::find_user_by_email(conn, &email))
            .map_err(storage)?
            .ok_or_else(|| DataError::Auth("invalid login credentials".into()))?;

        if !verify_password(password, &user.password_hash) {
            return Err(DataError::Auth("invalid login credentials".into()));
        }

        let (token, expires_at) = self
            .db
            .with_conn(|conn| {
                let purged = sessions::purge_dead_sessions(conn, now)?;
                if purged > 0 {
                    debug!(purged, "removed expired or revoked sessions");
                }
                users::touch_last_login(conn, user.id, now)?;
                sessions::create_session(conn, user.id, now)
            })
            .map_err(storage)?;

        Ok(Session {
            user_id: user.id.to_string(),
            email: user.email,
            access_token: token,
            expires_at: Some(expires_at),
        })
    }

    fn get_session(&self, access_token: &str) -> Result<Option<Session>, DataError> {
        let stored = self
            .db
            .with_conn(|conn| sessions::load_session(conn, access_token, now_unix()))
            .map_err(storage)?;

        Ok(stored.map(|s| Session {
            user_id: s.user_id.to_string(),
            email: s.email,
            access_token: access_token.to_string(),
            expires_at: Some(s.expires_at),
        }))
    }

    fn get_role(&self, session: &Session) -> Result<Option<String>, DataError> {
        let user_id = self.authorize(session)?;
        self.db
            .with_conn(|conn| users::get_role(conn, user_id))
            .map_err(storage)
    }

    fn sign_out(&self, session: &Session) -> Result<(), DataError> {
        self.db
            .with_conn(|conn| sessions::revoke_session(conn, &session.access_token, now_unix()))
            .map_err(storage)
    }
}
