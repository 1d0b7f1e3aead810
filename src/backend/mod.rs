//! Boundary contracts with the lead data source and the identity provider.

pub mod changes;
pub mod sqlite;
pub mod supabase;

use crate::domain::lead::LeadRecord;
use crate::errors::DataError;

pub use changes::{ChangeHub, Subscription};
pub use sqlite::SqliteBackend;
pub use supabase::SupabaseBackend;

/// An authenticated operator session. Replaced wholesale whenever the
/// identity provider reports a change, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    /// Bearer token presented to the backend; also the dashboard cookie value.
    pub access_token: String,
    /// Unix seconds, when the provider told us.
    pub expires_at: Option<i64>,
}

/// Role that unlocks lead deletion.
pub const ADMIN_ROLE: &str = "admin";

pub trait LeadSource: Send + Sync {
    /// Full collection, newest `timestamp` first.
    fn fetch_all_leads(&self, session: &Session) -> Result<Vec<LeadRecord>, DataError>;

    fn delete_lead(&self, session: &Session, id: &str) -> Result<(), DataError>;
}

pub trait SessionProvider: Send + Sync {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, DataError>;

    /// Resolve a bearer token back into a session. `Ok(None)` when the token
    /// is unknown or expired.
    fn get_session(&self, access_token: &str) -> Result<Option<Session>, DataError>;

    /// Role of the session's user, if one is assigned.
    fn get_role(&self, session: &Session) -> Result<Option<String>, DataError>;

    fn sign_out(&self, session: &Session) -> Result<(), DataError>;
}

/// Something that announces "lead rows changed" without saying which.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, callback: Box<dyn Fn() + Send + Sync>) -> Subscription;
}

/// Everything the web app needs from a backend.
pub trait Backend: LeadSource + SessionProvider {}

impl<T: LeadSource + SessionProvider> Backend for T {}
