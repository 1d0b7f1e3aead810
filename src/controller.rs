// src/controller.rs

//! Per-operator dashboard state.
//!
//! The controller owns the raw lead snapshot and the two filters. Every
//! mutation ends with [`DashboardController::recompute`], which rebuilds the
//! derived view from scratch. Nothing derived survives a snapshot change.

use chrono::{FixedOffset, NaiveDate};
use tracing::{error, info, warn};

use crate::backend::{LeadSource, Session, SessionProvider, ADMIN_ROLE};
use crate::domain::aggregate::DashboardStats;
use crate::domain::filter::{apply_filters, StatusFilter};
use crate::domain::hot::{format_email_list, format_phone_list, select_hot};
use crate::domain::lead::{normalize_all, Lead};
use crate::errors::DataError;

/// Older notifications are dropped once this many are waiting.
const MAX_PENDING_NOTIFICATIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient message shown once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Everything presentation needs, derived from the current snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub filtered: Vec<Lead>,
    pub stats: DashboardStats,
    pub hot: Vec<Lead>,
    pub phone_list: String,
    pub email_list: String,
}

impl DashboardView {
    /// KPIs, charts and the hot list cover the whole snapshot; only the
    /// table rows are filtered.
    pub fn compute(raw: &[Lead], status: &StatusFilter, date: Option<NaiveDate>) -> Self {
        let hot = select_hot(raw);
        Self {
            filtered: apply_filters(raw, status, date),
            stats: DashboardStats::compute(raw),
            phone_list: format_phone_list(&hot),
            email_list: format_email_list(&hot),
            hot,
        }
    }
}

#[derive(Debug)]
pub struct DashboardController {
    session: Option<Session>,
    role: Option<String>,
    display_offset: FixedOffset,
    raw_leads: Vec<Lead>,
    status_filter: StatusFilter,
    date_filter: Option<NaiveDate>,
    view: DashboardView,
    loading: bool,
    needs_login: bool,
    notifications: Vec<Notification>,
}

impl DashboardController {
    pub fn new(session: Session, role: Option<String>, display_offset: FixedOffset) -> Self {
        Self {
            session: Some(session),
            role,
            display_offset,
            raw_leads: Vec::new(),
            status_filter: StatusFilter::All,
            date_filter: None,
            view: DashboardView::default(),
            loading: true,
            needs_login: false,
            notifications: Vec::new(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Gates the delete action and the admin column.
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    pub fn raw_leads(&self) -> &[Lead] {
        &self.raw_leads
    }

    pub fn status_filter(&self) -> &StatusFilter {
        &self.status_filter
    }

    pub fn date_filter(&self) -> Option<NaiveDate> {
        self.date_filter
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// True until the first fetch attempt finishes.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set once the backend rejected the session; the caller should send the
    /// operator back to the sign-in page.
    pub fn needs_login(&self) -> bool {
        self.needs_login
    }

    /// The session carries an expiry and it has passed.
    pub fn session_expired(&self, now: i64) -> bool {
        self.session
            .as_ref()
            .and_then(|s| s.expires_at)
            .is_some_and(|exp| exp <= now)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.push(Notification {
            kind,
            message: message.into(),
        });
        if self.notifications.len() > MAX_PENDING_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    pub fn recompute(&mut self) {
        self.view = DashboardView::compute(&self.raw_leads, &self.status_filter, self.date_filter);
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
        self.recompute();
    }

    pub fn set_date_filter(&mut self, date: Option<NaiveDate>) {
        self.date_filter = date;
        self.recompute();
    }

    pub fn clear_date_filter(&mut self) {
        self.set_date_filter(None);
    }

    /// Swap in a new snapshot in a single assignment.
    pub fn replace_collection(&mut self, leads: Vec<Lead>) {
        self.raw_leads = leads;
        self.recompute();
    }

    fn handle_auth_failure(&mut self, err: &DataError) {
        warn!("backend rejected session: {err}");
        self.needs_login = true;
        self.session = None;
        self.role = None;
    }

    /// Fetch the whole collection and replace the snapshot.
    /// Failures leave the current snapshot untouched. Returns whether the
    /// snapshot was replaced.
    pub fn refresh<S>(&mut self, source: &S) -> bool
    where
        S: LeadSource + ?Sized,
    {
        let Some(session) = self.session.clone() else {
            info!("no session available, skipping fetch");
            self.loading = false;
            return false;
        };

        let result = source.fetch_all_leads(&session);
        self.loading = false;

        match result {
            Ok(records) => {
                let leads = normalize_all(records, self.display_offset);
                info!(user = %session.email, count = leads.len(), "leads fetched");
                let count = leads.len();
                self.replace_collection(leads);
                self.notify(NotificationKind::Success, format!("{count} leads chargés"));
                true
            }
            Err(err @ DataError::Auth(_)) => {
                self.handle_auth_failure(&err);
                false
            }
            Err(err) => {
                error!("error fetching leads: {err}");
                self.notify(
                    NotificationKind::Error,
                    format!("Erreur de chargement des leads: {err}"),
                );
                false
            }
        }
    }

    /// Ask the backend to delete a lead, then re-fetch. The local snapshot is
    /// never edited directly: a lead that survives the delete stays visible.
    pub fn delete_lead<S>(&mut self, source: &S, id: &str)
    where
        S: LeadSource + ?Sized,
    {
        if !self.is_admin() {
            self.notify(
                NotificationKind::Error,
                "Suppression réservée aux administrateurs",
            );
            return;
        }
        let Some(session) = self.session.clone() else {
            return;
        };

        match source.delete_lead(&session, id) {
            Ok(()) => {
                info!(lead_id = id, user = %session.email, "lead deleted");
                self.notify(NotificationKind::Success, "Lead supprimé avec succès");
                self.refresh(source);
            }
            Err(err @ DataError::Auth(_)) => self.handle_auth_failure(&err),
            Err(err) => {
                warn!(lead_id = id, "delete failed: {err}");
                self.notify(
                    NotificationKind::Error,
                    format!("Erreur lors de la suppression: {err}"),
                );
            }
        }
    }

    /// The identity provider reported a new session (or a renewed token).
    pub fn replace_session(&mut self, session: Session, role: Option<String>) {
        self.session = Some(session);
        self.role = role;
        self.needs_login = false;
    }

    /// Sign out and drop everything tied to the session.
    pub fn logout<P>(&mut self, provider: &P) -> Result<(), DataError>
    where
        P: SessionProvider + ?Sized,
    {
        if let Some(session) = self.session.as_ref() {
            if let Err(err) = provider.sign_out(session) {
                self.notify(
                    NotificationKind::Error,
                    format!("Erreur lors de la déconnexion: {err}"),
                );
                return Err(err);
            }
        }
        self.session = None;
        self.role = None;
        self.raw_leads.clear();
        self.recompute();
        self.notify(NotificationKind::Success, "Déconnexion réussie");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::test_support::{record, utc};
    use crate::domain::lead::LeadRecord;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Scripted backend: answers come from `next_fetch`, deletes are recorded.
    struct FakeSource {
        rows: Mutex<Vec<LeadRecord>>,
        fail_fetch: Mutex<Option<DataError>>,
        fail_delete: Mutex<Option<DataError>>,
        deleted: Mutex<Vec<String>>,
        fetches: Mutex<usize>,
    }

    impl FakeSource {
        fn new(rows: Vec<LeadRecord>) -> Self {
            Self {
                rows: Mutex::new(rows),
                fail_fetch: Mutex::new(None),
                fail_delete: Mutex::new(None),
                deleted: Mutex::new(Vec::new()),
                fetches: Mutex::new(0),
            }
        }
    }

    impl LeadSource for FakeSource {
        fn fetch_all_leads(&self, _session: &Session) -> Result<Vec<LeadRecord>, DataError> {
            *self.fetches.lock().unwrap() += 1;
            if let Some(err) = self.fail_fetch.lock().unwrap().clone() {
                return Err(err);
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        fn delete_lead(&self, _session: &Session, id: &str) -> Result<(), DataError> {
            if let Some(err) = self.fail_delete.lock().unwrap().clone() {
                return Err(err);
            }
            self.deleted.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeProvider {
        signed_out: AtomicBool,
    }

    impl SessionProvider for FakeProvider {
        fn sign_in(&self, _: &str, _: &str) -> Result<Session, DataError> {
            Ok(session())
        }
        fn get_session(&self, _: &str) -> Result<Option<Session>, DataError> {
            Ok(Some(session()))
        }
        fn get_role(&self, _: &Session) -> Result<Option<String>, DataError> {
            Ok(None)
        }
        fn sign_out(&self, _: &Session) -> Result<(), DataError> {
            self.signed_out.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn session() -> Session {
        Session {
            user_id: "u1".to_string(),
            email: "ops@example.com".to_string(),
            access_token: "token".to_string(),
            expires_at: None,
        }
    }

    fn rows() -> Vec<LeadRecord> {
        vec![
            record("2", "chaud", "oui", "2024-01-10T10:00:00Z"),
            record("1", "nouveau", "non", "2024-01-03T10:00:00Z"),
        ]
    }

    fn admin() -> DashboardController {
        DashboardController::new(session(), Some("admin".to_string()), utc())
    }

    #[test]
    fn refresh_replaces_snapshot_and_recomputes() {
        let source = FakeSource::new(rows());
        let mut c = admin();
        assert!(c.is_loading());

        assert!(c.refresh(&source));
        assert!(!c.is_loading());
        assert_eq!(c.raw_leads().len(), 2);
        assert_eq!(c.view().stats.total, 2);
        assert_eq!(c.view().stats.hot, 1);
        assert_eq!(c.view().hot.len(), 1);
        assert_eq!(c.view().phone_list, "Client 2: 060000002");
        assert_eq!(
            c.take_notifications(),
            vec![Notification {
                kind: NotificationKind::Success,
                message: "2 leads chargés".to_string()
            }]
        );
        assert!(c.take_notifications().is_empty());
    }

    #[test]
    fn filters_recompute_table_rows_only() {
        let source = FakeSource::new(rows());
        let mut c = admin();
        c.refresh(&source);

        c.set_status_filter(StatusFilter::parse("chaud"));
        let ids: Vec<_> = c.view().filtered.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
        assert_eq!(c.view().stats.total, 2);

        c.set_status_filter(StatusFilter::All);
        c.set_date_filter(NaiveDate::from_ymd_opt(2024, 1, 3));
        let ids: Vec<_> = c.view().filtered.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);

        c.clear_date_filter();
        assert_eq!(c.view().filtered.len(), 2);
    }

    #[test]
    fn network_failure_keeps_previous_snapshot() {
        let source = FakeSource::new(rows());
        let mut c = admin();
        c.refresh(&source);
        c.take_notifications();

        *source.fail_fetch.lock().unwrap() = Some(DataError::Network("timeout".into()));
        assert!(!c.refresh(&source));
        assert_eq!(c.raw_leads().len(), 2);

        let notes = c.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert!(notes[0].message.starts_with("Erreur de chargement des leads"));
        assert!(!c.needs_login());
    }

    #[test]
    fn auth_failure_requires_login() {
        let source = FakeSource::new(rows());
        *source.fail_fetch.lock().unwrap() = Some(DataError::Auth("jwt expired".into()));
        let mut c = admin();

        assert!(!c.refresh(&source));
        assert!(c.needs_login());
        assert!(c.session().is_none());

        c.replace_session(session(), None);
        assert!(!c.needs_login());
        assert!(!c.is_admin());
    }

    #[test]
    fn delete_requests_then_refetches_without_local_removal() {
        let source = FakeSource::new(rows());
        let mut c = admin();
        c.refresh(&source);
        c.take_notifications();

        // The backend "deletes" but still returns the row: it stays visible.
        c.delete_lead(&source, "2");
        assert_eq!(*source.deleted.lock().unwrap(), vec!["2".to_string()]);
        assert_eq!(*source.fetches.lock().unwrap(), 2);
        assert_eq!(c.raw_leads().len(), 2);

        let messages: Vec<_> = c.take_notifications().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["Lead supprimé avec succès", "2 leads chargés"]);
    }

    #[test]
    fn delete_not_found_is_a_notification() {
        let source = FakeSource::new(rows());
        *source.fail_delete.lock().unwrap() = Some(DataError::NotFound("lead 9".into()));
        let mut c = admin();

        c.delete_lead(&source, "9");
        let notes = c.take_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.starts_with("Erreur lors de la suppression"));
        assert_eq!(*source.fetches.lock().unwrap(), 0);
    }

    #[test]
    fn delete_is_gated_by_role() {
        let source = FakeSource::new(rows());
        let mut c = DashboardController::new(session(), Some("agent".to_string()), utc());

        c.delete_lead(&source, "2");
        assert!(source.deleted.lock().unwrap().is_empty());
        assert_eq!(c.take_notifications()[0].kind, NotificationKind::Error);
    }

    #[test]
    fn logout_clears_session_and_snapshot() {
        let source = FakeSource::new(rows());
        let provider = FakeProvider::default();
        let mut c = admin();
        c.refresh(&source);

        c.logout(&provider).unwrap();
        assert!(provider.signed_out.load(Ordering::SeqCst));
        assert!(c.session().is_none());
        assert!(c.raw_leads().is_empty());
        assert_eq!(c.view(), &DashboardView::default());

        // Without a session a refresh is a no-op.
        assert!(!c.refresh(&source));
    }
}
