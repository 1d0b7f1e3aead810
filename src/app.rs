// src/app.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{FixedOffset, Utc};
use tracing::{info, warn};

use crate::backend::{Backend, ChangeHub, Session};
use crate::config::AppConfig;
use crate::controller::DashboardController;
use crate::errors::{DataError, ServerError};

type Slot = Arc<Mutex<DashboardController>>;

/// Shared state handed to every request handler.
///
/// One [`DashboardController`] per signed-in session, keyed by the session
/// token carried in the `session` cookie. Each controller has its own lock,
/// so a dashboard is updated one event at a time. The map lock only covers
/// lookup, insert and removal; backend calls never run under it, and one
/// operator's slow fetch never holds up another operator's page.
pub struct AppState {
    backend: Arc<dyn Backend>,
    changes: ChangeHub,
    display_offset: FixedOffset,
    webhook_secret: Option<String>,
    controllers: Mutex<HashMap<String, Slot>>,
}

fn lock(slot: &Slot) -> Result<MutexGuard<'_, DashboardController>, ServerError> {
    slot.lock().map_err(|_| ServerError::InternalError)
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, changes: ChangeHub, config: &AppConfig) -> Self {
        Self {
            backend,
            changes,
            display_offset: config.display_offset,
            webhook_secret: config.webhook_secret.clone(),
            controllers: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn changes(&self) -> &ChangeHub {
        &self.changes
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref()
    }

    fn controllers(&self) -> Result<MutexGuard<'_, HashMap<String, Slot>>, ServerError> {
        self.controllers.lock().map_err(|_| ServerError::InternalError)
    }

    fn slot(&self, token: &str) -> Result<Option<Slot>, ServerError> {
        Ok(self.controllers()?.get(token).cloned())
    }

    /// Remove `token` only if it still maps to `slot`; a newer dashboard
    /// opened under the same token stays.
    fn forget(&self, token: &str, slot: &Slot) -> Result<(), ServerError> {
        let mut controllers = self.controllers()?;
        if controllers.get(token).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            controllers.remove(token);
        }
        Ok(())
    }

    fn role_for(&self, session: &Session) -> Option<String> {
        self.backend.get_role(session).unwrap_or_else(|err| {
            warn!(user = %session.email, "role lookup failed: {err}");
            None
        })
    }

    /// Build a controller for a fresh session and run the initial fetch.
    fn open_controller(&self, session: Session) -> DashboardController {
        let role = self.role_for(&session);
        let mut controller = DashboardController::new(session, role, self.display_offset);
        controller.refresh(self.backend());
        controller
    }

    /// Authenticate and open a dashboard. Returns the session token.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<String, DataError> {
        let session = self.backend.sign_in(email, password)?;
        info!(user = %session.email, "signed in");

        let token = session.access_token.clone();
        let controller = self.open_controller(session);
        self.controllers()
            .map_err(|e| DataError::Network(e.to_string()))?
            .insert(token.clone(), Arc::new(Mutex::new(controller)));
        Ok(token)
    }

    /// Live controller for `token`, restoring one through the identity
    /// provider when none is open (e.g. after a restart).
    fn open_slot(&self, token: &str) -> Result<Option<Slot>, ServerError> {
        if let Some(slot) = self.slot(token)? {
            return Ok(Some(slot));
        }

        let session = match self.backend.get_session(token) {
            Ok(Some(session)) => session,
            Ok(None) | Err(DataError::Auth(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        info!(user = %session.email, "restoring dashboard for existing session");
        let controller = self.open_controller(session);

        // Two requests may restore the same token at once; the first insert wins.
        let slot = self
            .controllers()?
            .entry(token.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(controller)))
            .clone();
        Ok(Some(slot))
    }

    /// Run `f` against the dashboard bound to `token`. `Ok(None)` means the
    /// operator must sign in again.
    pub fn with_dashboard<T, F>(&self, token: &str, f: F) -> Result<Option<T>, ServerError>
    where
        F: FnOnce(&mut DashboardController, &dyn Backend) -> T,
    {
        let Some(slot) = self.open_slot(token)? else {
            return Ok(None);
        };
        let mut controller = lock(&slot)?;

        if controller.session_expired(Utc::now().timestamp()) {
            match self.backend.get_session(token) {
                Ok(Some(session)) => {
                    let role = self.role_for(&session);
                    controller.replace_session(session, role);
                }
                Ok(None) | Err(DataError::Auth(_)) => {
                    drop(controller);
                    self.forget(token, &slot)?;
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }
        }
        if controller.needs_login() {
            drop(controller);
            self.forget(token, &slot)?;
            return Ok(None);
        }

        let out = f(&mut *controller, self.backend());

        if controller.needs_login() {
            drop(controller);
            self.forget(token, &slot)?;
            return Ok(None);
        }
        Ok(Some(out))
    }

    /// Sign out and forget the dashboard.
    pub fn sign_out(&self, token: &str) -> Result<(), ServerError> {
        let removed = self.controllers()?.remove(token);
        match removed {
            Some(slot) => lock(&slot)?.logout(self.backend())?,
            None => {
                if let Some(session) = self.backend.get_session(token)? {
                    self.backend.sign_out(&session)?;
                }
            }
        }
        Ok(())
    }

    /// Re-fetch every open dashboard, one at a time, each under its own lock.
    /// Dashboards whose session was rejected are dropped. Returns how many
    /// were refreshed successfully.
    pub fn refresh_all(&self) -> Result<usize, ServerError> {
        let slots: Vec<(String, Slot)> = self
            .controllers()?
            .iter()
            .map(|(token, slot)| (token.clone(), slot.clone()))
            .collect();

        let mut refreshed = 0;
        let mut rejected = Vec::new();
        for (token, slot) in slots {
            let mut controller = lock(&slot)?;
            if controller.refresh(self.backend()) {
                refreshed += 1;
            }
            if controller.needs_login() {
                rejected.push((token, slot.clone()));
            }
        }
        for (token, slot) in rejected {
            self.forget(&token, &slot)?;
        }
        Ok(refreshed)
    }

    /// Email of an already open dashboard. Never contacts the backend.
    pub fn signed_in_email(&self, token: &str) -> Option<String> {
        let slot = self.slot(token).ok()??;
        let controller = slot.lock().ok()?;
        let email = controller.session().map(|s| s.email.clone());
        email
    }

    pub fn open_dashboards(&self) -> usize {
        self.controllers.lock().map(|c| c.len()).unwrap_or(0)
    }
}
