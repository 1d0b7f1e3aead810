// src/refresher.rs

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::app::AppState;
use crate::backend::{ChangeFeed, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Changed,
    Stop,
}

/// Background thread that re-fetches every open dashboard on a fixed period
/// and whenever the change feed fires.
///
/// Triggers are not deduplicated: a timer tick right after a change
/// notification fetches twice, and the last fetch to finish wins.
pub struct Refresher {
    handle: JoinHandle<()>,
    signals: Sender<Signal>,
    _subscription: Subscription,
}

impl Refresher {
    pub fn spawn<F>(state: Arc<AppState>, feed: &F, interval: Duration) -> io::Result<Self>
    where
        F: ChangeFeed + ?Sized,
    {
        let (tx, rx) = mpsc::channel();

        let notifier = tx.clone();
        let subscription = feed.subscribe(Box::new(move || {
            // Receiver gone means we're shutting down.
            let _ = notifier.send(Signal::Changed);
        }));

        let handle = thread::Builder::new()
            .name("lead-refresher".to_string())
            .spawn(move || loop {
                let trigger = match rx.recv_timeout(interval) {
                    Ok(Signal::Changed) => "change notification",
                    Err(RecvTimeoutError::Timeout) => "timer",
                    Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                };
                match state.refresh_all() {
                    Ok(n) => debug!(trigger, refreshed = n, "dashboards refreshed"),
                    Err(err) => error!(trigger, "refresh failed: {err}"),
                }
            })?;

        info!(interval_secs = interval.as_secs(), "refresher started");
        Ok(Self {
            handle,
            signals: tx,
            _subscription: subscription,
        })
    }

    /// Stop the loop and wait for the in-flight refresh, if any.
    pub fn shutdown(self) {
        let _ = self.signals.send(Signal::Stop);
        if self.handle.join().is_err() {
            error!("refresher thread panicked");
        }
    }
}
