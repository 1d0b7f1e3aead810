// src/backend/changes.rs

use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use crate::backend::ChangeFeed;

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    subscribers: Vec<(u64, Callback)>,
}

/// In-process change notifier. The webhook route and the local backend call
/// [`ChangeHub::notify`]; subscribers re-fetch on their own.
#[derive(Clone, Default)]
pub struct ChangeHub {
    inner: Arc<Mutex<HubInner>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every callback once. Callbacks run outside the hub lock so they
    /// may subscribe or unsubscribe.
    pub fn notify(&self) {
        let callbacks: Vec<Callback> = match self.inner.lock() {
            Ok(inner) => inner.subscribers.iter().map(|(_, cb)| cb.clone()).collect(),
            Err(_) => return,
        };
        debug!(subscribers = callbacks.len(), "lead change notification");
        for cb in callbacks {
            cb();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().map(|i| i.subscribers.len()).unwrap_or(0)
    }
}

impl ChangeFeed for ChangeHub {
    fn subscribe(&self, callback: Box<dyn Fn() + Send + Sync>) -> Subscription {
        let id = match self.inner.lock() {
            Ok(mut inner) => {
                let id = inner.next_id;
                inner.next_id += 1;
                inner.subscribers.push((id, Arc::from(callback)));
                id
            }
            Err(_) => u64::MAX,
        };
        Subscription {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }
}

/// Handle returned by [`ChangeFeed::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    hub: Weak<Mutex<HubInner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            if let Ok(mut inner) = inner.lock() {
                inner.subscribers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}
