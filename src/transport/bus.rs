//! # In-process topic registry.
//!
//! [`Bus`] maps each [`Topic`] to the subscriptions registered for it.
//!
//! ## Rules
//! - **Snapshot, then deliver**: `publish` clones the entry list under the lock
//!   and invokes callbacks after releasing it, so callbacks may subscribe,
//!   unsubscribe or publish re-entrantly.
//! - **Cancellation wins over queued work**: every entry carries an `active` flag
//!   cleared by `unsubscribe`. Deliveries queued on a [`DispatchQueue`] check it
//!   before running the callback.
//! - **No persistence**: payloads published on a topic without subscribers are dropped.
//! - Empty topics are removed from the map.
//!
//! A delivery already running on another thread when `unsubscribe` is called
//! still completes.
//!
//! [`DispatchQueue`]: crate::DispatchQueue

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::{debug, warn};

use super::{Callback, Payload, SubscriptionHandle, Transport};
use crate::dispatch::Dispatch;
use crate::topic::Topic;

/// Registered subscription.
#[derive(Clone)]
struct Entry {
    id: u64,
    dispatch: Dispatch,
    callback: Callback,
    active: Arc<AtomicBool>,
}

/// In-process named-event bus.
#[derive(Default)]
pub struct Bus {
    next_id: AtomicU64,
    topics: Mutex<HashMap<Topic, Vec<Entry>>>,
}

impl Bus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide bus used by [`Pipe::new`](crate::Pipe::new).
    pub fn global() -> Arc<Bus> {
        static GLOBAL: OnceLock<Arc<Bus>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Bus::new())))
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.entries().get(topic).map_or(0, Vec::len)
    }

    /// Number of topics with at least one subscription.
    pub fn topic_count(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Topic, Vec<Entry>>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for Bus {
    fn publish(&self, topic: &Topic, payload: Payload) {
        let snapshot: Vec<Entry> = match self.entries().get(topic) {
            Some(entries) => entries.clone(),
            None => return,
        };

        for entry in snapshot {
            let Entry {
                dispatch,
                callback,
                active,
                ..
            } = entry;
            let payload = payload.clone();
            let delivered = dispatch.run(Box::new(move || {
                if active.load(Ordering::Acquire) {
                    callback(payload);
                }
            }));
            if !delivered {
                warn!(topic = %topic, "delivery dropped: dispatch queue closed");
            }
        }
    }

    fn subscribe(
        &self,
        topic: &Topic,
        dispatch: Dispatch,
        callback: Callback,
    ) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries().entry(topic.clone()).or_default().push(Entry {
            id,
            dispatch,
            callback,
            active: Arc::new(AtomicBool::new(true)),
        });
        debug!(topic = %topic, id, "subscribed");
        SubscriptionHandle::new(topic.clone(), id)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) {
        // Callbacks may own tokens or pipes on this bus; drop them after the lock.
        let removed: Option<Entry>;
        let emptied: Option<Vec<Entry>>;
        {
            let mut topics = self.entries();
            let Some(entries) = topics.get_mut(handle.topic()) else {
                return;
            };
            removed = entries
                .iter()
                .position(|e| e.id == handle.id())
                .map(|pos| entries.remove(pos));
            emptied = if entries.is_empty() {
                topics.remove(handle.topic())
            } else {
                None
            };
        }

        if let Some(entry) = removed {
            entry.active.store(false, Ordering::Release);
            debug!(topic = %handle.topic(), id = handle.id(), "unsubscribed");
        }
        drop(emptied);
    }
}
