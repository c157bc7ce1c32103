//! Counting transport for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Bus, Callback, Payload, SubscriptionHandle, Transport};
use crate::dispatch::Dispatch;
use crate::topic::Topic;

/// Wraps a [`Bus`] and records live handles, publishes and unsubscribe calls.
#[derive(Default)]
pub(crate) struct CountingTransport {
    inner: Bus,
    live: Mutex<HashSet<SubscriptionHandle>>,
    published: AtomicUsize,
    unsubscribes: AtomicUsize,
}

impl CountingTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn live(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub(crate) fn live_on(&self, topic: &Topic) -> usize {
        self.live
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.topic() == topic)
            .count()
    }

    pub(crate) fn published(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }

    pub(crate) fn unsubscribes(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }
}

impl Transport for CountingTransport {
    fn publish(&self, topic: &Topic, payload: Payload) {
        self.published.fetch_add(1, Ordering::SeqCst);
        self.inner.publish(topic, payload);
    }

    fn subscribe(
        &self,
        topic: &Topic,
        dispatch: Dispatch,
        callback: Callback,
    ) -> SubscriptionHandle {
        let handle = self.inner.subscribe(topic, dispatch, callback);
        self.live.lock().unwrap().insert(handle.clone());
        handle
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        self.live.lock().unwrap().remove(handle);
        self.inner.unsubscribe(handle);
    }
}
