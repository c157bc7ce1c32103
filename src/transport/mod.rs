//! # Transport: the named-event bus pipes publish through.
//!
//! A [`Transport`] routes opaque payloads by [`Topic`]. Pipes never hold direct
//! references between writers and readers; the sink publishes under its topic
//! and every subscription registered for that topic receives the payload.
//!
//! ## Architecture
//! ```text
//! SinkChannel ── publish(topic, payload) ──► Transport ──► entries[topic]
//!                                                            ├─► (dispatch, callback)
//! SourceChannel ── subscribe(topic, ..) ─────► handle        ├─► (dispatch, callback)
//! SubscriptionToken ── unsubscribe(handle) ──► remove entry  └─► ...
//! ```
//!
//! [`Bus`] is the in-process implementation and the default transport
//! ([`Bus::global`]).

mod bus;
#[cfg(test)]
pub(crate) mod mock;

use std::any::Any;
use std::sync::Arc;

pub use bus::Bus;

use crate::dispatch::Dispatch;
use crate::topic::Topic;

/// Opaque payload carried by the transport. `None` marks an absent value.
pub type Payload = Option<Arc<dyn Any + Send + Sync>>;

/// Callback registered with a transport.
pub type Callback = Arc<dyn Fn(Payload) + Send + Sync + 'static>;

/// Identifies one registration on a transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    topic: Topic,
    id: u64,
}

impl SubscriptionHandle {
    /// Builds a handle. Transports choose ids unique per instance.
    pub fn new(topic: Topic, id: u64) -> Self {
        Self { topic, id }
    }

    /// Topic the subscription is registered under.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Transport-assigned id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Publish/subscribe by topic.
///
/// ### Implementation requirements
/// - `publish` delivers to every subscription registered for the topic at call
///   time, honoring each subscription's [`Dispatch`].
/// - `unsubscribe` is idempotent; unknown handles are ignored.
/// - No method may block on subscriber callbacks running on other contexts.
pub trait Transport: Send + Sync + 'static {
    /// Delivers `payload` to all current subscribers of `topic`.
    fn publish(&self, topic: &Topic, payload: Payload);

    /// Registers `callback` for `topic`, invoked on `dispatch`.
    fn subscribe(
        &self,
        topic: &Topic,
        dispatch: Dispatch,
        callback: Callback,
    ) -> SubscriptionHandle;

    /// Removes a registration.
    fn unsubscribe(&self, handle: &SubscriptionHandle);
}
