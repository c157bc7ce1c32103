//! # Subscription tokens.
//!
//! A [`SubscriptionToken`] owns exactly one transport registration and releases
//! it exactly once: on [`SubscriptionToken::cancel`], on drop, or when the
//! owning pipe goes away, whichever happens first.
//!
//! The source channel keeps only `Weak` references to token state, so dropping
//! the last token is enough to unsubscribe.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::debug;

use crate::topic::Topic;
use crate::transport::{SubscriptionHandle, Transport};

/// Shared part of a token; reachable weakly from the source channel.
pub(crate) struct TokenState {
    handle: Mutex<Option<SubscriptionHandle>>,
    transport: Arc<dyn Transport>,
}

impl TokenState {
    /// Releases the registration. Returns `false` if it was already released.
    pub(crate) fn cancel(&self) -> bool {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(handle) => {
                self.transport.unsubscribe(&handle);
                debug!(topic = %handle.topic(), id = handle.id(), "token cancelled");
                true
            }
            None => false,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn topic(&self) -> Option<Topic> {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|h| h.topic().clone())
    }
}

impl Drop for TokenState {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Handle to one active subscription.
///
/// Dropping the token cancels the subscription. Keep it alive for as long as
/// the callback should fire.
#[must_use = "dropping the token cancels the subscription"]
pub struct SubscriptionToken {
    state: Arc<TokenState>,
}

impl SubscriptionToken {
    pub(crate) fn new(handle: SubscriptionHandle, transport: Arc<dyn Transport>) -> Self {
        Self {
            state: Arc::new(TokenState {
                handle: Mutex::new(Some(handle)),
                transport,
            }),
        }
    }

    /// Removes the subscription from the transport. Further calls do nothing.
    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// True once the subscription was released.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// Topic of the subscription, `None` once cancelled.
    #[must_use]
    pub fn topic(&self) -> Option<Topic> {
        self.state.topic()
    }

    pub(crate) fn downgrade(&self) -> Weak<TokenState> {
        Arc::downgrade(&self.state)
    }
}

impl fmt::Debug for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionToken")
            .field("topic", &self.topic())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatch;
    use crate::transport::Payload;
    use crate::transport::mock::CountingTransport;

    fn token(transport: &Arc<CountingTransport>) -> SubscriptionToken {
        let t = Topic::named("tok");
        let handle = transport.subscribe(&t, Dispatch::Inline, Arc::new(|_: Payload| {}));
        SubscriptionToken::new(handle, Arc::clone(transport) as Arc<dyn Transport>)
    }

    #[test]
    fn cancel_is_idempotent() {
        let transport = CountingTransport::new();
        let tok = token(&transport);
        assert_eq!(transport.live(), 1);

        tok.cancel();
        tok.cancel();
        assert!(tok.is_cancelled());
        assert_eq!(tok.topic(), None);
        assert_eq!(transport.live(), 0);
        assert_eq!(transport.unsubscribes(), 1);
    }

    #[test]
    fn drop_cancels() {
        let transport = CountingTransport::new();
        let tok = token(&transport);
        let weak = tok.downgrade();
        drop(tok);
        assert_eq!(transport.live(), 0);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn drop_after_cancel_does_not_unsubscribe_twice() {
        let transport = CountingTransport::new();
        let tok = token(&transport);
        tok.cancel();
        drop(tok);
        assert_eq!(transport.unsubscribes(), 1);
    }
}
