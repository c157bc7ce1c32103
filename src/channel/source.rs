//! # Read end of a pipe.
//!
//! [`SourceChannel::read`] registers a callback on the pipe's topic and hands
//! back a [`SubscriptionToken`]. The channel remembers every token it produced
//! so the pipe can cancel them all when it is dropped, but only through `Weak`
//! references: a token's lifetime belongs to whoever received it.
//!
//! ## Lifecycle
//! ```text
//! read(dispatch, replay, cb)
//!   ├─► invalidated? ─► None
//!   ├─► transport.subscribe(topic, dispatch, decode ∘ cb) ─► handle
//!   ├─► token = SubscriptionToken(handle)
//!   ├─► tokens.retain(alive); tokens.push(weak(token))
//!   ├─► replay && written? ─► cb(last) on the caller's thread
//!   └─► Some(token)
//!
//! Pipe::drop ─► invalidate_all_tokens() ─► cancel every live token
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use super::token::{SubscriptionToken, TokenState};
use super::{Endpoint, decode};
use crate::config::MismatchPolicy;
use crate::dispatch::Dispatch;
use crate::error::PipeError;
use crate::topic::Topic;
use crate::transport::{Callback, Payload};

type TokenList = Mutex<Vec<Weak<TokenState>>>;

/// Read endpoint of a [`Pipe`](crate::Pipe).
///
/// Clones share the same token bookkeeping.
pub struct SourceChannel<T> {
    end: Endpoint<T>,
    mismatch: MismatchPolicy,
    tokens: Arc<TokenList>,
}

impl<T> SourceChannel<T> {
    pub(crate) fn new(end: Endpoint<T>, mismatch: MismatchPolicy) -> Self {
        Self {
            end,
            mismatch,
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// True once the owning pipe is gone.
    #[inline]
    pub fn is_invalidated(&self) -> bool {
        self.end.is_invalidated()
    }

    /// Topic this source subscribes to.
    pub fn topic(&self) -> &Topic {
        &self.end.topic
    }

    /// True if a replaying `read` would deliver a value right away.
    pub fn has_value(&self) -> bool {
        self.end.state.has_written()
    }

    /// Cancels every still-live token produced by this channel.
    ///
    /// Idempotent. Called by the pipe when it is dropped.
    pub fn invalidate_all_tokens(&self) {
        let tokens: Vec<Weak<TokenState>> = self.tokens().drain(..).collect();
        let mut cancelled = 0usize;
        for token in tokens.iter().filter_map(Weak::upgrade) {
            if token.cancel() {
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!(topic = %self.end.topic, cancelled, "tokens invalidated");
        }
    }

    /// Number of tokens from this channel that are still held and not cancelled.
    pub fn live_tokens(&self) -> usize {
        let mut tokens = self.tokens();
        tokens.retain(|w| w.strong_count() > 0);
        tokens.len()
    }

    fn tokens(&self) -> MutexGuard<'_, Vec<Weak<TokenState>>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + Sync + 'static> SourceChannel<T> {
    /// Subscribes `callback` to every subsequent write.
    ///
    /// - `dispatch`: where the callback runs; [`Dispatch::Inline`] uses the
    ///   publishing thread.
    /// - `replay`: if something was written before, `callback` is first invoked
    ///   once with the last value, on the calling thread, before `read` returns.
    ///
    /// Returns `None` if the pipe is invalidated.
    pub fn read<F>(&self, dispatch: Dispatch, replay: bool, callback: F) -> Option<SubscriptionToken>
    where
        F: Fn(Option<T>) + Send + Sync + 'static,
    {
        self.try_read(dispatch, replay, callback).ok()
    }

    /// Like [`Self::read`] but reports why no subscription was created.
    pub fn try_read<F>(
        &self,
        dispatch: Dispatch,
        replay: bool,
        callback: F,
    ) -> Result<SubscriptionToken, PipeError>
    where
        F: Fn(Option<T>) + Send + Sync + 'static,
    {
        self.end.ensure_valid()?;

        let callback = Arc::new(callback);
        let handler = self.handler(Arc::clone(&callback));
        let handle = self.end.transport.subscribe(&self.end.topic, dispatch, handler);
        let token = SubscriptionToken::new(handle, Arc::clone(&self.end.transport));

        {
            let mut tokens = self.tokens();
            tokens.retain(|w| w.strong_count() > 0);
            tokens.push(token.downgrade());
        }

        if replay {
            if let Some(last) = self.end.state.last() {
                callback(last);
            }
        }

        Ok(token)
    }

    /// Wraps a typed callback into a transport callback.
    fn handler<F>(&self, callback: Arc<F>) -> Callback
    where
        F: Fn(Option<T>) + Send + Sync + 'static,
    {
        let topic = self.end.topic.clone();
        let mismatch = self.mismatch;
        Arc::new(move |payload: Payload| match decode::<T>(&topic, payload.as_deref()) {
            Ok(value) => callback(value),
            Err(err) => match mismatch {
                MismatchPolicy::Degrade => {
                    debug!(topic = %topic, error = %err, "payload degraded to None");
                    callback(None);
                }
                MismatchPolicy::Drop => {
                    warn!(topic = %topic, label = err.as_label(), error = %err, "payload dropped");
                }
            },
        })
    }
}

impl<T> Clone for SourceChannel<T> {
    fn clone(&self) -> Self {
        Self {
            end: self.end.clone(),
            mismatch: self.mismatch,
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<T> fmt::Debug for SourceChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceChannel")
            .field("end", &self.end)
            .field("mismatch", &self.mismatch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::state::SharedState;
    use crate::transport::Transport;
    use crate::transport::mock::CountingTransport;

    fn source(transport: &Arc<CountingTransport>, mismatch: MismatchPolicy) -> SourceChannel<i32> {
        SourceChannel::new(
            Endpoint::new(
                Topic::named("source"),
                Arc::new(SharedState::new()),
                Arc::clone(transport) as Arc<dyn Transport>,
            ),
            mismatch,
        )
    }

    fn capture() -> (Arc<Mutex<Vec<Option<i32>>>>, impl Fn(Option<i32>) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        (seen, move |v| s.lock().unwrap().push(v))
    }

    #[test]
    fn replay_without_write_does_nothing() {
        let transport = CountingTransport::new();
        let src = source(&transport, MismatchPolicy::Degrade);
        let (seen, cb) = capture();
        let _tok = src.read(Dispatch::Inline, true, cb).unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn replay_delivers_absent_last_value() {
        let transport = CountingTransport::new();
        let src = source(&transport, MismatchPolicy::Degrade);
        assert!(!src.has_value());
        src.end.state.record(None);
        assert!(src.has_value());
        let (seen, cb) = capture();
        let _tok = src.read(Dispatch::Inline, true, cb).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[test]
    fn dropped_tokens_are_pruned() {
        let transport = CountingTransport::new();
        let src = source(&transport, MismatchPolicy::Degrade);

        let keep = src.read(Dispatch::Inline, false, |_| {}).unwrap();
        drop(src.read(Dispatch::Inline, false, |_| {}).unwrap());
        assert_eq!(transport.live(), 1);
        assert_eq!(src.live_tokens(), 1);

        src.invalidate_all_tokens();
        assert!(keep.is_cancelled());
        assert_eq!(transport.live(), 0);
        assert_eq!(src.live_tokens(), 0);

        // second pass is a no-op
        src.invalidate_all_tokens();
        assert_eq!(transport.unsubscribes(), 2);
    }

    #[test]
    fn mismatched_payload_degrades_to_none() {
        let transport = CountingTransport::new();
        let src = source(&transport, MismatchPolicy::Degrade);
        let (seen, cb) = capture();
        let _tok = src.read(Dispatch::Inline, false, cb).unwrap();

        transport.publish(src.topic(), Some(Arc::new("not an int")));
        transport.publish(src.topic(), Some(Arc::new(3i32)));
        assert_eq!(*seen.lock().unwrap(), vec![None, Some(3)]);
    }

    #[test]
    fn mismatched_payload_dropped_under_drop_policy() {
        let transport = CountingTransport::new();
        let src = source(&transport, MismatchPolicy::Drop);
        let (seen, cb) = capture();
        let _tok = src.read(Dispatch::Inline, false, cb).unwrap();

        transport.publish(src.topic(), Some(Arc::new(1.5f64)));
        transport.publish(src.topic(), None);
        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[test]
    fn clones_share_token_bookkeeping() {
        let transport = CountingTransport::new();
        let src = source(&transport, MismatchPolicy::Degrade);
        let other = src.clone();
        let tok = other.read(Dispatch::Inline, false, |_| {}).unwrap();

        src.invalidate_all_tokens();
        assert!(tok.is_cancelled());
    }
}
