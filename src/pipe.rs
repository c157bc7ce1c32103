//! # Pipe: owner of one sink/source pair.
//!
//! A [`Pipe`] generates a unique [`Topic`], creates the shared state and hands
//! out one [`SinkChannel`] and one [`SourceChannel`] bound to both.
//!
//! ## Rules
//! - The pipe is the only owner of the channels' lifetime contract: channel
//!   clones may outlive it, but are inert afterwards.
//! - Dropping the pipe (or calling [`Pipe::close`]) marks the state invalidated
//!   and cancels every outstanding token, so nothing stays registered on the
//!   transport.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::channel::state::SharedState;
use crate::channel::{Endpoint, SinkChannel, SourceChannel};
use crate::config::Config;
use crate::topic::Topic;
use crate::transport::{Bus, Transport};

/// Paired sink/source channels sharing one topic and one value slot.
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use pipecast::{Dispatch, Pipe};
///
/// let pipe: Pipe<i32> = Pipe::new();
/// assert!(pipe.sink().write(Some(5)));
///
/// let seen = Arc::new(Mutex::new(None));
/// let s = Arc::clone(&seen);
/// let token = pipe
///     .source()
///     .read(Dispatch::Inline, true, move |v| *s.lock().unwrap() = v)
///     .expect("pipe is alive");
/// assert_eq!(*seen.lock().unwrap(), Some(5));
///
/// let sink = pipe.sink().clone();
/// drop(pipe);
/// assert!(!sink.write(Some(9)));
/// assert!(token.is_cancelled());
/// ```
pub struct Pipe<T> {
    state: Arc<SharedState<T>>,
    sink: SinkChannel<T>,
    source: SourceChannel<T>,
}

impl<T: Clone + Send + Sync + 'static> Pipe<T> {
    /// Creates a pipe on the process-wide [`Bus`] with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a pipe on the process-wide [`Bus`].
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::with_transport(Bus::global(), config)
    }

    /// Creates a pipe publishing through `transport`.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, config: Config) -> Self {
        let topic = Topic::unique(config.prefix());
        let state = Arc::new(SharedState::new());
        let end = Endpoint::new(topic, Arc::clone(&state), transport);

        debug!(topic = %end.topic, "pipe created");
        Self {
            state,
            sink: SinkChannel::new(end.clone()),
            source: SourceChannel::new(end, config.mismatch),
        }
    }
}

impl<T> Pipe<T> {
    /// Write end.
    pub fn sink(&self) -> &SinkChannel<T> {
        &self.sink
    }

    /// Read end.
    pub fn source(&self) -> &SourceChannel<T> {
        &self.source
    }

    /// Topic shared by both ends.
    pub fn topic(&self) -> &Topic {
        self.sink.topic()
    }

    /// Disposes of the pipe explicitly. Same as dropping it.
    pub fn close(self) {
        drop(self);
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Pipe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Pipe<T> {
    fn drop(&mut self) {
        if self.state.invalidate() {
            debug!(topic = %self.sink.topic(), "pipe invalidated");
        }
        self.source.invalidate_all_tokens();
    }
}

impl<T> fmt::Debug for Pipe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipe")
            .field("topic", self.topic())
            .field("live_tokens", &self.source.live_tokens())
            .finish()
    }
}
