//! # Pipe endpoints.
//!
//! - [`SinkChannel`]: write end; records the value and publishes it.
//! - [`SourceChannel`]: read end; creates subscriptions and tracks their tokens.
//! - [`SubscriptionToken`]: one live subscription; cancelled on drop.
//!
//! Both channel kinds share the topic, the [`SharedState`](state::SharedState)
//! and the transport of the pipe that created them.

mod sink;
mod source;
pub(crate) mod state;
mod token;

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

pub use sink::SinkChannel;
pub use source::SourceChannel;
pub use token::SubscriptionToken;

use crate::error::PipeError;
use crate::topic::Topic;
use crate::transport::Transport;
use state::SharedState;

/// Fields common to both channel kinds.
pub(crate) struct Endpoint<T> {
    pub(crate) topic: Topic,
    pub(crate) state: Arc<SharedState<T>>,
    pub(crate) transport: Arc<dyn Transport>,
}

impl<T> Endpoint<T> {
    pub(crate) fn new(
        topic: Topic,
        state: Arc<SharedState<T>>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            topic,
            state,
            transport,
        }
    }

    #[inline]
    pub(crate) fn is_invalidated(&self) -> bool {
        self.state.is_invalidated()
    }

    pub(crate) fn ensure_valid(&self) -> Result<(), PipeError> {
        if self.is_invalidated() {
            return Err(PipeError::Invalidated {
                topic: self.topic.to_string(),
            });
        }
        Ok(())
    }
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
            state: Arc::clone(&self.state),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("topic", &self.topic)
            .field("invalidated", &self.is_invalidated())
            .finish()
    }
}

/// Interprets a transport payload as `Option<T>`.
///
/// Absent payloads decode to `Ok(None)`.
pub(crate) fn decode<T: Clone + 'static>(
    topic: &Topic,
    payload: Option<&(dyn Any + Send + Sync)>,
) -> Result<Option<T>, PipeError> {
    match payload {
        None => Ok(None),
        Some(any) => any
            .downcast_ref::<T>()
            .cloned()
            .map(Some)
            .ok_or_else(|| PipeError::TypeMismatch {
                topic: topic.to_string(),
                expected: type_name::<T>(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_matches_type() {
        let t = Topic::named("d");
        let v: Arc<dyn Any + Send + Sync> = Arc::new(7u8);
        assert_eq!(decode::<u8>(&t, Some(v.as_ref())), Ok(Some(7)));
        assert_eq!(decode::<u8>(&t, None), Ok(None));
    }

    #[test]
    fn decode_reports_mismatch() {
        let t = Topic::named("d");
        let v: Arc<dyn Any + Send + Sync> = Arc::new("text");
        let err = decode::<u8>(&t, Some(v.as_ref())).unwrap_err();
        assert_eq!(err.as_label(), "pipe_type_mismatch");
    }
}
