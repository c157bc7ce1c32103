//! Write end of a pipe.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::Endpoint;
use crate::error::PipeError;
use crate::topic::Topic;
use crate::transport::Payload;

/// Write endpoint of a [`Pipe`](crate::Pipe).
///
/// Each write overwrites the single value slot and is published to every
/// current subscriber. Clones write into the same pipe.
pub struct SinkChannel<T> {
    end: Endpoint<T>,
}

impl<T> SinkChannel<T> {
    pub(crate) fn new(end: Endpoint<T>) -> Self {
        Self { end }
    }

    /// True once the owning pipe is gone.
    #[inline]
    pub fn is_invalidated(&self) -> bool {
        self.end.is_invalidated()
    }

    /// Topic this sink publishes under.
    pub fn topic(&self) -> &Topic {
        &self.end.topic
    }
}

impl<T: Clone + Send + Sync + 'static> SinkChannel<T> {
    /// Writes `value` and publishes it.
    ///
    /// Returns `false` (and does nothing) if the pipe is invalidated.
    /// Subscribers using [`Dispatch::Inline`](crate::Dispatch::Inline) run before
    /// this returns.
    pub fn write(&self, value: Option<T>) -> bool {
        self.try_write(value).is_ok()
    }

    /// Like [`Self::write`] but reports why the value was dropped.
    pub fn try_write(&self, value: Option<T>) -> Result<(), PipeError> {
        self.end.ensure_valid()?;

        self.end.state.record(value.clone());
        let payload: Payload = value.map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>);
        self.end.transport.publish(&self.end.topic, payload);
        Ok(())
    }
}

impl<T> Clone for SinkChannel<T> {
    fn clone(&self) -> Self {
        Self {
            end: self.end.clone(),
        }
    }
}

impl<T> fmt::Debug for SinkChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SinkChannel").field(&self.end).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::state::SharedState;
    use crate::transport::mock::CountingTransport;

    fn sink(transport: Arc<CountingTransport>) -> SinkChannel<i32> {
        SinkChannel::new(Endpoint::new(
            Topic::named("sink"),
            Arc::new(SharedState::new()),
            transport,
        ))
    }

    #[test]
    fn write_records_and_publishes() {
        let transport = CountingTransport::new();
        let s = sink(Arc::clone(&transport));
        assert!(s.write(Some(1)));
        assert!(s.write(None));
        assert_eq!(transport.published(), 2);
        assert_eq!(s.end.state.last(), Some(None));
    }

    #[test]
    fn invalidated_sink_is_inert() {
        let transport = CountingTransport::new();
        let s = sink(Arc::clone(&transport));
        s.end.state.invalidate();

        assert!(!s.write(Some(1)));
        let err = s.try_write(Some(2)).unwrap_err();
        assert!(err.is_terminal());
        assert_eq!(transport.published(), 0);
        assert!(!s.end.state.has_written());
    }
}
