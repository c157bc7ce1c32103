//! Error types used by pipes and their channels.
//!
//! [`PipeError`] is what the fallible entry points ([`SinkChannel::try_write`],
//! [`SourceChannel::try_read`]) return. The plain `write`/`read` calls collapse it
//! into `bool`/`Option` so callers that do not care about the reason stay terse.
//!
//! Like other error types in the crate it provides `as_label` / `as_message`
//! helpers for logs and metrics.
//!
//! [`SinkChannel::try_write`]: crate::SinkChannel::try_write
//! [`SourceChannel::try_read`]: crate::SourceChannel::try_read

use thiserror::Error;

/// # Errors produced by pipe channels.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipeError {
    /// The owning pipe was dropped; the channel is permanently inert.
    #[error("pipe {topic} is invalidated")]
    Invalidated {
        /// Topic of the invalidated pipe.
        topic: String,
    },

    /// A payload published on the topic is not of the subscriber's type.
    #[error("payload on {topic} is not a {expected}")]
    TypeMismatch {
        /// Topic the payload arrived on.
        topic: String,
        /// Type name the subscriber expected.
        expected: &'static str,
    },
}

impl PipeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pipecast::PipeError;
    ///
    /// let err = PipeError::Invalidated { topic: "pipe-1".into() };
    /// assert_eq!(err.as_label(), "pipe_invalidated");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PipeError::Invalidated { .. } => "pipe_invalidated",
            PipeError::TypeMismatch { .. } => "pipe_type_mismatch",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PipeError::Invalidated { topic } => format!("invalidated: {topic}"),
            PipeError::TypeMismatch { topic, expected } => {
                format!("type mismatch on {topic}: expected {expected}")
            }
        }
    }

    /// True if the error means the channel will never accept calls again.
    ///
    /// # Example
    /// ```
    /// use pipecast::PipeError;
    ///
    /// let gone = PipeError::Invalidated { topic: "pipe-1".into() };
    /// assert!(gone.is_terminal());
    ///
    /// let odd = PipeError::TypeMismatch { topic: "pipe-1".into(), expected: "u8" };
    /// assert!(!odd.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipeError::Invalidated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let inv = PipeError::Invalidated { topic: "t".into() };
        let mis = PipeError::TypeMismatch {
            topic: "t".into(),
            expected: "i32",
        };
        assert_eq!(inv.as_label(), "pipe_invalidated");
        assert_eq!(mis.as_label(), "pipe_type_mismatch");
    }

    #[test]
    fn display_carries_topic() {
        let err = PipeError::TypeMismatch {
            topic: "pipe-x".into(),
            expected: "i32",
        };
        assert_eq!(err.to_string(), "payload on pipe-x is not a i32");
        assert_eq!(err.as_message(), "type mismatch on pipe-x: expected i32");
    }
}
