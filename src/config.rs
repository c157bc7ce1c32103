//! # Pipe configuration.
//!
//! Provides [`Config`], the settings a [`Pipe`](crate::Pipe) is built with, and
//! [`MismatchPolicy`], which decides what a source does with a payload of the
//! wrong type.
//!
//! ```
//! use pipecast::{Config, MismatchPolicy, Pipe};
//!
//! let mut cfg = Config::default();
//! cfg.topic_prefix = "settings".into();
//! cfg.mismatch = MismatchPolicy::Drop;
//!
//! let pipe: Pipe<u32> = Pipe::with_config(cfg);
//! assert!(pipe.topic().as_str().starts_with("settings-"));
//! ```

/// What a source does when a payload on its topic is not a `T`.
///
/// Only reachable when something other than the pipe's own sink publishes on
/// the topic (a shared [`Transport`](crate::Transport) bridged by name).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Deliver `None` to the callback.
    #[default]
    Degrade,
    /// Skip the callback and log a warning.
    Drop,
}

/// Configuration for a single pipe.
///
/// ## Field semantics
/// - `topic_prefix`: prefix of the generated topic (`"<prefix>-<uuid>"`)
/// - `mismatch`: handling of payloads that are not a `T`
#[derive(Clone, Debug)]
pub struct Config {
    /// Prefix of the generated topic name.
    ///
    /// Empty prefixes are replaced with the default when the topic is built.
    pub topic_prefix: String,

    /// Handling of payloads that fail to downcast to the channel type.
    pub mismatch: MismatchPolicy,
}

impl Config {
    /// Default prefix of generated topics.
    pub const DEFAULT_PREFIX: &'static str = "pipe";

    /// Returns the topic prefix, falling back to [`Self::DEFAULT_PREFIX`] when empty.
    #[inline]
    pub fn prefix(&self) -> &str {
        if self.topic_prefix.is_empty() {
            Self::DEFAULT_PREFIX
        } else {
            &self.topic_prefix
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `topic_prefix = "pipe"`
    /// - `mismatch = MismatchPolicy::Degrade`
    fn default() -> Self {
        Self {
            topic_prefix: Self::DEFAULT_PREFIX.to_string(),
            mismatch: MismatchPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prefix_falls_back() {
        let cfg = Config {
            topic_prefix: String::new(),
            ..Config::default()
        };
        assert_eq!(cfg.prefix(), "pipe");
    }

    #[test]
    fn defaults_degrade() {
        assert_eq!(Config::default().mismatch, MismatchPolicy::Degrade);
    }
}
