//! Routing keys for pipes.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Routing key on a [`Transport`](crate::Transport).
///
/// Every [`Pipe`](crate::Pipe) owns one unique topic for its whole life.
/// Cloning is cheap (`Arc<str>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(Arc<str>);

impl Topic {
    /// Generates a fresh topic `"<prefix>-<uuid v4>"`.
    #[must_use]
    pub fn unique(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::new_v4()).into())
    }

    /// Wraps a fixed name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into().into())
    }

    /// Returns the topic as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_topics_differ() {
        let a = Topic::unique("pipe");
        let b = Topic::unique("pipe");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("pipe-"));
    }

    #[test]
    fn named_round_trips() {
        let t = Topic::named("settings");
        assert_eq!(t.to_string(), "settings");
        assert_eq!(t, t.clone());
    }
}
