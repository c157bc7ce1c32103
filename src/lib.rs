//! # pipecast
//!
//! **pipecast** provides a typed single-value pipe: a write end ([`SinkChannel`])
//! decoupled from any number of readers ([`SourceChannel`]), with optional
//! replay of the last written value to new readers.
//!
//! The interesting part is lifecycle. Every reader gets a [`SubscriptionToken`];
//! tokens, channels and the owning [`Pipe`] can be dropped in any order and no
//! subscription is ever left registered on the transport.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                        ┌─────────────────────────────┐
//!                        │          Pipe<T>            │
//!                        │  - Topic ("pipe-<uuid>")    │
//!                        │  - SharedState (flag, last) │
//!                        └──────┬───────────────┬──────┘
//!                               ▼               ▼
//!                      ┌──────────────┐  ┌──────────────────┐
//!                      │ SinkChannel  │  │  SourceChannel   │
//!                      │  write(v)    │  │  read(d, r, cb)  │──► SubscriptionToken
//!                      └──────┬───────┘  └────────┬─────────┘      (weakly tracked)
//!                             │ publish           │ subscribe
//!                             ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                 Transport (Bus: topic -> entries)                 │
//! └────────────────────────────────┬──────────────────────────────────┘
//!                                  ▼
//!                     Dispatch::Inline | Dispatch::Queue
//!                                  ▼
//!                             callback(Option<T>)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Pipe::new() ──► Topic::unique + SharedState ──► SinkChannel + SourceChannel
//!
//! sink.write(v)
//!   ├─► invalidated? ─► false
//!   ├─► state.last = v
//!   ├─► transport.publish(topic, v)
//!   └─► true
//!
//! source.read(dispatch, replay, cb)
//!   ├─► invalidated? ─► None
//!   ├─► transport.subscribe(topic, dispatch, cb) ─► token (weakly tracked)
//!   ├─► replay && written? ─► cb(last)  (caller's thread, once)
//!   └─► Some(token)
//!
//! drop(pipe)
//!   ├─► state.invalidated = true   (channel clones become inert)
//!   └─► cancel every live token    (transport left clean)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Pipes**         | Paired write/read ends on one unique topic.              | [`Pipe`], [`SinkChannel`], [`SourceChannel`]|
//! | **Subscriptions** | Cancel on demand or on drop; bulk cancel on pipe drop.   | [`SubscriptionToken`]                       |
//! | **Dispatch**      | Run callbacks inline or on a serial tokio worker.        | [`Dispatch`], [`DispatchQueue`]             |
//! | **Transport**     | Pluggable topic bus; in-process default.                 | [`Transport`], [`Bus`]                      |
//! | **Errors**        | Typed reasons behind `false` / `None`.                   | [`PipeError`]                               |
//! | **Configuration** | Topic prefix, payload mismatch handling.                 | [`Config`], [`MismatchPolicy`]              |
//!
//! ## Concurrency
//! `write` and `read` never block. Access to one pipe should be serialized by
//! the caller; the shared state is internally consistent under concurrent use,
//! but the relative order of concurrent writes (and of a replay racing a write)
//! is not defined.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use pipecast::{Dispatch, Pipe};
//!
//! let pipe: Pipe<String> = Pipe::new();
//! pipe.sink().write(Some("hello".to_string()));
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let s = Arc::clone(&seen);
//! let token = pipe
//!     .source()
//!     .read(Dispatch::Inline, true, move |v| s.lock().unwrap().push(v))
//!     .expect("pipe is alive");
//!
//! pipe.sink().write(Some("world".to_string()));
//! token.cancel();
//! pipe.sink().write(None);
//!
//! assert_eq!(
//!     *seen.lock().unwrap(),
//!     vec![Some("hello".to_string()), Some("world".to_string())]
//! );
//! ```
mod channel;
mod config;
mod dispatch;
mod error;
mod pipe;
mod topic;
mod transport;

// ---- Public re-exports ----

pub use channel::{SinkChannel, SourceChannel, SubscriptionToken};
pub use config::{Config, MismatchPolicy};
pub use dispatch::{Dispatch, DispatchQueue, Job};
pub use error::PipeError;
pub use pipe::Pipe;
pub use topic::Topic;
pub use transport::{Bus, Callback, Payload, SubscriptionHandle, Transport};
