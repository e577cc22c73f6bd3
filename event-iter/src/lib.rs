//! # event-iter
//!
//! Pull-based iteration over push-based, callback-driven event sources.
//!
//! An event source lets listeners subscribe to named channels and calls them
//! whenever a channel fires. [`adapt`] turns one channel of such a source into
//! a sequence that yields the arguments of each firing, in order, one pull at
//! a time.
//!
//! ## Key Features
//!
//! - **Unbounded buffering**: firings that arrive before anyone pulls are kept
//!   until pulled
//! - **Ordered concurrent pulls**: several outstanding [`EventIterator::advance`]
//!   calls are settled in the order they were made
//! - **Error fast-path**: the designated error channel fails the sequence once
//!   and then ends it
//! - **Listener cleanup**: every exit path (completion, error, termination,
//!   abort, drop) removes both listeners from the source
//! - **Two source shapes**: emitter-style ([`Emitter`]) and target-style
//!   ([`EventTarget`]) sources share one [`EventSource`] contract
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use event_iter::{from_emitter, LocalEmitter};
//!
//! # tokio_test::block_on(async {
//! let emitter = Arc::new(LocalEmitter::<u32, String>::new());
//! let mut events = from_emitter(Arc::clone(&emitter), "reading");
//!
//! emitter.emit("reading", &[21]);
//! emitter.emit("reading", &[22]);
//! emitter.emit_error("error", &"sensor offline".to_string()).unwrap();
//!
//! // The backlog is discarded once the error arrives
//! assert_eq!(events.next().await, Some(Err("sensor offline".to_string())));
//! assert_eq!(events.next().await, None);
//! assert_eq!(emitter.listener_count("reading"), 0);
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! EventSource (EmitterSource | TargetSource)
//!     │  subscribe(channel)        subscribe_error(error_channel)
//!     ▼                                 ▼
//! payload sink ──► Queue ◄── error sink
//!                  ├── payload buffer   (arrived, not pulled)
//!                  ├── pending requests (pulled, not arrived)
//!                  └── state: Active | Errored | Done
//!                         ▲
//! EventIterator ──────────┘  advance / terminate / abort
//!     ├── Stream
//!     ├── IntoBlocking (for loops)
//!     └── TryIter (drain buffer)
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod iter;
pub mod local;
pub mod logging;
mod queue;
pub mod result;
pub mod source;
pub mod stats;

// Re-exports - Public API
pub use adapter::{adapt, adapt_with_config, from_emitter, from_target, Advance, EventIterator};
pub use config::{AdapterConfig, DEFAULT_ERROR_CHANNEL};
pub use error::{AdapterError, LocalSourceError, Result};
pub use iter::{IntoBlocking, TryIter};
pub use local::{LocalEmitter, LocalEventTarget};
pub use queue::AdapterState;
pub use result::{IterResult, Payload};
pub use source::{Emitter, EmitterSource, EventSource, EventTarget, TargetSource};
pub use stats::AdapterStats;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::adapter::{adapt, from_emitter, from_target, EventIterator};
    pub use crate::config::AdapterConfig;
    pub use crate::error::AdapterError;
    pub use crate::queue::AdapterState;
    pub use crate::result::{IterResult, Payload};
    pub use crate::source::{Emitter, EventSource, EventTarget};
}
