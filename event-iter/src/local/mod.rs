//! In-memory event sources
//!
//! Reference implementations of both source capabilities, with per-channel
//! listener counting so callers can check that an adapter leaves nothing
//! registered behind it.
//!
//! Listeners are always invoked from a snapshot of the registry, so a
//! listener may register or remove listeners while it runs.

mod emitter;
mod target;

pub use emitter::LocalEmitter;
pub use target::LocalEventTarget;
