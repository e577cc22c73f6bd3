use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::LocalSourceError;
use crate::source::{ArgsListener, Emitter, ErrorListener};

/// Emitter-style in-memory source
///
/// Channels fire with an argument list. Error channels are reserved: they
/// keep their own listeners and fire with an error value, and firing one that
/// nobody listens to is reported as an unhandled error.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use event_iter::{source::Emitter, LocalEmitter};
///
/// let emitter = LocalEmitter::<u8, String>::new();
/// let listener: event_iter::source::ArgsListener<u8> = Arc::new(|args: &[u8]| {
///     assert_eq!(args, &[1, 2]);
/// });
///
/// emitter.on("data", Arc::clone(&listener));
/// assert!(emitter.emit("data", &[1, 2]));
///
/// emitter.off("data", &listener);
/// assert_eq!(emitter.listener_count("data"), 0);
/// ```
pub struct LocalEmitter<A, E> {
    listeners: RwLock<HashMap<String, Vec<ArgsListener<A>>>>,
    error_listeners: RwLock<HashMap<String, Vec<ErrorListener<E>>>>,
}

impl<A, E> LocalEmitter<A, E> {
    /// Create an emitter with no listeners
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            error_listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Fire `channel` with `args`
    ///
    /// Returns whether any listener was registered.
    pub fn emit(&self, channel: &str, args: &[A]) -> bool {
        let snapshot: Vec<ArgsListener<A>> = self
            .listeners
            .read()
            .get(channel)
            .cloned()
            .unwrap_or_default();

        trace!(channel, listeners = snapshot.len(), "Emitting");
        for listener in &snapshot {
            listener(args);
        }

        !snapshot.is_empty()
    }

    /// Fire the error channel `channel` with `err`
    ///
    /// Returns the number of listeners notified, or an error if there were none.
    pub fn emit_error(&self, channel: &str, err: &E) -> Result<usize, LocalSourceError> {
        let snapshot: Vec<ErrorListener<E>> = self
            .error_listeners
            .read()
            .get(channel)
            .cloned()
            .unwrap_or_default();

        if snapshot.is_empty() {
            return Err(LocalSourceError::UnhandledError {
                channel: channel.to_string(),
            });
        }

        trace!(channel, listeners = snapshot.len(), "Emitting error");
        for listener in &snapshot {
            listener(err);
        }

        Ok(snapshot.len())
    }

    /// Number of listeners registered on `channel`, error listeners included
    pub fn listener_count(&self, channel: &str) -> usize {
        let plain = self.listeners.read().get(channel).map_or(0, Vec::len);
        let errors = self.error_listeners.read().get(channel).map_or(0, Vec::len);
        plain + errors
    }

    /// Channels with at least one listener
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.listeners.read().keys().cloned().collect();
        channels.extend(self.error_listeners.read().keys().cloned());
        channels.sort();
        channels.dedup();
        channels
    }
}

impl<A, E> Default for LocalEmitter<A, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove the most recently added registration of `listener`
fn remove_last<L: ?Sized>(listeners: &mut Vec<Arc<L>>, listener: &Arc<L>) {
    if let Some(index) = listeners.iter().rposition(|l| Arc::ptr_eq(l, listener)) {
        listeners.remove(index);
    }
}

impl<A, E> Emitter for LocalEmitter<A, E>
where
    A: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    type Arg = A;
    type Error = E;

    fn on(&self, channel: &str, listener: ArgsListener<A>) {
        self.listeners
            .write()
            .entry(channel.to_string())
            .or_default()
            .push(listener);
    }

    fn off(&self, channel: &str, listener: &ArgsListener<A>) {
        let mut listeners = self.listeners.write();
        if let Some(registered) = listeners.get_mut(channel) {
            remove_last(registered, listener);
            if registered.is_empty() {
                listeners.remove(channel);
            }
        }
    }

    fn on_error(&self, channel: &str, listener: ErrorListener<E>) {
        self.error_listeners
            .write()
            .entry(channel.to_string())
            .or_default()
            .push(listener);
    }

    fn off_error(&self, channel: &str, listener: &ErrorListener<E>) {
        let mut listeners = self.error_listeners.write();
        if let Some(registered) = listeners.get_mut(channel) {
            remove_last(registered, listener);
            if registered.is_empty() {
                listeners.remove(channel);
            }
        }
    }
}
