use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::source::{EventListener, EventTarget};

/// Target-style in-memory source
///
/// Every channel, `"error"` included, is an ordinary channel that dispatches
/// one event object. Registering the same listener twice on a channel has no
/// effect.
pub struct LocalEventTarget<Ev> {
    listeners: RwLock<HashMap<String, Vec<EventListener<Ev>>>>,
}

impl<Ev> LocalEventTarget<Ev> {
    /// Create a target with no listeners
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Dispatch `event` to every listener on `channel`
    ///
    /// Returns the number of listeners notified.
    pub fn dispatch_event(&self, channel: &str, event: &Ev) -> usize {
        let snapshot: Vec<EventListener<Ev>> = self
            .listeners
            .read()
            .get(channel)
            .cloned()
            .unwrap_or_default();

        trace!(channel, listeners = snapshot.len(), "Dispatching event");
        for listener in &snapshot {
            listener(event);
        }

        snapshot.len()
    }

    /// Number of listeners registered on `channel`
    pub fn listener_count(&self, channel: &str) -> usize {
        self.listeners.read().get(channel).map_or(0, Vec::len)
    }
}

impl<Ev> Default for LocalEventTarget<Ev> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ev> EventTarget for LocalEventTarget<Ev>
where
    Ev: Clone + Send + Sync + 'static,
{
    type Event = Ev;

    fn add_event_listener(&self, channel: &str, listener: EventListener<Ev>) {
        let mut listeners = self.listeners.write();
        let registered = listeners.entry(channel.to_string()).or_default();
        if !registered.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            registered.push(listener);
        }
    }

    fn remove_event_listener(&self, channel: &str, listener: &EventListener<Ev>) {
        let mut listeners = self.listeners.write();
        if let Some(registered) = listeners.get_mut(channel) {
            registered.retain(|l| !Arc::ptr_eq(l, listener));
            if registered.is_empty() {
                listeners.remove(channel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_dispatch_reaches_listener() {
        let target = LocalEventTarget::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = Arc::clone(&seen);
        let listener: EventListener<u32> = Arc::new(move |event: &u32| inner.lock().push(*event));
        target.add_event_listener("tick", listener);

        assert_eq!(target.dispatch_event("tick", &7), 1);
        assert_eq!(target.dispatch_event("tock", &8), 0);
        assert_eq!(*seen.lock(), vec![7]);
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let target = LocalEventTarget::<u32>::new();
        let listener: EventListener<u32> = Arc::new(|_: &u32| {});

        target.add_event_listener("tick", Arc::clone(&listener));
        target.add_event_listener("tick", Arc::clone(&listener));
        assert_eq!(target.listener_count("tick"), 1);

        target.remove_event_listener("tick", &listener);
        assert_eq!(target.listener_count("tick"), 0);
    }

    #[test]
    fn test_error_is_an_ordinary_channel() {
        let target = LocalEventTarget::<u32>::new();
        assert_eq!(target.dispatch_event("error", &1), 0);

        target.add_event_listener("error", Arc::new(|_: &u32| {}));
        assert_eq!(target.listener_count("error"), 1);
        assert_eq!(target.dispatch_event("error", &1), 1);
    }
}
