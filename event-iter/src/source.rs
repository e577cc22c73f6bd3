//! Source capability abstraction
//!
//! The adapter talks to every source through [`EventSource`]: subscribe a
//! payload sink to a named channel, subscribe an error sink to the designated
//! error channel, and unsubscribe either through the handle it got back.
//!
//! Two capability variants satisfy that contract:
//!
//! - [`Emitter`]: listeners receive a variadic argument list, registration
//!   returns nothing, and the error channel is reserved with its own listener
//!   type. Wrapped by [`EmitterSource`].
//! - [`EventTarget`]: listeners receive one dispatched event object and every
//!   channel, including the error channel, is registered the same way.
//!   Wrapped by [`TargetSource`].
//!
//! Listeners are identified by `Arc` pointer, so unsubscribing requires the
//! exact `Arc` that was registered. The wrappers keep that `Arc` in the
//! handle they return.

use std::sync::Arc;

use crate::result::Payload;

/// Listener for an emitter-style channel, called with the firing's arguments
pub type ArgsListener<A> = Arc<dyn Fn(&[A]) + Send + Sync>;

/// Listener for an emitter-style reserved error channel
pub type ErrorListener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Listener for a target-style channel, called with the dispatched event
pub type EventListener<Ev> = Arc<dyn Fn(&Ev) + Send + Sync>;

/// Callback the adapter hands to a source for target-channel arrivals
pub type PayloadSink<V> = Arc<dyn Fn(Payload<V>) + Send + Sync>;

/// Callback the adapter hands to a source for error-channel arrivals
pub type ErrorSink<E> = Arc<dyn Fn(E) + Send + Sync>;

/// Emitter-style event source
///
/// Channels carry ordered argument lists. The error channel is reserved: it
/// has its own listener type and firing it carries an error value instead of
/// arguments.
pub trait Emitter: Send + Sync + 'static {
    /// Type of each argument in a firing
    type Arg: Clone + Send + 'static;
    /// Type of the value fired on the error channel
    type Error: Clone + Send + 'static;

    /// Register a listener on a channel
    fn on(&self, channel: &str, listener: ArgsListener<Self::Arg>);

    /// Remove a previously registered listener
    fn off(&self, channel: &str, listener: &ArgsListener<Self::Arg>);

    /// Register a listener on the reserved error channel
    fn on_error(&self, channel: &str, listener: ErrorListener<Self::Error>);

    /// Remove a previously registered error listener
    fn off_error(&self, channel: &str, listener: &ErrorListener<Self::Error>);
}

/// Target-style event source
///
/// Every channel, the error channel included, delivers a single dispatched
/// event object to listeners registered through the same primitive.
pub trait EventTarget: Send + Sync + 'static {
    /// Type of the dispatched event object
    type Event: Clone + Send + 'static;

    /// Register a listener on a channel
    fn add_event_listener(&self, channel: &str, listener: EventListener<Self::Event>);

    /// Remove a previously registered listener
    fn remove_event_listener(&self, channel: &str, listener: &EventListener<Self::Event>);
}

/// Common subscription contract the adapter is written against
///
/// Implementations own argument extraction: whatever shape the underlying
/// source fires with, the payload sink receives an ordered argument list and
/// the error sink receives one error value.
pub trait EventSource: Send + Sync + 'static {
    /// Element type of a delivered payload
    type Value: Send + 'static;
    /// Value carried by the error channel
    type Error: Clone + Send + 'static;
    /// Token returned by a subscription and consumed by `unsubscribe`
    type Handle: Send + 'static;

    /// Subscribe a payload sink to `channel`
    fn subscribe(&self, channel: &str, sink: PayloadSink<Self::Value>) -> Self::Handle;

    /// Subscribe an error sink to the error channel named `channel`
    fn subscribe_error(&self, channel: &str, sink: ErrorSink<Self::Error>) -> Self::Handle;

    /// Remove the subscription identified by `handle` from `channel`
    fn unsubscribe(&self, channel: &str, handle: Self::Handle);
}

/// Subscription handle issued by [`EmitterSource`]
pub enum EmitterHandle<A, E> {
    /// Listener on an ordinary channel
    Args(ArgsListener<A>),
    /// Listener on the reserved error channel
    Error(ErrorListener<E>),
}

/// [`EventSource`] over an emitter-style source
pub struct EmitterSource<S> {
    inner: Arc<S>,
}

impl<S: Emitter> EmitterSource<S> {
    /// Wrap a shared emitter
    pub fn new(inner: Arc<S>) -> Self {
        Self { inner }
    }

    /// The wrapped emitter
    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }
}

impl<S> Clone for EmitterSource<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Emitter> EventSource for EmitterSource<S> {
    type Value = S::Arg;
    type Error = S::Error;
    type Handle = EmitterHandle<S::Arg, S::Error>;

    fn subscribe(&self, channel: &str, sink: PayloadSink<S::Arg>) -> Self::Handle {
        let listener: ArgsListener<S::Arg> = Arc::new(move |args: &[S::Arg]| sink(args.to_vec()));
        self.inner.on(channel, Arc::clone(&listener));
        EmitterHandle::Args(listener)
    }

    fn subscribe_error(&self, channel: &str, sink: ErrorSink<S::Error>) -> Self::Handle {
        let listener: ErrorListener<S::Error> = Arc::new(move |err: &S::Error| sink(err.clone()));
        self.inner.on_error(channel, Arc::clone(&listener));
        EmitterHandle::Error(listener)
    }

    fn unsubscribe(&self, channel: &str, handle: Self::Handle) {
        match handle {
            EmitterHandle::Args(listener) => self.inner.off(channel, &listener),
            EmitterHandle::Error(listener) => self.inner.off_error(channel, &listener),
        }
    }
}

/// [`EventSource`] over a target-style source
///
/// Payloads are the dispatched event wrapped as a one-element list; the error
/// value is the event dispatched on the error channel.
pub struct TargetSource<S> {
    inner: Arc<S>,
}

impl<S: EventTarget> TargetSource<S> {
    /// Wrap a shared event target
    pub fn new(inner: Arc<S>) -> Self {
        Self { inner }
    }

    /// The wrapped event target
    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }
}

impl<S> Clone for TargetSource<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: EventTarget> EventSource for TargetSource<S> {
    type Value = S::Event;
    type Error = S::Event;
    type Handle = EventListener<S::Event>;

    fn subscribe(&self, channel: &str, sink: PayloadSink<S::Event>) -> Self::Handle {
        let listener: EventListener<S::Event> =
            Arc::new(move |event: &S::Event| sink(vec![event.clone()]));
        self.inner.add_event_listener(channel, Arc::clone(&listener));
        listener
    }

    fn subscribe_error(&self, channel: &str, sink: ErrorSink<S::Event>) -> Self::Handle {
        let listener: EventListener<S::Event> = Arc::new(move |event: &S::Event| sink(event.clone()));
        self.inner.add_event_listener(channel, Arc::clone(&listener));
        listener
    }

    fn unsubscribe(&self, channel: &str, handle: Self::Handle) {
        self.inner.remove_event_listener(channel, &handle);
    }
}
