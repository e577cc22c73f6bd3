//! Event-to-iterator adapter
//!
//! [`EventIterator`] subscribes to a target channel and an error channel on an
//! [`EventSource`] and turns the firings into a pull-based sequence. Pulls are
//! served from a buffer of earlier arrivals or parked until the next one; the
//! error channel ends the sequence with a single failure; termination ends it
//! with a completion. Every exit path releases both listeners exactly once.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use event_iter::{from_emitter, LocalEmitter};
//!
//! # tokio_test::block_on(async {
//! let emitter = Arc::new(LocalEmitter::<i32, String>::new());
//! let events = from_emitter(Arc::clone(&emitter), "foo");
//!
//! emitter.emit("foo", &[1, 2]);
//! emitter.emit("bar", &[99]);
//! emitter.emit("foo", &[3]);
//!
//! assert_eq!(events.advance().await.unwrap().into_value(), Some(vec![1, 2]));
//! assert_eq!(events.advance().await.unwrap().into_value(), Some(vec![3]));
//!
//! events.terminate().await;
//! assert_eq!(emitter.listener_count("foo"), 0);
//! assert_eq!(emitter.listener_count("error"), 0);
//! # });
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::future::{ready, Ready};
use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result};
use crate::iter::{IntoBlocking, TryIter};
use crate::queue::{AdapterState, Arrival, Pull, Queue, Settlement};
use crate::result::{IterResult, Payload};
use crate::source::{
    Emitter, EmitterSource, ErrorSink, EventSource, EventTarget, PayloadSink, TargetSource,
};
use crate::stats::AdapterStats;

/// Adapt `channel` on `source` using the default configuration
pub fn adapt<S: EventSource>(source: S, channel: impl Into<String>) -> EventIterator<S> {
    EventIterator::new(source, channel.into(), AdapterConfig::default())
}

/// Adapt `channel` on `source` with an explicit configuration
pub fn adapt_with_config<S: EventSource>(
    source: S,
    channel: impl Into<String>,
    config: AdapterConfig,
) -> Result<EventIterator<S>> {
    config.validate()?;
    Ok(EventIterator::new(source, channel.into(), config))
}

/// Adapt `channel` on an emitter-style source
pub fn from_emitter<E: Emitter>(
    emitter: Arc<E>,
    channel: impl Into<String>,
) -> EventIterator<EmitterSource<E>> {
    adapt(EmitterSource::new(emitter), channel)
}

/// Adapt `channel` on a target-style source
pub fn from_target<T: EventTarget>(
    target: Arc<T>,
    channel: impl Into<String>,
) -> EventIterator<TargetSource<T>> {
    adapt(TargetSource::new(target), channel)
}

struct Subscriptions<H> {
    payload: H,
    error: H,
}

/// State shared between the iterator and the listeners registered on the source
struct Shared<S: EventSource> {
    source: S,
    channel: String,
    error_channel: String,
    queue: Mutex<Queue<S::Value, S::Error>>,
    subscriptions: Mutex<Option<Subscriptions<S::Handle>>>,
}

impl<S: EventSource> Shared<S> {
    fn on_arrival(&self, payload: Payload<S::Value>) {
        let mut queue = self.queue.lock();
        let arrival = queue.arrive(payload);
        let (buffered, pending) = (queue.buffered_len(), queue.pending_len());
        drop(queue);

        match arrival {
            Arrival::Delivered | Arrival::Buffered => trace!(
                channel = %self.channel,
                ?arrival,
                buffered,
                pending,
                "Payload arrived"
            ),
            Arrival::Ignored => warn!(
                channel = %self.channel,
                "Payload arrived after the adapter left the active state; dropped"
            ),
        }
    }

    fn on_error(&self, err: S::Error, origin: &'static str) {
        let transitioned = self.queue.lock().fail(err);
        if transitioned {
            debug!(
                channel = %self.channel,
                error_channel = %self.error_channel,
                origin,
                "Adapter errored"
            );
            self.release();
        }
    }

    fn terminate(&self) -> bool {
        let transitioned = self.queue.lock().finish();
        if transitioned {
            debug!(channel = %self.channel, "Adapter terminated");
            self.release();
        }
        transitioned
    }

    /// Remove both listeners if they are still registered
    fn release(&self) {
        let subscriptions = self.subscriptions.lock().take();
        if let Some(subscriptions) = subscriptions {
            self.source.unsubscribe(&self.channel, subscriptions.payload);
            self.source.unsubscribe(&self.error_channel, subscriptions.error);
            debug!(
                channel = %self.channel,
                error_channel = %self.error_channel,
                "Listeners released"
            );
        }
    }
}

/// Pull-based sequence over one channel of an event source
///
/// Values can be pulled with [`advance`](Self::advance), consumed as a
/// [`Stream`], or iterated with a plain `for` loop through
/// [`IntoIterator`]. Dropping the iterator terminates it.
pub struct EventIterator<S: EventSource> {
    shared: Arc<Shared<S>>,
    /// Request issued by `poll_next` and not yet settled
    in_flight: Option<Advance<S::Value, S::Error>>,
}

impl<S: EventSource> EventIterator<S> {
    fn new(source: S, channel: String, config: AdapterConfig) -> Self {
        let shared = Arc::new(Shared {
            source,
            channel,
            error_channel: config.error_channel,
            queue: Mutex::new(Queue::new()),
            subscriptions: Mutex::new(None),
        });

        let weak: Weak<Shared<S>> = Arc::downgrade(&shared);
        let payload_sink: PayloadSink<S::Value> = Arc::new(move |payload| {
            if let Some(shared) = weak.upgrade() {
                shared.on_arrival(payload);
            }
        });

        let weak: Weak<Shared<S>> = Arc::downgrade(&shared);
        let error_sink: ErrorSink<S::Error> = Arc::new(move |err| {
            if let Some(shared) = weak.upgrade() {
                shared.on_error(err, "source");
            }
        });

        let payload = shared.source.subscribe(&shared.channel, payload_sink);
        let error = shared.source.subscribe_error(&shared.error_channel, error_sink);
        *shared.subscriptions.lock() = Some(Subscriptions { payload, error });

        // A source may fire while the listeners are being registered
        if shared.queue.lock().state().is_terminal() {
            shared.release();
        }

        debug!(
            channel = %shared.channel,
            error_channel = %shared.error_channel,
            "Adapter subscribed"
        );

        Self {
            shared,
            in_flight: None,
        }
    }

    /// Pull the next value
    ///
    /// The request is issued when this method is called, not when the future
    /// is first polled, so several calls made before any arrival are settled
    /// in the order they were made.
    pub fn advance(&self) -> Advance<S::Value, S::Error> {
        let mut queue = self.shared.queue.lock();
        let pull = queue.pull();
        trace!(
            channel = %self.shared.channel,
            buffered = queue.buffered_len(),
            pending = queue.pending_len(),
            "Advance requested"
        );
        drop(queue);

        Advance::from_pull(pull)
    }

    /// Pull the next value only if that needs no waiting
    ///
    /// Returns `None` when the adapter is active and nothing is buffered.
    pub fn try_advance(
        &self,
    ) -> Option<std::result::Result<IterResult<S::Value>, S::Error>> {
        self.shared.queue.lock().try_pull()
    }

    /// End the sequence early
    ///
    /// Releases both listeners and completes every pending request. Calling it
    /// again, or after an error, changes nothing.
    pub fn terminate(&self) -> Ready<IterResult<S::Value>> {
        self.shared.terminate();
        ready(IterResult::done())
    }

    /// Fail the sequence on behalf of the consumer
    ///
    /// Takes the same path as an error fired by the source. Passing `None`
    /// is rejected without touching the adapter.
    pub fn abort(&self, err: Option<S::Error>) -> Result<()> {
        let err = err.ok_or_else(|| AdapterError::InvalidArgument {
            name: "err",
            received: "None".to_string(),
        })?;

        self.shared.on_error(err, "consumer");
        Ok(())
    }

    /// Drive the sequence to its end, handing each payload to `f`
    ///
    /// If `f` fails the adapter is terminated before its error is returned.
    /// A source error is converted into the consumer's error type.
    pub async fn consume<F, X>(self, mut f: F) -> std::result::Result<(), X>
    where
        F: FnMut(Payload<S::Value>) -> std::result::Result<(), X>,
        X: From<S::Error>,
    {
        loop {
            let payload = match self.advance().await {
                Ok(result) => match result.into_value() {
                    Some(payload) => payload,
                    None => return Ok(()),
                },
                Err(err) => return Err(X::from(err)),
            };

            if let Err(err) = f(payload) {
                debug!(channel = %self.shared.channel, "Consumer failed; terminating");
                self.shared.terminate();
                return Err(err);
            }
        }
    }

    /// Owning blocking iterator, for synchronous `for` loops
    pub fn into_blocking(self) -> IntoBlocking<S> {
        IntoBlocking::new(self)
    }

    /// Non-blocking iterator over currently buffered payloads
    pub fn try_iter(&self) -> TryIter<'_, S> {
        TryIter::new(self)
    }

    /// Current lifecycle state
    pub fn state(&self) -> AdapterState {
        self.shared.queue.lock().state()
    }

    /// Number of arrived payloads nobody has pulled yet
    pub fn buffered_len(&self) -> usize {
        self.shared.queue.lock().buffered_len()
    }

    /// Number of pulls waiting for an arrival
    pub fn pending_len(&self) -> usize {
        self.shared.queue.lock().pending_len()
    }

    /// Snapshot of the delivery counters
    pub fn stats(&self) -> AdapterStats {
        self.shared.queue.lock().stats().clone()
    }

    /// The adapted channel
    pub fn channel(&self) -> &str {
        &self.shared.channel
    }

    /// The error channel
    pub fn error_channel(&self) -> &str {
        &self.shared.error_channel
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.shared.source
    }
}

impl<S: EventSource> Drop for EventIterator<S> {
    fn drop(&mut self) {
        self.shared.terminate();
    }
}

impl<S: EventSource> Stream for EventIterator<S> {
    type Item = std::result::Result<Payload<S::Value>, S::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let mut advance = match this.in_flight.take() {
            Some(advance) => advance,
            None => this.advance(),
        };

        match Pin::new(&mut advance).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result.into_value().map(Ok)),
            Poll::Ready(Err(err)) => Poll::Ready(Some(Err(err))),
            Poll::Pending => {
                this.in_flight = Some(advance);
                Poll::Pending
            }
        }
    }
}

impl<S: EventSource> IntoIterator for EventIterator<S> {
    type Item = std::result::Result<Payload<S::Value>, S::Error>;
    type IntoIter = IntoBlocking<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_blocking()
    }
}

/// Future returned by [`EventIterator::advance`]
///
/// Resolves to the next [`IterResult`], or to the error that ended the
/// sequence. Dropping it before it resolves gives up the request without
/// losing the payload it would have received.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Advance<V, E> {
    state: AdvanceState<V, E>,
}

enum AdvanceState<V, E> {
    Ready(Option<Settlement<V, E>>),
    Waiting(oneshot::Receiver<Settlement<V, E>>),
}

impl<V, E> Advance<V, E> {
    fn from_pull(pull: Pull<V, E>) -> Self {
        let state = match pull {
            Pull::Ready(settlement) => AdvanceState::Ready(Some(settlement)),
            Pull::Wait(rx) => AdvanceState::Waiting(rx),
        };
        Self { state }
    }
}

// Never pin-projected: the receiver is polled through `Pin::new`
impl<V, E> Unpin for Advance<V, E> {}

impl<V, E> Future for Advance<V, E> {
    type Output = std::result::Result<IterResult<V>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            AdvanceState::Ready(settlement) => {
                Poll::Ready(settlement.take().unwrap_or_else(|| Ok(IterResult::done())))
            }
            AdvanceState::Waiting(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(settlement)) => Poll::Ready(settlement),
                // The adapter went away without settling; treat as completion
                Poll::Ready(Err(_)) => Poll::Ready(Ok(IterResult::done())),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}
