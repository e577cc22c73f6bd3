//! Queue and backpressure engine
//!
//! Reconciles arrivals with pulls using two FIFO buffers: payloads that
//! arrived before anyone asked for them, and requests issued before anything
//! arrived. An arrival pairs with the oldest waiting request when there is
//! one, so while the queue is active at most one of the two buffers holds
//! anything.
//!
//! The queue is synchronous and knows nothing about sources. Callers hold it
//! behind a lock and release subscriptions themselves whenever a transition
//! reports that the queue left [`AdapterState::Active`].

use std::collections::VecDeque;

use tokio::sync::oneshot;

use crate::result::{IterResult, Payload};
use crate::stats::AdapterStats;

/// Lifecycle state of an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Subscribed and delivering payloads
    Active,
    /// A fatal error arrived; terminal
    Errored,
    /// Terminated by the consumer; terminal
    Done,
}

impl AdapterState {
    /// Whether no further payloads will ever be delivered
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AdapterState::Active)
    }
}

/// Outcome delivered to one pull
pub(crate) type Settlement<V, E> = Result<IterResult<V>, E>;

/// One outstanding pull, settled exactly once
type PendingRequest<V, E> = oneshot::Sender<Settlement<V, E>>;

/// Result of asking the queue for the next value
pub(crate) enum Pull<V, E> {
    /// Settled on the spot
    Ready(Settlement<V, E>),
    /// Parked behind earlier requests until an arrival, error or termination
    Wait(oneshot::Receiver<Settlement<V, E>>),
}

/// What happened to one target-channel arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arrival {
    /// Handed straight to a waiting request
    Delivered,
    /// Appended to the payload buffer
    Buffered,
    /// Dropped because the queue is no longer active
    Ignored,
}

pub(crate) struct Queue<V, E> {
    state: AdapterState,
    payloads: VecDeque<Payload<V>>,
    pending: VecDeque<PendingRequest<V, E>>,
    /// Error waiting for the next pull, set only when nobody was pending at failure
    captured: Option<E>,
    stats: AdapterStats,
}

impl<V, E: Clone> Queue<V, E> {
    pub(crate) fn new() -> Self {
        Self {
            state: AdapterState::Active,
            payloads: VecDeque::new(),
            pending: VecDeque::new(),
            captured: None,
            stats: AdapterStats::default(),
        }
    }

    pub(crate) fn state(&self) -> AdapterState {
        self.state
    }

    pub(crate) fn buffered_len(&self) -> usize {
        self.payloads.len()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn stats(&self) -> &AdapterStats {
        &self.stats
    }

    /// Pull the next value, parking a request when nothing is buffered
    pub(crate) fn pull(&mut self) -> Pull<V, E> {
        if let Some(settlement) = self.try_pull() {
            return Pull::Ready(settlement);
        }

        let (tx, rx) = oneshot::channel();
        self.pending.push_back(tx);
        Pull::Wait(rx)
    }

    /// Pull the next value if that is possible without waiting
    pub(crate) fn try_pull(&mut self) -> Option<Settlement<V, E>> {
        if let Some(err) = self.captured.take() {
            return Some(Err(err));
        }

        if self.state.is_terminal() {
            return Some(Ok(IterResult::done()));
        }

        let payload = self.payloads.pop_front()?;
        self.stats.payloads_delivered += 1;
        Some(Ok(IterResult::yielded(payload)))
    }

    /// Accept one target-channel arrival
    pub(crate) fn arrive(&mut self, payload: Payload<V>) -> Arrival {
        if self.state.is_terminal() {
            self.stats.arrivals_ignored += 1;
            return Arrival::Ignored;
        }

        self.stats.payloads_received += 1;

        let mut payload = payload;
        while let Some(request) = self.pending.pop_front() {
            match request.send(Ok(IterResult::yielded(payload))) {
                Ok(()) => {
                    self.stats.payloads_delivered += 1;
                    return Arrival::Delivered;
                }
                // The requester stopped waiting; hand the payload to the next one
                Err(returned) => match returned.ok().and_then(IterResult::into_value) {
                    Some(recovered) => payload = recovered,
                    None => return Arrival::Delivered,
                },
            }
        }

        self.payloads.push_back(payload);
        Arrival::Buffered
    }

    /// Enter the error state
    ///
    /// Returns `true` if this call moved the queue out of `Active`.
    pub(crate) fn fail(&mut self, err: E) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        self.state = AdapterState::Errored;
        self.discard_payloads();

        let mut delivered = false;
        for request in self.pending.drain(..) {
            if request.send(Err(err.clone())).is_ok() {
                self.stats.requests_failed += 1;
                delivered = true;
            }
        }

        if !delivered {
            self.captured = Some(err);
        }

        true
    }

    /// Enter the done state, completing every pending request
    ///
    /// Returns `true` if this call moved the queue out of `Active`. Terminal
    /// states are left untouched, so an undelivered error survives termination.
    pub(crate) fn finish(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        self.state = AdapterState::Done;
        self.discard_payloads();

        for request in self.pending.drain(..) {
            let _ = request.send(Ok(IterResult::done()));
        }

        true
    }

    fn discard_payloads(&mut self) {
        self.stats.payloads_discarded += self.payloads.len() as u64;
        self.payloads.clear();
    }
}
