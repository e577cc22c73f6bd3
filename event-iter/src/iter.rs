//! Sequential iteration over an adapter
//!
//! Provides the synchronous ways of consuming an [`EventIterator`]:
//! - Blocking: `for item in events` / [`EventIterator::into_blocking`]
//! - Non-blocking: [`EventIterator::try_iter`], which drains what is buffered
//!
//! Blocking iteration parks the calling thread while no payload is buffered,
//! so the source must fire from another thread.

use crate::adapter::EventIterator;
use crate::result::Payload;
use crate::source::EventSource;

/// Owning blocking iterator over an adapter
///
/// Yields `Ok(payload)` per arrival, at most one `Err` when the sequence
/// fails, and then stops. Breaking out of a `for` loop drops the iterator,
/// which terminates the adapter and releases its listeners.
///
/// # Example
///
/// ```rust,ignore
/// for item in from_emitter(emitter, "line") {
///     let args = item?;
///     if args.is_empty() {
///         break; // listeners are released here
///     }
/// }
/// ```
pub struct IntoBlocking<S: EventSource> {
    inner: EventIterator<S>,
}

impl<S: EventSource> IntoBlocking<S> {
    pub(crate) fn new(inner: EventIterator<S>) -> Self {
        Self { inner }
    }

    /// The adapter being iterated
    pub fn get_ref(&self) -> &EventIterator<S> {
        &self.inner
    }

    /// Stop iterating and take back the adapter
    pub fn into_inner(self) -> EventIterator<S> {
        self.inner
    }
}

impl<S: EventSource> Iterator for IntoBlocking<S> {
    type Item = Result<Payload<S::Value>, S::Error>;

    /// Block until the next payload, error or completion
    fn next(&mut self) -> Option<Self::Item> {
        match futures::executor::block_on(self.inner.advance()) {
            Ok(result) => result.into_value().map(Ok),
            Err(err) => Some(Err(err)),
        }
    }
}

/// Non-blocking iterator over currently buffered payloads
///
/// Stops as soon as a pull would have to wait. Never parks a request.
pub struct TryIter<'a, S: EventSource> {
    inner: &'a EventIterator<S>,
}

impl<'a, S: EventSource> TryIter<'a, S> {
    pub(crate) fn new(inner: &'a EventIterator<S>) -> Self {
        Self { inner }
    }
}

impl<'a, S: EventSource> Iterator for TryIter<'a, S> {
    type Item = Result<Payload<S::Value>, S::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.try_advance()? {
            Ok(result) => result.into_value().map(Ok),
            Err(err) => Some(Err(err)),
        }
    }
}
