//! Completion signal returned by every pull
//!
//! Each resolution of `advance()` is a two-field result: the payload captured
//! from one arrival, and a flag saying the sequence has no more values.
//! Exactly one of the two holds.

/// Ordered argument list captured from one firing of the target channel
///
/// Emitter-style sources deliver their full argument list; target-style
/// sources deliver a single dispatched event wrapped as a one-element list.
pub type Payload<V> = Vec<V>;

/// Result of one pull from an [`EventIterator`](crate::EventIterator)
///
/// Constructed only through [`IterResult::yielded`] and [`IterResult::done`],
/// so a value is present if and only if `done` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterResult<V> {
    value: Option<Payload<V>>,
    done: bool,
}

impl<V> IterResult<V> {
    /// A delivered payload
    pub fn yielded(payload: Payload<V>) -> Self {
        Self {
            value: Some(payload),
            done: false,
        }
    }

    /// End of sequence, carrying no payload
    pub fn done() -> Self {
        Self {
            value: None,
            done: true,
        }
    }

    /// The delivered payload, `None` on completion
    pub fn value(&self) -> Option<&Payload<V>> {
        self.value.as_ref()
    }

    /// Whether this result marks the end of the sequence
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume the result, yielding the payload if one was delivered
    pub fn into_value(self) -> Option<Payload<V>> {
        self.value
    }
}

impl<V> From<IterResult<V>> for Option<Payload<V>> {
    fn from(result: IterResult<V>) -> Self {
        result.into_value()
    }
}
