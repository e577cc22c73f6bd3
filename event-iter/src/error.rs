//! Error types for the event-iter crate.
//!
//! Errors raised by the event source itself are never wrapped: they keep the
//! source's own type and reach the consumer through `advance()`. The types
//! here cover misuse of the adapter surface.

/// Errors raised synchronously by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// An operation received a value it cannot accept
    #[error("Invalid argument `{name}`: received {received}")]
    InvalidArgument {
        /// Name of the offending parameter
        name: &'static str,
        /// Rendering of the value that was received
        received: String,
    },

    /// The adapter configuration is unusable
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

/// Errors raised by the in-memory reference sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocalSourceError {
    /// An error was emitted on a reserved error channel nobody listens to
    #[error("Unhandled error on channel `{channel}`")]
    UnhandledError {
        /// The error channel that fired
        channel: String,
    },
}

/// Convenience type alias for Results using AdapterError.
pub type Result<T> = std::result::Result<T, AdapterError>;
