//! Error types shared by delegates, properties and the binding executor.
//!
//! Listener and transform failures are ordinary errors: they abort the
//! dispatch or run in progress and surface at the original call site.
//! A listener asking to be removed is not an error, see [`Flow`].
//!
//! [`Flow`]: crate::delegate::Flow

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while dispatching listeners or recomputing bindings.
#[derive(Debug, Error)]
pub enum Error {
    /// An invariant-maintaining listener found a state it cannot resolve.
    #[error("invariant violated: {message}")]
    InvariantViolation {
        /// Description of the violated invariant.
        message: String,
    },

    /// A typed transform received a source value of another type.
    #[error("binding source {index} is not a `{expected}`")]
    SourceType {
        /// Position of the offending source.
        index: usize,
        /// Type name the transform expected.
        expected: &'static str,
    },

    /// A transform received the wrong number of source values.
    #[error("binding expected {expected} source values, got {found}")]
    Arity {
        /// Number of sources the transform reads.
        expected: usize,
        /// Number of values it was handed.
        found: usize,
    },

    /// Error raised by user code inside a listener or transform.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Build an [`Error::InvariantViolation`].
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Wrap an arbitrary error raised by user code.
    pub fn custom<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Custom(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        let err = Error::invariant("min exceeds max");
        assert_eq!(err.to_string(), "invariant violated: min exceeds max");

        let err = Error::SourceType {
            index: 1,
            expected: "i32",
        };
        assert_eq!(err.to_string(), "binding source 1 is not a `i32`");

        let err = Error::Arity {
            expected: 2,
            found: 3,
        };
        assert_eq!(err.to_string(), "binding expected 2 source values, got 3");
    }

    #[test]
    fn custom_wraps_strings_transparently() {
        let err = Error::custom("transform blew up");
        assert!(matches!(err, Error::Custom(_)));
        assert_eq!(err.to_string(), "transform blew up");
    }
}
