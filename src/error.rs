//! Error types for JSON encoding.
//!
//! Every failure is terminal for the encode call that raised it: the partially
//! written buffer is dropped and never handed back, so truncated JSON cannot
//! escape the encoder.
//!
//! ## Error Categories
//!
//! - **Structural**: [`Error::DepthExceeded`] and [`Error::CyclicStructure`]
//! - **Text**: [`Error::InvalidEncoding`] for malformed UTF-8 handed to a raw writer
//! - **Values**: [`Error::UnsupportedType`] and [`Error::NonFiniteFloat`]
//! - **Plumbing**: [`Error::Io`] from writer APIs, [`Error::Custom`] from serde
//!
//! ## Examples
//!
//! ```rust
//! use json_gen::{encode, EncodeOptions, Error, Value};
//!
//! let result = encode(&Value::from(f64::NAN), &EncodeOptions::default());
//! assert!(matches!(result, Err(Error::NonFiniteFloat { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding JSON.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A container was nested deeper than `max_nesting_depth`.
    #[error("nesting of {depth} is too deep (max_nesting_depth is {max})")]
    DepthExceeded { depth: usize, max: usize },

    /// A shared container was reached again while it was still being encoded.
    #[error("circular reference detected at depth {depth}")]
    CyclicStructure { depth: usize },

    /// Text handed to the encoder was not valid UTF-8.
    #[error("source sequence is not valid UTF-8 at byte offset {offset}")]
    InvalidEncoding { offset: usize },

    /// A value had no JSON representation and no fallback applied.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// NaN or an infinity reached the float formatter.
    #[error("{value} is not allowed in JSON")]
    NonFiniteFloat { value: f64 },

    /// IO error while writing encoded output
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a depth error for a container opened at `depth`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_gen::Error;
    ///
    /// let err = Error::depth_exceeded(101, 100);
    /// assert!(err.to_string().contains("101"));
    /// ```
    pub fn depth_exceeded(depth: usize, max: usize) -> Self {
        Error::DepthExceeded { depth, max }
    }

    /// Creates a cycle error.
    pub fn cyclic(depth: usize) -> Self {
        Error::CyclicStructure { depth }
    }

    /// Creates an encoding error pointing at the first invalid byte.
    pub fn invalid_encoding(offset: usize) -> Self {
        Error::InvalidEncoding { offset }
    }

    /// Creates an unsupported type error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_gen::Error;
    ///
    /// let err = Error::unsupported_type("Socket");
    /// assert_eq!(err.to_string(), "Unsupported type: Socket");
    /// ```
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates an error for a NaN or infinite float.
    pub fn non_finite(value: f64) -> Self {
        Error::NonFiniteFloat { value }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
