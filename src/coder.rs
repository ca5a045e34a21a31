//! Reusable encoder configuration.
//!
//! A [`Coder`] bundles [`EncodeOptions`] with an optional fallback for
//! extension nodes, so one instance can be built up front and shared by every
//! caller that needs the same output.
//!
//! ## Examples
//!
//! ```rust
//! use json_gen::{Coder, EncodeOptions, Extension, Value};
//! use std::fmt;
//!
//! #[derive(Debug)]
//! struct Money(i64);
//!
//! impl fmt::Display for Money {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
//!     }
//! }
//!
//! impl Extension for Money {}
//!
//! let coder = Coder::new(EncodeOptions::default())
//!     .with_fallback(|ext: &dyn Extension| Some(Value::from(ext.to_string())));
//!
//! let json = coder.dump(&Value::extension(Money(1999))).unwrap();
//! assert_eq!(json, b"\"19.99\"");
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::buffer::OutputBuffer;
use crate::encoder::{Encoder, Fallback};
use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::options::EncodeOptions;
use crate::Value;

/// Options plus fallback, ready to encode any number of values.
#[derive(Clone, Default)]
pub struct Coder {
    options: EncodeOptions,
    fallback: Option<Arc<Fallback>>,
}

impl Coder {
    #[must_use]
    pub fn new(options: EncodeOptions) -> Self {
        Coder {
            options,
            fallback: None,
        }
    }

    /// Sets the function asked for a substitute when an extension declines
    /// to represent itself.
    #[must_use]
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&dyn Extension) -> Option<Value> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    #[must_use]
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    fn encoder(&self, out: OutputBuffer) -> Encoder<'_> {
        Encoder::with_output(out, &self.options, self.fallback.as_deref())
    }

    /// Encodes `value` into a fresh vector.
    ///
    /// # Errors
    ///
    /// Any traversal error; see [`Error`].
    pub fn dump(&self, value: &Value) -> Result<Vec<u8>> {
        let mut encoder = self.encoder(OutputBuffer::new());
        encoder.encode(value)?;
        Ok(encoder.into_inner())
    }

    /// Like [`dump`](Coder::dump), returning a `String`.
    ///
    /// # Errors
    ///
    /// Any traversal error; see [`Error`].
    pub fn dump_to_string(&self, value: &Value) -> Result<String> {
        let bytes = self.dump(value)?;
        String::from_utf8(bytes).map_err(|e| Error::invalid_encoding(e.utf8_error().valid_up_to()))
    }

    /// Appends the encoding of `value` to `out`.
    ///
    /// # Errors
    ///
    /// Any traversal error. `out` keeps its original contents and length.
    pub fn dump_into(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let mut encoder = self.encoder(OutputBuffer::from_vec(std::mem::take(out)));
        let result = encoder.encode(value);
        *out = encoder.into_inner();
        result
    }

    /// Converts `value` through serde, then encodes it.
    ///
    /// # Errors
    ///
    /// Serialization errors from `value`, then any traversal error.
    pub fn dump_serialize<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: ?Sized + Serialize,
    {
        self.dump(&crate::to_value(value)?)
    }
}

impl fmt::Debug for Coder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coder")
            .field("options", &self.options)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
