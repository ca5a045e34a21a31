//! User-defined types inside a value tree.
//!
//! A [`Value::Extension`](crate::Value::Extension) node holds a [`Handle`] to
//! something implementing [`Extension`]. When the encoder reaches such a node
//! it asks the type to represent itself, either by returning a substitute
//! [`Value`] or by writing straight into the output through a [`RawWriter`].
//! What happens when the type declines is decided by
//! [`UnsupportedPolicy`](crate::UnsupportedPolicy).
//!
//! ## Examples
//!
//! ```rust
//! use json_gen::{encode, EncodeOptions, Extension, RawWriter, Repr, Result, Value};
//! use std::fmt;
//!
//! #[derive(Debug)]
//! struct Point { x: i64, y: i64 }
//!
//! impl fmt::Display for Point {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "({}, {})", self.x, self.y)
//!     }
//! }
//!
//! impl Extension for Point {
//!     fn to_json(&self, _out: &mut RawWriter<'_>) -> Result<Repr> {
//!         Ok(Repr::Value(Value::Array(vec![self.x.into(), self.y.into()])))
//!     }
//! }
//!
//! let json = encode(&Value::extension(Point { x: 1, y: 2 }), &EncodeOptions::default()).unwrap();
//! assert_eq!(json, b"[1,2]");
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::buffer::OutputBuffer;
use crate::error::Result;
use crate::options::EncodeOptions;
use crate::{escape, number, Value};

/// How an extension chose to represent itself.
#[derive(Debug)]
pub enum Repr {
    /// Encode this value in place of the extension node.
    Value(Value),
    /// The JSON for the node has already been written to the [`RawWriter`].
    Written,
    /// No representation; the encoder falls back according to its policy.
    Unsupported,
}

/// A user type that can appear in a value tree.
///
/// `Display` provides the text used by
/// [`UnsupportedPolicy::Stringify`](crate::UnsupportedPolicy::Stringify).
pub trait Extension: fmt::Debug + fmt::Display + Send + Sync {
    /// Name used in [`Error::UnsupportedType`](crate::Error::UnsupportedType) messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Represents `self` as JSON. The default declines.
    ///
    /// # Errors
    ///
    /// Any error returned here aborts the whole encode call.
    fn to_json(&self, out: &mut RawWriter<'_>) -> Result<Repr> {
        let _ = out;
        Ok(Repr::Unsupported)
    }
}

/// Shared, cheaply clonable reference to an [`Extension`].
///
/// Two handles are equal when they point at the same object.
#[derive(Clone)]
pub struct Handle(Arc<dyn Extension>);

impl Handle {
    pub fn new<E: Extension + 'static>(extension: E) -> Self {
        Handle(Arc::new(extension))
    }

    pub fn from_arc(extension: Arc<dyn Extension>) -> Self {
        Handle(extension)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        self.id() == other.id()
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl Deref for Handle {
    type Target = dyn Extension;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Direct access to the output for [`Extension::to_json`].
///
/// Every method writes one complete JSON value. If the hook ends up returning
/// anything other than [`Repr::Written`], whatever it wrote is discarded.
pub struct RawWriter<'a> {
    out: &'a mut OutputBuffer,
    options: &'a EncodeOptions,
    start: usize,
}

impl<'a> RawWriter<'a> {
    pub(crate) fn new(out: &'a mut OutputBuffer, options: &'a EncodeOptions) -> Self {
        let start = out.len();
        RawWriter {
            out,
            options,
            start,
        }
    }

    /// The options of the running encode call.
    #[must_use]
    pub fn options(&self) -> &EncodeOptions {
        self.options
    }

    pub fn write_null(&mut self) {
        self.out.append_literal("null");
    }

    pub fn write_bool(&mut self, value: bool) {
        self.out.append_literal(if value { "true" } else { "false" });
    }

    pub fn write_i64(&mut self, value: i64) {
        number::write_i64(self.out, value);
    }

    pub fn write_u64(&mut self, value: u64) {
        number::write_u64(self.out, value);
    }

    /// Writes a float using the call's float format and non-finite policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonFiniteFloat`](crate::Error::NonFiniteFloat) when the
    /// policy rejects NaN or infinities.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        number::write_f64(
            self.out,
            value,
            self.options.float_format,
            self.options.non_finite,
        )
    }

    /// Writes a string literal escaped per the call's escape mode.
    pub fn write_str(&mut self, value: &str) {
        escape::write_str(self.out, value, self.options.escape_mode);
    }

    /// Writes raw bytes as a string literal after checking they are UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`](crate::Error::InvalidEncoding) for
    /// malformed input.
    pub fn write_text_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        escape::write_bytes(self.out, bytes, self.options.escape_mode)
    }

    /// Writes pre-encoded JSON verbatim. The caller vouches for its validity.
    pub fn write_raw(&mut self, json: &str) {
        self.out.append_bytes(json.as_bytes());
    }

    #[must_use]
    pub fn has_written(&self) -> bool {
        self.out.len() > self.start
    }

    pub(crate) fn discard(self) {
        self.out.truncate(self.start);
    }
}

/// Timestamps are written as RFC 3339 strings.
impl Extension for DateTime<Utc> {
    fn type_name(&self) -> &'static str {
        "DateTime<Utc>"
    }

    fn to_json(&self, out: &mut RawWriter<'_>) -> Result<Repr> {
        out.write_str(&self.to_rfc3339());
        Ok(Repr::Written)
    }
}
