//! # json_gen
//!
//! A fast, strictly conformant JSON text encoder.
//!
//! `json_gen` turns a [`Value`] tree, or anything implementing
//! `serde::Serialize`, into RFC 8259 JSON bytes. It is built for throughput on
//! the shapes that dominate real payloads: long ASCII and multibyte strings,
//! integers of every magnitude, floats, and many small documents.
//!
//! ## Key Features
//!
//! - **Exact numbers**: integers of any size are written digit for digit;
//!   floats use the shortest text that reads back to the same `f64`
//! - **Escape modes**: minimal, ASCII-only, or HTML-safe string escaping
//! - **Safe traversal**: a configurable nesting limit and cycle detection for
//!   shared nodes, so bad input fails with an error instead of a stack overflow
//! - **Extension hook**: user types can represent themselves, with a per-coder
//!   fallback and a choice of what happens when nothing applies
//! - **All or nothing**: a failed call never hands back partial output
//!
//! ## Quick Start
//!
//! ```rust
//! use json_gen::{encode, to_string, value, EncodeOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     score: f64,
//! }
//!
//! let user = User { id: 7, name: "Zoë".to_string(), score: 1.0 };
//! assert_eq!(to_string(&user).unwrap(), r#"{"id":7,"name":"Zoë","score":1.0}"#);
//!
//! let doc = value!({"ids": [1, 2, 3]});
//! assert_eq!(encode(&doc, &EncodeOptions::default()).unwrap(), br#"{"ids":[1,2,3]}"#);
//! ```
//!
//! ### Reusing a Configuration
//!
//! ```rust
//! use json_gen::{value, Coder, EncodeOptions, EscapeMode, KeyOrder};
//!
//! let coder = Coder::new(
//!     EncodeOptions::new()
//!         .with_escape_mode(EscapeMode::HtmlSafe)
//!         .with_key_order(KeyOrder::Sorted),
//! );
//!
//! let json = coder.dump_to_string(&value!({"z": "</script>", "a": 1})).unwrap();
//! assert_eq!(json, r#"{"a":1,"z":"\u003c/script\u003e"}"#);
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Traversal**: O(n) in the number of nodes, one pass, no intermediate text
//! - **Strings**: runs of bytes that need no escaping are copied in bulk
//! - **Numbers**: integers and floats are formatted on the stack and appended
//!   directly
//! - **Memory**: one growable buffer per call, reserved ahead of large strings
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Nesting deeper than [`EncodeOptions::max_nesting_depth`] is an error
//! - Cycles through [`Shared`] nodes are detected and reported
//! - Output is always valid UTF-8

mod escape;
mod number;

pub mod buffer;
pub mod coder;
pub mod encoder;
pub mod error;
pub mod extension;
pub mod macros;
pub mod map;
pub mod options;
pub mod ser;
pub mod value;

pub use buffer::OutputBuffer;
pub use coder::Coder;
pub use encoder::{Encoder, Fallback};
pub use error::{Error, Result};
pub use extension::{Extension, Handle, RawWriter, Repr};
pub use map::Map;
pub use options::{
    EncodeOptions, EscapeMode, FloatFormat, KeyOrder, NonFinitePolicy, UnsupportedPolicy,
    DEFAULT_MAX_NESTING_DEPTH,
};
pub use ser::ValueSerializer;
pub use value::{Number, Shared, Value};

use serde::Serialize;
use std::io;

/// Encode a [`Value`] to JSON bytes.
///
/// # Examples
///
/// ```rust
/// use json_gen::{encode, EncodeOptions, Value};
///
/// let json = encode(&Value::from(vec![Value::from(0.1), Value::Null]), &EncodeOptions::default()).unwrap();
/// assert_eq!(json, b"[0.1,null]");
/// ```
///
/// # Errors
///
/// Returns an error when the value nests too deeply, contains a cycle, holds a
/// non-finite float or an extension without a representation. No partial
/// output is returned.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(options);
    encoder.encode(value)?;
    Ok(encoder.into_inner())
}

/// Serialize any `T: Serialize` to compact JSON bytes.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_vec_with_options(value, &EncodeOptions::default())
}

/// Serialize any `T: Serialize` to JSON bytes with custom options.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_options<T>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    encode(&to_value(value)?, options)
}

/// Serialize any `T: Serialize` to a compact JSON string.
///
/// # Examples
///
/// ```rust
/// use json_gen::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), r#"{"x":1,"y":2}"#);
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &EncodeOptions::default())
}

/// Serialize any `T: Serialize` to an indented JSON string.
///
/// # Examples
///
/// ```rust
/// use json_gen::to_string_pretty;
///
/// assert_eq!(to_string_pretty(&vec![1, 2]).unwrap(), "[\n  1,\n  2\n]");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &EncodeOptions::pretty())
}

/// Serialize any `T: Serialize` to a JSON string with custom options.
///
/// # Examples
///
/// ```rust
/// use json_gen::{to_string_with_options, EncodeOptions, EscapeMode};
///
/// let options = EncodeOptions::new().with_escape_mode(EscapeMode::AsciiOnly);
/// assert_eq!(to_string_with_options("caf\u{e9}", &options).unwrap(), "\"caf\\u00e9\"");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &EncodeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    into_string(to_vec_with_options(value, options)?)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use json_gen::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value: Value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_object());
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    ser::to_value(value)
}

/// Serialize any `T: Serialize` as compact JSON into a writer.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails. Nothing
/// is written when encoding fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, &EncodeOptions::default())
}

/// Serialize any `T: Serialize` as JSON into a writer with custom options.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: &EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let bytes = to_vec_with_options(value, options)?;
    writer
        .write_all(&bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| Error::invalid_encoding(e.utf8_error().valid_up_to()))
}
