//! The traversal engine.
//!
//! [`Encoder`] walks a [`Value`] depth-first and writes JSON into its
//! [`OutputBuffer`]. It tracks two pieces of state per call: the current
//! nesting depth, checked against
//! [`max_nesting_depth`](crate::EncodeOptions::max_nesting_depth), and the
//! identities of the [`Shared`] and extension nodes open on the current path,
//! used to reject cycles.
//!
//! ## Examples
//!
//! ```rust
//! use json_gen::{value, EncodeOptions, Encoder};
//!
//! let options = EncodeOptions::default();
//! let mut encoder = Encoder::new(&options);
//! encoder.encode(&value!({"id": 1, "tags": ["a", "b"]})).unwrap();
//!
//! assert_eq!(encoder.into_inner(), br#"{"id":1,"tags":["a","b"]}"#);
//! ```

use crate::buffer::OutputBuffer;
use crate::error::{Error, Result};
use crate::extension::{Extension, Handle, RawWriter, Repr};
use crate::options::{EncodeOptions, KeyOrder, UnsupportedPolicy};
use crate::value::{Number, Shared, Value};
use crate::{escape, number, Map};

/// Substitute lookup consulted when an extension's own hook declines.
pub type Fallback = dyn Fn(&dyn Extension) -> Option<Value> + Send + Sync;

const SPACES: &[u8; 64] = b"                                                                ";

/// Writes values as JSON into an owned buffer.
///
/// Each successful [`encode`](Encoder::encode) appends one document. A failed
/// call leaves the buffer exactly as it was before the call.
pub struct Encoder<'a> {
    out: OutputBuffer,
    options: &'a EncodeOptions,
    fallback: Option<&'a Fallback>,
    depth: usize,
    open: Vec<usize>,
}

impl<'a> Encoder<'a> {
    #[must_use]
    pub fn new(options: &'a EncodeOptions) -> Self {
        Self::with_output(OutputBuffer::new(), options, None)
    }

    /// Creates an encoder that asks `fallback` for a substitute whenever an
    /// extension node cannot represent itself.
    #[must_use]
    pub fn with_fallback(options: &'a EncodeOptions, fallback: &'a Fallback) -> Self {
        Self::with_output(OutputBuffer::new(), options, Some(fallback))
    }

    pub(crate) fn with_output(
        out: OutputBuffer,
        options: &'a EncodeOptions,
        fallback: Option<&'a Fallback>,
    ) -> Self {
        Encoder {
            out,
            options,
            fallback,
            depth: 0,
            open: Vec::new(),
        }
    }

    /// Appends `value` as one JSON document.
    ///
    /// # Errors
    ///
    /// Returns the first error met during traversal. Output written by this
    /// call is discarded.
    pub fn encode(&mut self, value: &Value) -> Result<()> {
        let mark = self.out.len();
        self.depth = 0;
        self.open.clear();

        match self.write_value(value) {
            Ok(()) => {
                if self.options.trailing_newline {
                    self.out.push(b'\n');
                }
                Ok(())
            }
            Err(err) => {
                self.out.truncate(mark);
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.out.as_bytes()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.out.finalize()
    }

    fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.out.append_literal("null"),
            Value::Bool(true) => self.out.append_literal("true"),
            Value::Bool(false) => self.out.append_literal("false"),
            Value::Number(Number::Integer(i)) => number::write_i64(&mut self.out, *i),
            Value::Number(Number::Unsigned(u)) => number::write_u64(&mut self.out, *u),
            Value::Number(Number::Float(f)) => number::write_f64(
                &mut self.out,
                *f,
                self.options.float_format,
                self.options.non_finite,
            )?,
            Value::BigInt(bi) => number::write_bigint(&mut self.out, bi),
            Value::String(s) => escape::write_str(&mut self.out, s, self.options.escape_mode),
            Value::Array(items) => self.write_array(items)?,
            Value::Object(map) => self.write_object(map)?,
            Value::Shared(shared) => self.write_shared(shared)?,
            Value::Extension(handle) => self.write_extension(handle)?,
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_nesting_depth {
            return Err(Error::depth_exceeded(
                self.depth,
                self.options.max_nesting_depth,
            ));
        }
        Ok(())
    }

    /// Line break plus indentation for the current depth, in pretty mode only.
    fn newline(&mut self) {
        if !self.options.pretty {
            return;
        }
        self.out.push(b'\n');
        let mut remaining = self.depth * self.options.indent;
        while remaining > 0 {
            let chunk = remaining.min(SPACES.len());
            self.out.append_bytes(&SPACES[..chunk]);
            remaining -= chunk;
        }
    }

    fn write_array(&mut self, items: &[Value]) -> Result<()> {
        self.enter()?;
        if items.is_empty() {
            self.out.append_literal("[]");
            self.depth -= 1;
            return Ok(());
        }

        self.out.push(b'[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push(b',');
            }
            self.newline();
            self.write_value(item)?;
        }
        self.depth -= 1;
        self.newline();
        self.out.push(b']');
        Ok(())
    }

    fn write_object(&mut self, map: &Map) -> Result<()> {
        self.enter()?;
        if map.is_empty() {
            self.out.append_literal("{}");
            self.depth -= 1;
            return Ok(());
        }

        self.out.push(b'{');
        match self.options.key_order {
            KeyOrder::Insertion => self.write_members(map.iter())?,
            KeyOrder::Sorted => {
                let mut members: Vec<_> = map.iter().collect();
                members.sort_unstable_by(|a, b| a.0.cmp(b.0));
                self.write_members(members.into_iter())?;
            }
        }
        self.depth -= 1;
        self.newline();
        self.out.push(b'}');
        Ok(())
    }

    fn write_members<'v, I>(&mut self, members: I) -> Result<()>
    where
        I: Iterator<Item = (&'v String, &'v Value)>,
    {
        for (i, (key, value)) in members.enumerate() {
            if i > 0 {
                self.out.push(b',');
            }
            self.newline();
            escape::write_str(&mut self.out, key, self.options.escape_mode);
            if self.options.pretty {
                self.out.append_literal(": ");
            } else {
                self.out.push(b':');
            }
            self.write_value(value)?;
        }
        Ok(())
    }

    fn write_shared(&mut self, shared: &Shared) -> Result<()> {
        let id = shared.id();
        if self.open.contains(&id) {
            return Err(Error::cyclic(self.depth));
        }
        self.open.push(id);
        let result = self.write_value(&shared.read());
        self.open.pop();
        result
    }

    fn write_extension(&mut self, handle: &Handle) -> Result<()> {
        let repr = {
            let mut writer = RawWriter::new(&mut self.out, self.options);
            match handle.to_json(&mut writer)? {
                Repr::Written if writer.has_written() => return Ok(()),
                Repr::Written => return Err(Error::unsupported_type(handle.type_name())),
                repr => {
                    writer.discard();
                    repr
                }
            }
        };

        if let Repr::Value(substitute) = repr {
            return self.write_substitute(handle.id(), &substitute);
        }
        if let Some(fallback) = self.fallback {
            if let Some(substitute) = fallback(&**handle) {
                return self.write_substitute(handle.id(), &substitute);
            }
        }

        match self.options.on_unsupported {
            UnsupportedPolicy::Stringify => {
                let text = handle.to_string();
                escape::write_str(&mut self.out, &text, self.options.escape_mode);
                Ok(())
            }
            _ => Err(Error::unsupported_type(handle.type_name())),
        }
    }

    /// Encodes a value standing in for an extension node, one level deeper.
    fn write_substitute(&mut self, id: usize, substitute: &Value) -> Result<()> {
        if self.open.contains(&id) {
            return Err(Error::cyclic(self.depth));
        }
        self.enter()?;
        self.open.push(id);
        let result = self.write_value(substitute);
        self.open.pop();
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{EscapeMode, NonFinitePolicy};
    use std::fmt;

    fn encode_with(value: &Value, options: &EncodeOptions) -> Result<String> {
        let mut encoder = Encoder::new(options);
        encoder.encode(value)?;
        Ok(String::from_utf8(encoder.into_inner()).unwrap())
    }

    fn nested(levels: usize) -> Value {
        let mut value = Value::Null;
        for _ in 0..levels {
            value = Value::Array(vec![value]);
        }
        value
    }

    #[derive(Debug)]
    struct Wrapper(Value);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("wrapper")
        }
    }

    impl Extension for Wrapper {
        fn to_json(&self, _out: &mut RawWriter<'_>) -> Result<Repr> {
            Ok(Repr::Value(self.0.clone()))
        }
    }

    #[test]
    fn test_scalars_at_top_level() {
        let options = EncodeOptions::default();
        assert_eq!(encode_with(&Value::Null, &options).unwrap(), "null");
        assert_eq!(encode_with(&Value::Bool(false), &options).unwrap(), "false");
        assert_eq!(encode_with(&Value::from(-7), &options).unwrap(), "-7");
        assert_eq!(encode_with(&Value::from("x"), &options).unwrap(), "\"x\"");
    }

    #[test]
    fn test_depth_limit_is_inclusive() {
        let options = EncodeOptions::default().with_max_nesting_depth(3);
        assert!(encode_with(&nested(3), &options).is_ok());
        let err = encode_with(&nested(4), &options).unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { depth: 4, max: 3 }));

        let options = EncodeOptions::default().with_max_nesting_depth(1);
        assert_eq!(encode_with(&Value::Array(vec![]), &options).unwrap(), "[]");
        assert!(encode_with(&nested(2), &options).is_err());
    }

    #[test]
    fn test_failed_call_leaves_buffer_untouched() {
        let options = EncodeOptions::default();
        let mut encoder = Encoder::new(&options);
        encoder.encode(&Value::from(1)).unwrap();
        let bad = Value::Array(vec![Value::from("ok"), Value::from(f64::INFINITY)]);
        assert!(encoder.encode(&bad).is_err());
        encoder.encode(&Value::from(2)).unwrap();
        assert_eq!(encoder.as_bytes(), b"12");
    }

    #[test]
    fn test_self_referencing_shared_is_rejected() {
        let node = Shared::new(Value::Array(vec![]));
        if let Value::Array(items) = &mut *node.write() {
            items.push(Value::Shared(node.clone()));
        }
        let options = EncodeOptions::default();
        let err = encode_with(&Value::Shared(node.clone()), &options).unwrap_err();
        assert!(matches!(err, Error::CyclicStructure { depth: 1 }));
        node.replace(Value::Null);
    }

    #[test]
    fn test_shared_siblings_are_repeated() {
        let shared = Shared::new(Value::from(vec![Value::from(1)]));
        let value = Value::Array(vec![
            Value::Shared(shared.clone()),
            Value::Shared(shared),
        ]);
        let json = encode_with(&value, &EncodeOptions::default()).unwrap();
        assert_eq!(json, "[[1],[1]]");
    }

    #[test]
    fn test_shared_does_not_add_depth() {
        let options = EncodeOptions::default().with_max_nesting_depth(1);
        let value = Value::shared(Value::Array(vec![Value::from(1)]));
        assert_eq!(encode_with(&value, &options).unwrap(), "[1]");
    }

    #[test]
    fn test_substitute_counts_one_level() {
        let options = EncodeOptions::default().with_max_nesting_depth(1);
        let scalar = Value::extension(Wrapper(Value::from(5)));
        assert_eq!(encode_with(&scalar, &options).unwrap(), "5");

        let list = Value::extension(Wrapper(Value::Array(vec![])));
        assert!(matches!(
            encode_with(&list, &options),
            Err(Error::DepthExceeded { depth: 2, max: 1 })
        ));
    }

    #[test]
    fn test_substitute_cycle_through_shared() {
        let slot = Shared::new(Value::Null);
        let ext = Value::extension(Wrapper(Value::Shared(slot.clone())));
        slot.replace(Value::Array(vec![ext.clone()]));

        let err = encode_with(&ext, &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::CyclicStructure { .. }));
        slot.replace(Value::Null);
    }

    #[test]
    fn test_fallback_is_consulted() {
        #[derive(Debug)]
        struct Opaque;

        impl fmt::Display for Opaque {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("opaque")
            }
        }

        impl Extension for Opaque {}

        let fallback = |ext: &dyn Extension| Some(Value::from(format!("<{}>", ext)));
        let options = EncodeOptions::default();
        let mut encoder = Encoder::with_fallback(&options, &fallback);
        encoder.encode(&Value::extension(Opaque)).unwrap();
        assert_eq!(encoder.into_inner(), b"\"<opaque>\"");

        let err = encode_with(&Value::extension(Opaque), &options).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
    }

    #[test]
    fn test_sorted_keys_and_escaped_keys() {
        let mut map = Map::new();
        map.insert("b".to_string(), Value::from(1));
        map.insert("a\u{e9}".to_string(), Value::from(2));
        map.insert("a".to_string(), Value::from(3));
        let options = EncodeOptions::default()
            .with_key_order(crate::KeyOrder::Sorted)
            .with_escape_mode(EscapeMode::AsciiOnly);
        assert_eq!(
            encode_with(&Value::Object(map), &options).unwrap(),
            "{\"a\":3,\"a\\u00e9\":2,\"b\":1}"
        );
    }

    #[test]
    fn test_pretty_layout() {
        let mut inner = Map::new();
        inner.insert("x".to_string(), Value::Array(vec![]));
        inner.insert("y".to_string(), Value::Object(Map::new()));
        let value = Value::Array(vec![Value::from(1), Value::Object(inner)]);

        let options = EncodeOptions::pretty().with_trailing_newline(true);
        let json = encode_with(&value, &options).unwrap();
        assert_eq!(
            json,
            "[\n  1,\n  {\n    \"x\": [],\n    \"y\": {}\n  }\n]\n"
        );
    }

    #[test]
    fn test_non_finite_as_null() {
        let options = EncodeOptions::default().with_non_finite(NonFinitePolicy::Null);
        let value = Value::Array(vec![Value::from(f64::NAN), Value::from(f64::NEG_INFINITY)]);
        assert_eq!(encode_with(&value, &options).unwrap(), "[null,null]");
    }
}
