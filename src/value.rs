//! Dynamic value tree accepted by the encoder.
//!
//! This module provides the [`Value`] enum, the input to every encode call.
//!
//! ## Core Types
//!
//! - [`Value`]: null, bool, number, big integer, string, array, object, plus
//!   shared handles and user extensions
//! - [`Number`]: a JSON number that fits in 64 bits
//! - [`Shared`]: a reference-counted node; the only way to reuse a subtree or
//!   build a cycle
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use json_gen::{value, Value};
//!
//! let null = Value::Null;
//! let number = Value::from(42);
//! let text = Value::from("hello");
//!
//! let obj = value!({
//!     "name": "Alice",
//!     "tags": ["a", "b"]
//! });
//! assert!(obj.is_object());
//! ```
//!
//! ### Sharing Subtrees
//!
//! ```rust
//! use json_gen::{encode, EncodeOptions, Value};
//!
//! let point = Value::shared(Value::Array(vec![1.into(), 2.into()]));
//! let line = Value::Array(vec![point.clone(), point]);
//!
//! let json = encode(&line, &EncodeOptions::default()).unwrap();
//! assert_eq!(json, b"[[1,2],[1,2]]");
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use json_gen::Value;
//! use std::convert::TryFrom;
//!
//! let num: i64 = i64::try_from(Value::from(42)).unwrap();
//! assert_eq!(num, 42);
//! ```

use crate::extension::{Extension, Handle};
use crate::Map;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Any value the encoder can write.
///
/// Owned `Array` and `Object` nodes always form a tree. Sharing, and with it
/// the possibility of a cycle, only enters through [`Value::Shared`].
///
/// # Examples
///
/// ```rust
/// use json_gen::{Number, Value};
///
/// let num = Value::Number(Number::Integer(42));
/// let text = Value::String("hello".to_string());
///
/// assert!(Value::Null.is_null());
/// assert!(num.is_number());
/// assert!(text.is_string());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    /// Integers outside the 64-bit range, written digit for digit.
    BigInt(BigInt),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Shared(Shared),
    Extension(Handle),
}

/// A JSON number that fits in 64 bits.
///
/// # Examples
///
/// ```rust
/// use json_gen::Number;
///
/// assert_eq!(Number::from(42u64), Number::Integer(42));
/// assert_eq!(Number::from(u64::MAX), Number::Unsigned(u64::MAX));
/// assert_eq!(Number::Float(3.5).as_f64(), 3.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    /// Only used for values above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::Unsigned(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Returns the value as `i64` when it is an integer in range.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Integer(i) => Some(i),
            Number::Unsigned(u) => i64::try_from(u).ok(),
            Number::Float(_) => None,
        }
    }

    /// Returns the value as `u64` when it is a non-negative integer.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::Integer(i) => u64::try_from(i).ok(),
            Number::Unsigned(u) => Some(u),
            Number::Float(_) => None,
        }
    }

    /// Converts to `f64`, losing precision for large integers.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Unsigned(u) => u as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Unsigned(u) => write!(f, "{}", u),
            Number::Float(fl) => write!(f, "{}", fl),
        }
    }
}

macro_rules! number_from_signed {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(i64::from(value))
                }
            }
        )*
    };
}

macro_rules! number_from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(i64::from(value))
                }
            }
        )*
    };
}

number_from_signed!(i8, i16, i32, i64);
number_from_unsigned!(u8, u16, u32);

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Number::Integer(i),
            Err(_) => Number::Unsigned(value),
        }
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(f64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// A reference-counted, interior-mutable node.
///
/// Cloning a `Shared` clones the handle, not the value. The encoder tracks
/// which handles are open on the current path and fails with
/// [`Error::CyclicStructure`](crate::Error::CyclicStructure) when one is
/// reached again; the same handle in sibling positions is fine.
///
/// Equality first compares identity, then contents. Comparing two distinct
/// handles whose contents are cyclic does not terminate.
#[derive(Clone)]
pub struct Shared(Arc<RwLock<Value>>);

impl Shared {
    pub fn new(value: Value) -> Self {
        Shared(Arc::new(RwLock::new(value)))
    }

    /// Locks the node for reading. A poisoned lock is still readable.
    pub fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Swaps in a new value and returns the old one.
    pub fn replace(&self, value: Value) -> Value {
        std::mem::replace(&mut *self.write(), value)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Shared) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:#x})", self.id())
    }
}

impl PartialEq for Shared {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.read() == *other.read()
    }
}

impl Value {
    /// Wraps `value` in a new [`Shared`] handle.
    pub fn shared(value: Value) -> Self {
        Value::Shared(Shared::new(value))
    }

    /// Wraps a user type as an extension node.
    pub fn extension<E: Extension + 'static>(extension: E) -> Self {
        Value::Extension(Handle::new(extension))
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` for numbers of any width, including big integers.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_) | Value::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        matches!(self, Value::Shared(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_extension(&self) -> bool {
        matches!(self, Value::Extension(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(bi) => Some(bi),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_shared(&self) -> Option<&Shared> {
        match self {
            Value::Shared(shared) => Some(shared),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_extension(&self) -> Option<&Handle> {
        match self {
            Value::Extension(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Compact JSON. NaN and infinities print as `null`; extensions without a
/// representation print their `Display` text as a string. Cyclic or too deeply
/// nested values make formatting fail.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = crate::EncodeOptions::new()
            .with_non_finite(crate::NonFinitePolicy::Null)
            .with_unsupported_policy(crate::UnsupportedPolicy::Stringify);
        let bytes = crate::encode(self, &options).map_err(|_| fmt::Error)?;
        let text = std::str::from_utf8(&bytes).map_err(|_| fmt::Error)?;
        f.write_str(text)
    }
}

/// Shared nodes serialize their current contents. Extensions and integers
/// beyond 128 bits are rejected.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error as _;

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Unsigned(u)) => serializer.serialize_u64(*u),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::BigInt(bi) => {
                if let Ok(i) = i128::try_from(bi) {
                    serializer.serialize_i128(i)
                } else if let Ok(u) = u128::try_from(bi) {
                    serializer.serialize_u128(u)
                } else {
                    Err(S::Error::custom(format!("integer {} out of range", bi)))
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Object(obj) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Shared(shared) => shared.read().serialize(serializer),
            Value::Extension(handle) => Err(S::Error::custom(format!(
                "unsupported type: {}",
                handle.type_name()
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid JSON value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(value)))
            }

            fn visit_i128<E>(self, value: i128) -> Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u128<E>(self, value: u128) -> Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Float(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = Map::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Value::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| crate::Error::custom(format!("expected integer, found {:?}", value)))
    }
}

impl TryFrom<Value> for u64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_u64().ok_or_else(|| {
            crate::Error::custom(format!("expected unsigned integer, found {:?}", value))
        })
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| crate::Error::custom(format!("expected number, found {:?}", value)))
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(crate::Error::custom(format!(
                "expected bool, found {:?}",
                value
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(crate::Error::custom(format!(
                "expected string, found {:?}",
                value
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        if let Ok(i) = i64::try_from(value) {
            Value::Number(Number::Integer(i))
        } else if let Ok(u) = u64::try_from(value) {
            Value::Number(Number::Unsigned(u))
        } else {
            Value::BigInt(BigInt::from(value))
        }
    }
}

impl From<u128> for Value {
    fn from(value: u128) -> Self {
        match u64::try_from(value) {
            Ok(u) => Value::Number(Number::from(u)),
            Err(_) => Value::BigInt(BigInt::from(value)),
        }
    }
}

/// Keeps the value in the narrowest variant that holds it.
impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        if let Ok(i) = i64::try_from(&value) {
            Value::Number(Number::Integer(i))
        } else if let Ok(u) = u64::try_from(&value) {
            Value::Number(Number::Unsigned(u))
        } else {
            Value::BigInt(value)
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Object(value)
    }
}

impl From<Shared> for Value {
    fn from(value: Shared) -> Self {
        Value::Shared(value)
    }
}

impl From<Handle> for Value {
    fn from(value: Handle) -> Self {
        Value::Extension(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::extension(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
