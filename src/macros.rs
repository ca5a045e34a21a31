//! The [`value!`](crate::value) literal builder and its leaf conversions.

use std::fmt;

use serde::Serialize;

use crate::Value;

/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// Object keys are single tokens rendered with `Display`, so string
/// literals, numbers and plain identifiers bound to text all work. Leaves go
/// through [`to_value`](crate::to_value); wrap negative numbers and other
/// multi-token expressions in parentheses.
///
/// A leaf that serde cannot represent becomes `null`. This includes a `Value`
/// leaf holding extension nodes, which only the encoder can render. Call
/// [`to_value`](crate::to_value) directly to see the error, or build such
/// trees with the [`Value`](crate::Value) constructors.
///
/// # Examples
///
/// ```rust
/// use json_gen::value;
///
/// let role = "admin";
/// let v = value!({
///     "name": "Alice",
///     "scores": [1, 2, (-3)],
///     role: true,
///     404: null
/// });
/// assert_eq!(v.to_string(), r#"{"name":"Alice","scores":[1,2,-3],"admin":true,"404":null}"#);
/// ```
#[macro_export]
macro_rules! value {
    (@count $($key:tt)*) => {
        <[()]>::len(&[$($crate::value!(@unit $key)),*])
    };

    (@unit $key:tt) => {
        ()
    };

    (null) => {
        $crate::Value::Null
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({ $($key:tt : $member:tt),* $(,)? }) => {{
        let mut map = $crate::Map::with_capacity($crate::value!(@count $($key)*));
        $(
            map.insert($crate::macros::object_key(&$key), $crate::value!($member));
        )*
        $crate::Value::Object(map)
    }};

    ($leaf:expr) => {
        $crate::macros::leaf(&$leaf)
    };
}

#[doc(hidden)]
pub fn object_key<K: fmt::Display + ?Sized>(key: &K) -> String {
    key.to_string()
}

#[doc(hidden)]
pub fn leaf<T: Serialize + ?Sized>(value: &T) -> Value {
    crate::to_value(value).unwrap_or(Value::Null)
}
