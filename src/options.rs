//! Configuration options for JSON encoding.
//!
//! This module provides [`EncodeOptions`], an immutable record consulted by
//! every part of the encoder, and the enums for each of its knobs:
//!
//! - [`EscapeMode`]: which characters beyond the mandatory set are escaped
//! - [`KeyOrder`]: whether object keys keep insertion order or are sorted
//! - [`FloatFormat`]: shortest round-trip or fixed significant digits
//! - [`UnsupportedPolicy`]: what happens to [`Extension`](crate::Extension) nodes
//! - [`NonFinitePolicy`]: whether NaN and infinities fail or become `null`
//!
//! ## Examples
//!
//! ```rust
//! use json_gen::{encode, EncodeOptions, EscapeMode, KeyOrder, value};
//!
//! let options = EncodeOptions::new()
//!     .with_escape_mode(EscapeMode::AsciiOnly)
//!     .with_key_order(KeyOrder::Sorted);
//!
//! let json = encode(&value!({"b": "€", "a": 1}), &options).unwrap();
//! assert_eq!(json, b"{\"a\":1,\"b\":\"\\u20ac\"}");
//! ```

/// Default limit for nested arrays and objects.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 100;

/// Which characters are escaped beyond `"`, `\` and control characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EscapeMode {
    /// Only what JSON requires; everything else is emitted as UTF-8.
    #[default]
    Minimal,
    /// Every code point at or above U+0080 becomes a `\uXXXX` escape.
    AsciiOnly,
    /// Also escapes `<`, `>`, `&`, U+2028 and U+2029 for embedding in markup.
    HtmlSafe,
}

/// Order in which object members are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeyOrder {
    #[default]
    Insertion,
    /// Sorted by key, comparing Unicode code points.
    Sorted,
}

/// How floats are turned into digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FloatFormat {
    /// The shortest digits that parse back to the same double.
    #[default]
    Shortest,
    /// Rounded to this many significant digits (clamped to `1..=17`).
    ///
    /// Output no longer round-trips for every input.
    Fixed(u8),
}

/// What to do with [`Value::Extension`](crate::Value::Extension) nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    /// Reject a node that neither its hook nor the coder fallback can
    /// represent.
    Fail,
    /// Ask the node's hook, then the coder fallback; reject if both decline.
    /// Same outcome as `Fail`.
    #[default]
    CallExtension,
    /// Like `CallExtension`, but emit the node's `Display` text as a string
    /// instead of failing.
    Stringify,
}

/// What to do with NaN and infinite floats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NonFinitePolicy {
    #[default]
    Error,
    /// Emit `null`. The value does not survive a round trip.
    Null,
}

/// Configuration options for JSON encoding.
///
/// Built once and shared read-only by any number of encode calls.
///
/// # Examples
///
/// ```rust
/// use json_gen::{EncodeOptions, FloatFormat, UnsupportedPolicy};
///
/// // Compact output, the defaults
/// let options = EncodeOptions::new();
/// assert_eq!(options.max_nesting_depth, 100);
///
/// // Pretty-printed with 4-space indentation
/// let options = EncodeOptions::pretty().with_indent(4);
///
/// // Custom configuration
/// let options = EncodeOptions::new()
///     .with_max_nesting_depth(16)
///     .with_float_format(FloatFormat::Fixed(6))
///     .with_unsupported_policy(UnsupportedPolicy::Stringify);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub max_nesting_depth: usize,
    pub escape_mode: EscapeMode,
    pub key_order: KeyOrder,
    pub float_format: FloatFormat,
    pub on_unsupported: UnsupportedPolicy,
    pub non_finite: NonFinitePolicy,
    pub pretty: bool,
    /// Spaces per nesting level. Only used when `pretty` is set.
    pub indent: usize,
    pub trailing_newline: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            escape_mode: EscapeMode::default(),
            key_order: KeyOrder::default(),
            float_format: FloatFormat::default(),
            on_unsupported: UnsupportedPolicy::default(),
            non_finite: NonFinitePolicy::default(),
            pretty: false,
            indent: 2,
            trailing_newline: false,
        }
    }
}

impl EncodeOptions {
    /// Creates default options: compact output, minimal escaping, insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_gen::EncodeOptions;
    ///
    /// let options = EncodeOptions::new();
    /// assert!(!options.pretty);
    /// assert!(!options.trailing_newline);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pretty-printed output with newlines and indentation.
    #[must_use]
    pub fn pretty() -> Self {
        EncodeOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Creates options that reject any extension node no callback can
    /// represent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_gen::{EncodeOptions, UnsupportedPolicy};
    ///
    /// assert_eq!(EncodeOptions::strict().on_unsupported, UnsupportedPolicy::Fail);
    /// ```
    #[must_use]
    pub fn strict() -> Self {
        EncodeOptions {
            on_unsupported: UnsupportedPolicy::Fail,
            ..Default::default()
        }
    }

    /// Sets the nesting limit. Zero is raised to one.
    #[must_use]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth.max(1);
        self
    }

    #[must_use]
    pub fn with_escape_mode(mut self, mode: EscapeMode) -> Self {
        self.escape_mode = mode;
        self
    }

    #[must_use]
    pub fn with_key_order(mut self, order: KeyOrder) -> Self {
        self.key_order = order;
        self
    }

    #[must_use]
    pub fn with_float_format(mut self, format: FloatFormat) -> Self {
        self.float_format = format;
        self
    }

    #[must_use]
    pub fn with_unsupported_policy(mut self, policy: UnsupportedPolicy) -> Self {
        self.on_unsupported = policy;
        self
    }

    #[must_use]
    pub fn with_non_finite(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Default is 2. Only affects pretty-printed output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_gen::EncodeOptions;
    ///
    /// let options = EncodeOptions::pretty().with_indent(4);
    /// assert_eq!(options.indent, 4);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Appends a single `\n` after the document.
    #[must_use]
    pub fn with_trailing_newline(mut self, enabled: bool) -> Self {
        self.trailing_newline = enabled;
        self
    }
}
