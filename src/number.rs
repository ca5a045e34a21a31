//! Integer and float formatting straight into the output buffer.
//!
//! Floats are laid out the way most dynamic-language JSON generators print
//! them: plain decimal while the decimal exponent is in `(-4, 16]`, otherwise
//! scientific with a signed, at least two-digit exponent. A whole number always
//! keeps a fractional part (`1.0`, `1.0e+16`) so it decodes as a float again.

use std::io::{self, Write as _};

use num_bigint::BigInt;

use crate::buffer::OutputBuffer;
use crate::error::{Error, Result};
use crate::options::{FloatFormat, NonFinitePolicy};

/// Largest number of significant digits a double ever needs.
const MAX_SIGNIFICANT_DIGITS: u8 = 17;

#[inline]
pub fn write_i64(out: &mut OutputBuffer, value: i64) {
    let mut buf = itoa::Buffer::new();
    out.append_bytes(buf.format(value).as_bytes());
}

#[inline]
pub fn write_u64(out: &mut OutputBuffer, value: u64) {
    let mut buf = itoa::Buffer::new();
    out.append_bytes(buf.format(value).as_bytes());
}

/// Arbitrary-precision fallback; allocates the digit string.
pub fn write_bigint(out: &mut OutputBuffer, value: &BigInt) {
    out.append_bytes(value.to_str_radix(10).as_bytes());
}

/// Appends `value` as a JSON number.
///
/// # Errors
///
/// Returns [`Error::NonFiniteFloat`] for NaN and infinities unless `non_finite`
/// is [`NonFinitePolicy::Null`].
pub fn write_f64(
    out: &mut OutputBuffer,
    value: f64,
    format: FloatFormat,
    non_finite: NonFinitePolicy,
) -> Result<()> {
    if !value.is_finite() {
        return match non_finite {
            NonFinitePolicy::Error => Err(Error::non_finite(value)),
            NonFinitePolicy::Null => {
                out.append_literal("null");
                Ok(())
            }
        };
    }
    if value == 0.0 {
        out.append_literal(if value.is_sign_negative() { "-0.0" } else { "0.0" });
        return Ok(());
    }

    let decimal = match format {
        FloatFormat::Shortest => shortest(value),
        FloatFormat::Fixed(digits) => {
            let precision = usize::from(digits.clamp(1, MAX_SIGNIFICANT_DIGITS)) - 1;
            let mut scratch = [0u8; 40];
            let len = {
                let mut cursor = io::Cursor::new(&mut scratch[..]);
                write!(cursor, "{:.*e}", precision, value).map_err(Error::custom)?;
                cursor.position() as usize
            };
            let text = std::str::from_utf8(&scratch[..len]).map_err(Error::custom)?;
            // Rounding up near f64::MAX can leave the finite range.
            if text.parse::<f64>().map_or(true, f64::is_infinite) {
                shortest(value)
            } else {
                Decimal::parse(text)
            }
        }
    };
    decimal.write(out);
    Ok(())
}

fn shortest(value: f64) -> Decimal {
    let mut buf = ryu::Buffer::new();
    Decimal::parse(buf.format_finite(value))
}

/// A finite, non-zero float as `0.DIGITS * 10^point`.
struct Decimal {
    negative: bool,
    digits: [u8; 24],
    len: usize,
    point: i32,
}

impl Decimal {
    /// Reads the output of ryu or of `{:e}`: an optional sign, a mantissa with
    /// an optional `.`, and an optional `e` exponent.
    fn parse(text: &str) -> Decimal {
        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(idx) => {
                // Both producers always emit a well-formed exponent.
                let exponent = text[idx + 1..].parse::<i32>();
                debug_assert!(exponent.is_ok(), "malformed exponent in {text:?}");
                (&text[..idx], exponent.unwrap_or(0))
            }
            None => (text, 0),
        };

        let mut decimal = Decimal {
            negative,
            digits: [0u8; 24],
            len: 0,
            point: 0,
        };
        let mut int_len = 0i32;
        let mut leading_zeros = 0i32;
        let mut in_fraction = false;
        for &b in mantissa.as_bytes() {
            if b == b'.' {
                in_fraction = true;
                continue;
            }
            if !in_fraction {
                int_len += 1;
            }
            if decimal.len == 0 && b == b'0' {
                leading_zeros += 1;
                continue;
            }
            if decimal.len < decimal.digits.len() {
                decimal.digits[decimal.len] = b;
                decimal.len += 1;
            }
        }
        while decimal.len > 1 && decimal.digits[decimal.len - 1] == b'0' {
            decimal.len -= 1;
        }
        decimal.point = int_len - leading_zeros + exponent;
        decimal
    }

    fn write(&self, out: &mut OutputBuffer) {
        let digits = &self.digits[..self.len];
        out.reserve(self.len + 24);
        if self.negative {
            out.push(b'-');
        }

        if self.point > -4 && self.point <= 16 {
            if self.point <= 0 {
                out.append_literal("0.");
                for _ in 0..-self.point {
                    out.push(b'0');
                }
                out.append_bytes(digits);
            } else {
                let point = self.point as usize;
                if point >= digits.len() {
                    out.append_bytes(digits);
                    for _ in digits.len()..point {
                        out.push(b'0');
                    }
                    out.append_literal(".0");
                } else {
                    out.append_bytes(&digits[..point]);
                    out.push(b'.');
                    out.append_bytes(&digits[point..]);
                }
            }
            return;
        }

        out.append_bytes(&digits[..1]);
        out.push(b'.');
        if digits.len() > 1 {
            out.append_bytes(&digits[1..]);
        } else {
            out.push(b'0');
        }
        let exponent = self.point - 1;
        out.push(b'e');
        out.push(if exponent < 0 { b'-' } else { b'+' });
        let magnitude = exponent.unsigned_abs();
        if magnitude < 10 {
            out.push(b'0');
        }
        let mut buf = itoa::Buffer::new();
        out.append_bytes(buf.format(magnitude).as_bytes());
    }
}
