//! JSON string literal formatting.
//!
//! The scanner classifies bytes through a 256-entry table and copies runs of
//! bytes that need no escaping in one `extend_from_slice`, so mostly-ASCII and
//! mostly-multibyte text both stay on the bulk path. Which classes stop the
//! scan depends on the [`EscapeMode`].

use crate::buffer::OutputBuffer;
use crate::error::{Error, Result};
use crate::options::EscapeMode;

/// `"`, `\` and U+0000..U+001F: escaped in every mode.
const MANDATORY: u8 = 1;
/// `<`, `>` and `&`.
const HTML: u8 = 2;
/// Any byte of a multibyte sequence.
const NON_ASCII: u8 = 4;
/// 0xE2, the lead byte of U+2028 and U+2029.
const LINE_SEP_LEAD: u8 = 8;

static CLASS: [u8; 256] = build_class_table();

const fn build_class_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut class = 0;
        if i < 0x20 || i == b'"' as usize || i == b'\\' as usize {
            class |= MANDATORY;
        }
        if i == b'<' as usize || i == b'>' as usize || i == b'&' as usize {
            class |= HTML;
        }
        if i >= 0x80 {
            class |= NON_ASCII;
        }
        if i == 0xE2 {
            class |= LINE_SEP_LEAD;
        }
        table[i] = class;
        i += 1;
    }
    table
}

#[inline]
const fn stop_mask(mode: EscapeMode) -> u8 {
    match mode {
        EscapeMode::Minimal => MANDATORY,
        EscapeMode::AsciiOnly => MANDATORY | NON_ASCII,
        EscapeMode::HtmlSafe => MANDATORY | HTML | LINE_SEP_LEAD,
    }
}

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Strings up to this length get their worst-case escaped size reserved.
const EXACT_RESERVE_LIMIT: usize = 4096;

/// Appends `s` as a quoted JSON string literal.
pub fn write_str(out: &mut OutputBuffer, s: &str, mode: EscapeMode) {
    let bytes = s.as_bytes();
    if bytes.len() <= EXACT_RESERVE_LIMIT {
        // Six output bytes per input byte covers `\u00XX` for every byte.
        out.reserve(bytes.len() * 6 + 2);
    } else {
        out.reserve(bytes.len() + 2);
    }
    out.push(b'"');

    let mask = stop_mask(mode);
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if CLASS[byte as usize] & mask == 0 {
            i += 1;
            continue;
        }

        if byte < 0x80 {
            out.append_bytes(&bytes[start..i]);
            write_ascii_escape(out, byte);
            i += 1;
            start = i;
            continue;
        }

        // `i` sits on a lead byte: the scan only ever stops on one, and
        // escaped characters are skipped whole.
        if mode == EscapeMode::HtmlSafe {
            let is_separator = bytes.len() >= i + 3
                && bytes[i + 1] == 0x80
                && (bytes[i + 2] == 0xA8 || bytes[i + 2] == 0xA9);
            if is_separator {
                out.append_bytes(&bytes[start..i]);
                let unit = if bytes[i + 2] == 0xA8 { 0x2028 } else { 0x2029 };
                write_unicode_escape(out, unit);
                i += 3;
                start = i;
            } else {
                i += 1;
            }
            continue;
        }

        // AsciiOnly
        let Some(ch) = s[i..].chars().next() else {
            break;
        };
        out.append_bytes(&bytes[start..i]);
        write_char_escape(out, ch);
        i += ch.len_utf8();
        start = i;
    }

    out.append_bytes(&bytes[start..]);
    out.push(b'"');
}

/// Validates `bytes` as UTF-8 and appends them as a quoted JSON string literal.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] with the offset of the first byte that
/// is not part of a valid sequence. Nothing is written in that case.
pub fn write_bytes(out: &mut OutputBuffer, bytes: &[u8], mode: EscapeMode) -> Result<()> {
    let s = std::str::from_utf8(bytes).map_err(|e| Error::invalid_encoding(e.valid_up_to()))?;
    write_str(out, s, mode);
    Ok(())
}

#[inline]
fn write_ascii_escape(out: &mut OutputBuffer, byte: u8) {
    match byte {
        b'"' => out.append_literal("\\\""),
        b'\\' => out.append_literal("\\\\"),
        b'\n' => out.append_literal("\\n"),
        b'\r' => out.append_literal("\\r"),
        b'\t' => out.append_literal("\\t"),
        0x08 => out.append_literal("\\b"),
        0x0C => out.append_literal("\\f"),
        _ => write_unicode_escape(out, u32::from(byte)),
    }
}

fn write_char_escape(out: &mut OutputBuffer, ch: char) {
    let mut units = [0u16; 2];
    for unit in ch.encode_utf16(&mut units) {
        write_unicode_escape(out, u32::from(*unit));
    }
}

#[inline]
fn write_unicode_escape(out: &mut OutputBuffer, unit: u32) {
    out.append_bytes(&[
        b'\\',
        b'u',
        HEX[((unit >> 12) & 0xF) as usize],
        HEX[((unit >> 8) & 0xF) as usize],
        HEX[((unit >> 4) & 0xF) as usize],
        HEX[(unit & 0xF) as usize],
    ]);
}
