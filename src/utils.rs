//! Utility functions for UTF-16LE string conversion and environment expansion.

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::UTF_16LE;

/// Registry path separator.
pub const PATH_SEPARATOR: char = '\\';

/// Decodes UTF-16LE bytes into a string, stripping exactly one trailing NUL.
///
/// Registry strings are usually, but not always, NUL-terminated; a missing
/// terminator is not an error. A dangling odd byte is ignored and unpaired
/// surrogates decode to U+FFFD.
pub fn decode_utf16le(data: &[u8]) -> String {
    let even = &data[..data.len() - data.len() % 2];
    let (decoded, _had_errors) = UTF_16LE.decode_without_bom_handling(even);

    let mut s = decoded.into_owned();
    if s.ends_with('\0') {
        s.pop();
    }
    s
}

/// Encodes a string as UTF-16LE code units, without a terminator.
pub fn encode_utf16le(s: &str) -> Vec<u8> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let mut out = vec![0u8; units.len() * 2];
    LittleEndian::write_u16_into(&units, &mut out);
    out
}

/// Substitutes every `%NAME%` token with the current value of the
/// environment variable `NAME`.
///
/// Tokens naming an undefined variable are left verbatim.
pub fn expand_environment_strings(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Expands `%NAME%` tokens using `lookup`.
///
/// A token is a `%`, one or more non-`%` characters, and a closing `%`.
/// Scanning resumes after the closing `%` whether or not the name resolved,
/// so `%A%B%` only ever considers `A`.
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find('%') {
            // "%%" is not a token; the second '%' may open one
            Some(0) => {
                out.push('%');
                rest = after;
            }
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
