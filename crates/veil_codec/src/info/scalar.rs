use serde_json::Value;

use crate::Facet;
use crate::error::CodecError;

// -----------------------------------------------------------------------------
// ScalarConverter

/// Writes a scalar value as a JSON token.
pub type ScalarWriteFn = fn(&dyn Facet) -> Result<String, CodecError>;

/// Reads a scalar value out of a parsed JSON node.
pub type ScalarReadFn = fn(&Value) -> Result<Box<dyn Facet>, CodecError>;

/// Produces the scalar's default value, used for absent constructor
/// arguments.
pub type ScalarDefaultFn = fn() -> Box<dyn Facet>;

/// Converts one scalar type to and from its textual representation.
///
/// Converters are the terminal leaves of the serializer graph. The
/// built-in primitives register one each (see [`crate::impls`]); extra
/// scalar types are attached per configuration via
/// [`Config::builder`](crate::config::Config::builder).
pub struct ScalarConverter {
    write: ScalarWriteFn,
    read: ScalarReadFn,
    default: ScalarDefaultFn,
}

impl ScalarConverter {
    /// Creates a converter from its three conversion functions.
    pub const fn new(write: ScalarWriteFn, read: ScalarReadFn, default: ScalarDefaultFn) -> Self {
        Self {
            write,
            read,
            default,
        }
    }

    /// Writes `value` as a single JSON token.
    #[inline]
    pub fn write(&self, value: &dyn Facet) -> Result<String, CodecError> {
        (self.write)(value)
    }

    /// Reads a value from a parsed JSON node.
    #[inline]
    pub fn read(&self, value: &Value) -> Result<Box<dyn Facet>, CodecError> {
        (self.read)(value)
    }

    /// Returns the scalar's default value.
    #[inline]
    pub fn default_value(&self) -> Box<dyn Facet> {
        (self.default)()
    }
}

impl core::fmt::Debug for ScalarConverter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ScalarConverter")
    }
}

// -----------------------------------------------------------------------------
// Token helpers

/// Escapes `text` as a JSON string token, quotes included.
pub(crate) fn escape_str(text: &str) -> String {
    Value::String(text.to_owned()).to_string()
}

/// Masks a scalar JSON token for redacted output.
///
/// Letters become `X` and digits become `1`, so the masked token keeps
/// its shape: a masked number is still a number, a masked string is
/// still a string. Keyword tokens (`true`, `false`, `null`) and strings
/// containing escapes collapse to the opaque string `"XXXXXX"`.
pub(crate) fn mask_token(token: &str) -> String {
    if let Some(inner) = token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        if inner.contains('\\') {
            return String::from("\"XXXXXX\"");
        }
        let mut masked = String::with_capacity(token.len());
        masked.push('"');
        masked.extend(inner.chars().map(mask_char));
        masked.push('"');
        return masked;
    }

    if token.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        return token
            .chars()
            .map(|c| if c.is_ascii_digit() { '1' } else { c })
            .collect();
    }

    String::from("\"XXXXXX\"")
}

fn mask_char(c: char) -> char {
    if c.is_ascii_digit() {
        '1'
    } else if c.is_alphabetic() {
        'X'
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_strings_in_place() {
        assert_eq!(mask_token(r#""abc-123""#), r#""XXX-111""#);
    }

    #[test]
    fn masked_numbers_stay_numbers() {
        assert_eq!(mask_token("123.45"), "111.11");
        assert_eq!(mask_token("-2e8"), "-1e1");
    }

    #[test]
    fn keywords_collapse() {
        assert_eq!(mask_token("true"), r#""XXXXXX""#);
        assert_eq!(mask_token("null"), r#""XXXXXX""#);
    }

    #[test]
    fn escaped_strings_collapse() {
        assert_eq!(mask_token(r#""a\"b""#), r#""XXXXXX""#);
    }

    #[test]
    fn escape_str_quotes() {
        assert_eq!(escape_str("abc"), r#""abc""#);
        assert_eq!(escape_str("a\"b"), r#""a\"b""#);
    }
}
