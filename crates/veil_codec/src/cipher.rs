//! The pluggable cipher boundary.
//!
//! The codec never interprets ciphertext; it only requires that
//! [`Cipher::encrypt`] produce text that survives embedding in a JSON
//! string literal, which the decode path hands back to
//! [`Cipher::decrypt`] unchanged.

use core::{error, fmt};
use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::CodecError;

// -----------------------------------------------------------------------------
// Cipher

/// A reversible text transformation applied to encrypted subtrees.
pub trait Cipher: Send + Sync {
    /// Transforms plaintext into ciphertext.
    fn encrypt(&self, plaintext: &str) -> String;

    /// Transforms ciphertext back into plaintext.
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

/// A decrypt-side failure reported by a [`Cipher`].
#[derive(Debug, Clone)]
pub struct CipherError {
    detail: Cow<'static, str>,
}

impl CipherError {
    /// Creates an error from a detail message.
    pub fn new(detail: impl Into<Cow<'static, str>>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}

impl error::Error for CipherError {}

impl From<CipherError> for CodecError {
    fn from(value: CipherError) -> Self {
        Self::Cipher {
            detail: value.detail,
        }
    }
}

// -----------------------------------------------------------------------------
// Base64Cipher

/// A cipher that base64-encodes the plaintext.
///
/// Not confidentiality, only the container behavior: useful in tests and
/// as the reference for what a real cipher must guarantee (ciphertext is
/// plain ASCII, safe inside a JSON string).
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Cipher;

impl Cipher for Base64Cipher {
    fn encrypt(&self, plaintext: &str) -> String {
        STANDARD.encode(plaintext.as_bytes())
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let bytes = STANDARD
            .decode(ciphertext)
            .map_err(|e| CipherError::new(format!("invalid base64 ciphertext: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|_| CipherError::new("ciphertext did not decode to utf-8 text"))
    }
}
