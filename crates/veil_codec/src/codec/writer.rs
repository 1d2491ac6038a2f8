use crate::cipher::Cipher;
use crate::error::CodecError;
use crate::info::escape_str;

// -----------------------------------------------------------------------------
// JsonWriter

/// Compact JSON output with an encryption scope.
///
/// While a scope is open, tokens collect in a side buffer; closing the
/// scope ciphers the buffered text and emits it as a single string token.
/// Scopes never nest: a marker reached inside an open scope is ignored,
/// so nested markers cipher once, at the outermost one.
pub(crate) struct JsonWriter<'c> {
    out: String,
    buf: String,
    encrypting: bool,
    cipher: Option<&'c dyn Cipher>,
}

impl<'c> JsonWriter<'c> {
    pub(crate) fn new(cipher: Option<&'c dyn Cipher>) -> Self {
        Self {
            out: String::new(),
            buf: String::new(),
            encrypting: false,
            cipher,
        }
    }

    /// Appends raw token text to the active sink.
    #[inline]
    pub(crate) fn push(&mut self, token: &str) {
        if self.encrypting {
            self.buf.push_str(token);
        } else {
            self.out.push_str(token);
        }
    }

    /// Opens an encryption scope if `flagged` and none is already open.
    ///
    /// Returns whether a scope was actually opened; the caller must hand
    /// that flag back to [`exit_encryption`](Self::exit_encryption) or
    /// [`abort_encryption`](Self::abort_encryption).
    pub(crate) fn enter_encryption(
        &mut self,
        flagged: bool,
        at: &'static str,
    ) -> Result<bool, CodecError> {
        if !flagged || self.encrypting {
            return Ok(false);
        }
        if self.cipher.is_none() {
            return Err(CodecError::NoCipher {
                at: std::borrow::Cow::Borrowed(at),
            });
        }
        self.encrypting = true;
        Ok(true)
    }

    /// Closes the scope opened by a matching `enter_encryption`.
    pub(crate) fn exit_encryption(&mut self, entered: bool) -> Result<(), CodecError> {
        if !entered {
            return Ok(());
        }
        // enter_encryption checked the cipher when it opened the scope.
        let Some(cipher) = self.cipher else {
            return Err(CodecError::NoCipher {
                at: std::borrow::Cow::Borrowed("scope"),
            });
        };
        let ciphertext = cipher.encrypt(&self.buf);
        self.buf.clear();
        self.encrypting = false;
        let token = escape_str(&ciphertext);
        self.out.push_str(&token);
        Ok(())
    }

    /// Discards a scope after a failure inside it.
    pub(crate) fn abort_encryption(&mut self, entered: bool) {
        if entered {
            self.buf.clear();
            self.encrypting = false;
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}
