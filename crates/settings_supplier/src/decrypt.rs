//! Credential decryption.
//!
//! Server passwords, server passphrases and proxy passwords may be stored in
//! the encrypted form `{...}`. Before translation, the [`SettingsDecrypter`]
//! hands each encrypted value to an injected [`SecretDecryptor`] and replaces
//! it with the plaintext. Plain values are left untouched.

use crate::raw::RawSettings;
use crate::{SettingsError, SettingsResult};
use thiserror::Error;
use tracing::debug;

/// Error raised by a [`SecretDecryptor`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct DecryptionError {
    pub reason: String,
}

impl DecryptionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Turns an encrypted settings value into plaintext.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait SecretDecryptor: Send + Sync {
    /// Decrypts `ciphertext`, which still carries its `{` `}` delimiters.
    ///
    /// # Errors
    ///
    /// Returns `DecryptionError` if the value cannot be decrypted.
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptionError>;
}

/// Decryptor returning every value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughDecryptor;

impl SecretDecryptor for PassthroughDecryptor {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptionError> {
        Ok(ciphertext.to_string())
    }
}

/// Returns `true` for values in the encrypted `{...}` form.
pub fn is_encrypted(value: &str) -> bool {
    let value = value.trim();
    value.len() > 2 && value.starts_with('{') && value.ends_with('}')
}

/// Applies a [`SecretDecryptor`] to the credential fields of a raw document.
pub struct SettingsDecrypter<'a> {
    decryptor: &'a dyn SecretDecryptor,
}

impl<'a> SettingsDecrypter<'a> {
    pub fn new(decryptor: &'a dyn SecretDecryptor) -> Self {
        Self { decryptor }
    }

    /// Returns `raw` with every encrypted credential replaced by plaintext.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::DecryptionFailed` naming the first field that
    /// could not be decrypted.
    pub fn decrypt(&self, mut raw: RawSettings) -> SettingsResult<RawSettings> {
        for server in &mut raw.servers {
            self.decrypt_field(&mut server.password, || {
                format!("password of server '{}'", server.id)
            })?;
            self.decrypt_field(&mut server.passphrase, || {
                format!("passphrase of server '{}'", server.id)
            })?;
        }
        for proxy in &mut raw.proxies {
            self.decrypt_field(&mut proxy.password, || {
                format!("password of proxy '{}'", proxy.id)
            })?;
        }
        Ok(raw)
    }

    fn decrypt_field(
        &self,
        value: &mut Option<String>,
        field: impl Fn() -> String,
    ) -> SettingsResult<()> {
        let Some(current) = value.as_deref().filter(|v| is_encrypted(v)) else {
            return Ok(());
        };

        let plaintext =
            self.decryptor
                .decrypt(current.trim())
                .map_err(|e| SettingsError::DecryptionFailed {
                    field: field(),
                    reason: e.reason,
                })?;
        // Never log the value itself.
        debug!("Decrypted {}", field());
        *value = Some(plaintext);
        Ok(())
    }
}

#[cfg(test)]
#[path = "decrypt_tests.rs"]
mod tests;
