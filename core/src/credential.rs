use std::fmt::{Debug, Formatter};

use crate::utils::Redact;

/// Credential is the API key pair used to authenticate every request.
///
/// The key is sent in clear as the `key` query parameter. The secret never
/// leaves the process: only HMAC output derived from it is sent.
#[derive(Clone)]
pub struct Credential {
    key: String,
    secret: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// The public API key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    /// Check if both halves are present.
    pub fn is_valid(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("key", &Redact::from(&self.key))
            .field("secret", &Redact::from(&self.secret))
            .finish()
    }
}
