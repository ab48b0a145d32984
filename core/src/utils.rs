//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a secret for debug output.
///
/// - Empty input renders as `EMPTY`.
/// - Input shorter than 12 characters is entirely redacted.
/// - Longer input keeps its first four characters so that differently
///   prefixed keys (`key_`, `sec_`) stay distinguishable.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.char_indices().nth(4) {
            _ if self.0.is_empty() => f.write_str("EMPTY"),
            Some((idx, _)) if self.0.chars().count() >= 12 => {
                f.write_str(&self.0[..idx])?;
                f.write_str("***")
            }
            _ => f.write_str("***"),
        }
    }
}
