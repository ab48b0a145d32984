use http::Method;
use log::debug;

use crate::hash::hex_hmac_sha512;
use crate::Credential;

/// Signer computes the request signature for a credential.
///
/// ## Format
///
/// ```text
/// METHOD + ":" + PathWithQuery [ + ":" + Body ]
/// ```
///
/// The body part is present only for a non-empty body. The message is signed
/// with HMAC-SHA512 keyed by the secret and sent as lowercase hex in the `sign`
/// query parameter, appended after signing.
#[derive(Clone, Debug)]
pub struct Signer {
    credential: Credential,
}

impl Signer {
    /// Create a signer for `credential`.
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// The credential used for signing.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Sign `method`, `path_with_query` and `body`.
    ///
    /// `path_with_query` must already contain `key` and `timestamp` and must
    /// not contain `sign`.
    pub fn sign(&self, method: &Method, path_with_query: &str, body: &[u8]) -> String {
        let msg = string_to_sign(method, path_with_query, body);
        debug!(
            "signing {method} {path_with_query} with {} body bytes",
            body.len()
        );

        hex_hmac_sha512(self.credential.secret(), &msg)
    }
}

/// Construct the message covered by the signature.
pub fn string_to_sign(method: &Method, path_with_query: &str, body: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(method.as_str().len() + path_with_query.len() + body.len() + 2);
    msg.extend_from_slice(method.as_str().as_bytes());
    msg.push(b':');
    msg.extend_from_slice(path_with_query.as_bytes());
    if !body.is_empty() {
        msg.push(b':');
        msg.extend_from_slice(body);
    }
    msg
}
