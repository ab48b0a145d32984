//! Hash related utils.

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha512;

/// Lowercase hex encoded HMAC with SHA512 hash.
pub fn hex_hmac_sha512(key: &[u8], content: &[u8]) -> String {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha512>::new_from_slice(key).unwrap();
    h.update(content);

    hex::encode(h.finalize().into_bytes())
}
