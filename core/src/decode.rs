//! Status based response decoding.

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::{Error, Result, ServiceError};

/// Decode a response into `T`.
///
/// - `expected` status: the body must be JSON for `T`, anything else is a
///   decode error.
/// - any other status: the body must be a [`ServiceError`], returned as an
///   [`ErrorKind::Service`](crate::ErrorKind::Service) error; a body that is
///   not one is a decode error.
///
/// Only the status code is inspected, never headers.
pub fn decode<T: DeserializeOwned>(resp: http::Response<Bytes>, expected: StatusCode) -> Result<T> {
    let status = resp.status();
    if status != expected {
        return Err(decode_error(resp));
    }

    serde_json::from_slice(resp.body()).map_err(|e| {
        Error::decode(format!(
            "parse {} response body as {}: {e}",
            status.as_u16(),
            std::any::type_name::<T>()
        ))
        .with_source(e)
    })
}

/// Check a response for `expected` status, ignoring the success body.
///
/// Used by operations whose success carries no payload, such as update and
/// delete.
pub fn expect_status(resp: http::Response<Bytes>, expected: StatusCode) -> Result<()> {
    if resp.status() == expected {
        Ok(())
    } else {
        Err(decode_error(resp))
    }
}

/// Decode a non-success response body into an error.
pub fn decode_error(resp: http::Response<Bytes>) -> Error {
    let status = resp.status();
    match serde_json::from_slice::<ServiceError>(resp.body()) {
        Ok(err) => Error::service(err),
        Err(e) => Error::decode(format!(
            "parse {} response body as service error: {e}",
            status.as_u16()
        ))
        .with_source(e),
    }
}
