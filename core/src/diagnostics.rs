//! Opt-in request/response logging.

use bytes::Bytes;
use log::info;

use crate::SignedRequest;

const TARGET: &str = "luno::diagnostics";

/// Diagnostics decides which request/response details get logged.
///
/// Everything is off by default. Each switch is independent. Enabled events
/// go to the `log` facade at `info` level with target `luno::diagnostics`.
///
/// URLs and bodies may contain personal data such as emails or passwords,
/// only turn these on where such logs are acceptable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Log `METHOD url` of every request.
    pub log_request_url: bool,
    /// Log every non-empty request body.
    pub log_request_body: bool,
    /// Log the status code of every response.
    pub log_response_status: bool,
    /// Log every response body.
    pub log_response_body: bool,
}

impl Diagnostics {
    /// Everything enabled.
    pub fn all() -> Self {
        Self {
            log_request_url: true,
            log_request_body: true,
            log_response_status: true,
            log_response_body: true,
        }
    }

    /// Log the parts of `req` that are enabled.
    pub fn request(&self, req: &SignedRequest) {
        if self.log_request_url {
            info!(target: TARGET, "{} request: {}", req.method, req.url);
        }
        if self.log_request_body && !req.body.is_empty() {
            info!(target: TARGET, "{}", String::from_utf8_lossy(&req.body));
        }
    }

    /// Log the parts of `resp` that are enabled.
    pub fn response(&self, resp: &http::Response<Bytes>) {
        if self.log_response_status {
            info!(target: TARGET, "response {}", resp.status().as_u16());
        }
        if self.log_response_body {
            info!(target: TARGET, "{}", String::from_utf8_lossy(resp.body()));
        }
    }
}
