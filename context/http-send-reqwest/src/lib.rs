//! [`HttpSend`] implementation backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use luno_core::HttpSend;
use reqwest::{Client, Request};

/// Deadline applied to every request unless a custom client is supplied.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// ReqwestHttpSend sends requests through a pooled `reqwest::Client`.
///
/// One call is one exchange: no retries, no redirect-driven resends of the
/// signed url. A timeout surfaces as a transport error.
#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl Default for ReqwestHttpSend {
    /// A client with [`DEFAULT_TIMEOUT`] that does not follow redirects.
    fn default() -> Self {
        // SAFETY: builder only fails when the TLS backend cannot initialize,
        // the same condition under which `reqwest::Client::new` panics.
        Self::with_timeout(DEFAULT_TIMEOUT).expect("reqwest client must build")
    }
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a client with a fixed per-request deadline.
    ///
    /// Redirects are not followed, a redirect response is returned as is.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        debug!("build reqwest client with timeout {timeout:?}");
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> anyhow::Result<http::Response<Bytes>> {
        let req = Request::try_from(req)?;
        let resp = self.client.execute(req).await?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        let mut builder = http::Response::builder().status(status);
        if let Some(h) = builder.headers_mut() {
            *h = headers;
        }
        Ok(builder.body(body)?)
    }
}
