use bytes::Bytes;
use http::StatusCode;
use log::debug;
use luno_core::time::DateTime;
use luno_core::{
    decode, expect_status, Context, Diagnostics, LogicalRequest, RequestBuilder, Result, Signer,
};
use serde::de::DeserializeOwned;

use crate::{
    AccountClient, AnalyticsClient, ApiAuthClient, Config, EventsClient, SessionsClient,
    UsersClient,
};

/// Client talks to the Luno API.
///
/// Every call is one signed request and one awaited response: nothing is
/// retried or cached. A client holds no mutable state, share it freely.
#[derive(Clone, Debug)]
pub struct Client {
    ctx: Context,
    builder: RequestBuilder,
    diagnostics: Diagnostics,
}

impl Client {
    /// Create a client from `config`, sending requests through `ctx`.
    ///
    /// Fails with [`ErrorKind::ConfigInvalid`](luno_core::ErrorKind::ConfigInvalid)
    /// if the api key or secret key is missing.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let builder = RequestBuilder::new(Signer::new(config.credential()?), config.endpoint());
        debug!("luno client created for endpoint {:?}", builder.endpoint());

        Ok(Self {
            ctx,
            builder,
            diagnostics: config.diagnostics,
        })
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.builder = self.builder.with_time(time);
        self
    }

    /// Sign and send `req`, returning the raw response.
    pub async fn send(&self, req: LogicalRequest) -> Result<http::Response<Bytes>> {
        let signed = self.builder.build(req)?;
        self.diagnostics.request(&signed);

        let resp = self.ctx.http_send(signed.into_http()?).await?;
        self.diagnostics.response(&resp);
        Ok(resp)
    }

    /// Send `req` and decode a `T` from an `expected` response.
    pub async fn call<T: DeserializeOwned>(
        &self,
        req: LogicalRequest,
        expected: StatusCode,
    ) -> Result<T> {
        decode(self.send(req).await?, expected)
    }

    /// Send `req` and check for an `expected` response, dropping its body.
    pub async fn call_empty(&self, req: LogicalRequest, expected: StatusCode) -> Result<()> {
        expect_status(self.send(req).await?, expected)
    }

    /// Users of the project.
    pub fn users(&self) -> UsersClient<'_> {
        UsersClient::new(self)
    }

    /// Sessions of users.
    pub fn sessions(&self) -> SessionsClient<'_> {
        SessionsClient::new(self)
    }

    /// Events recorded for users.
    pub fn events(&self) -> EventsClient<'_> {
        EventsClient::new(self)
    }

    /// API key pairs.
    pub fn api_auth(&self) -> ApiAuthClient<'_> {
        ApiAuthClient::new(self)
    }

    /// The account owning the project.
    pub fn account(&self) -> AccountClient<'_> {
        AccountClient::new(self)
    }

    /// Aggregated statistics.
    pub fn analytics(&self) -> AnalyticsClient<'_> {
        AnalyticsClient::new(self)
    }
}
