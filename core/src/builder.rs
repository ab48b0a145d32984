use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use http::Method;

use crate::time::{format_rfc3339, now, DateTime};
use crate::{LogicalRequest, Query, Result, Signer};

/// Media type of every request body.
pub const APPLICATION_JSON: &str = "application/json";

/// Where requests are sent: `{scheme}://{host}/{version}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// `https` unless talking to a local test server.
    pub scheme: String,
    /// Host, optionally with port.
    pub host: String,
    /// Path prefix such as `v1`.
    pub version: String,
}

impl Endpoint {
    /// Create an https endpoint.
    pub fn new(host: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            scheme: "https".to_string(),
            host: host.into(),
            version: version.into(),
        }
    }

    /// Replace the scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }
}

/// A request carrying `key`, `timestamp` and `sign`.
#[derive(Clone, Debug)]
pub struct SignedRequest {
    /// HTTP method.
    pub method: Method,
    /// Full url, `sign` included.
    pub url: String,
    /// The exact bytes that were signed: `/{version}{path}?{query}`.
    pub signed_path: String,
    /// Hex signature appended to the url.
    pub sign: String,
    /// Request body, possibly empty.
    pub body: Bytes,
}

impl SignedRequest {
    /// Convert into an `http::Request`.
    ///
    /// `Content-Type` is always `application/json` and `Content-Length` always
    /// matches the body, `0` for an empty one.
    pub fn into_http(self) -> Result<http::Request<Bytes>> {
        let req = http::Request::builder()
            .method(self.method)
            .uri(self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
            .header(CONTENT_LENGTH, HeaderValue::from(self.body.len()))
            .body(self.body)?;
        Ok(req)
    }
}

/// RequestBuilder turns a [`LogicalRequest`] into a [`SignedRequest`].
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    signer: Signer,
    endpoint: Endpoint,
    time: Option<DateTime>,
}

impl RequestBuilder {
    /// Create a builder.
    pub fn new(signer: Signer, endpoint: Endpoint) -> Self {
        Self {
            signer,
            endpoint,
            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// The endpoint requests are built for.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Add the credential and timestamp, sign, then append the signature.
    ///
    /// The caller's query is consumed together with the request and never
    /// shared, so adding `key`/`timestamp` cannot leak into other calls.
    pub fn build(&self, req: LogicalRequest) -> Result<SignedRequest> {
        let LogicalRequest {
            method,
            path,
            mut query,
            body,
        } = req;

        let timestamp = format_rfc3339(self.time.unwrap_or_else(now));
        query.push("key", self.signer.credential().key());
        query.push("timestamp", timestamp);

        let signed_path = compose_path(&self.endpoint.version, &path, &query);
        let sign = self.signer.sign(&method, &signed_path, &body);

        let url = format!(
            "{}://{}{}&sign={}",
            self.endpoint.scheme, self.endpoint.host, signed_path, sign
        );

        Ok(SignedRequest {
            method,
            url,
            signed_path,
            sign,
            body,
        })
    }
}

fn compose_path(version: &str, path: &str, query: &Query) -> String {
    format!("/{version}{path}?{}", query.encode())
}
