use bytes::Bytes;
use http::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::{Error, Result};

/// AsciiSet for one path segment.
///
/// Everything except the unreserved characters and `:`, `@`, `+` is encoded,
/// so `email:bozo@clown.com` lookups pass through while `/`, `?`, `#`, `%`
/// and braces cannot change how the url is parsed.
pub static PATH_SEGMENT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'@')
    .remove(b'+');

/// Encode `segment` so it is sent exactly as it was signed.
///
/// `.` and `..` are rejected: url normalization would remove them from the
/// path, encoded or not.
pub fn encode_path_segment(segment: &str) -> Result<String> {
    if matches!(segment, "" | "." | "..") {
        return Err(Error::request_invalid(format!(
            "path segment {segment:?} cannot address a resource"
        )));
    }
    Ok(utf8_percent_encode(segment, &PATH_SEGMENT_ENCODE_SET).to_string())
}

/// Query parameters of a request.
///
/// A multimap: the same key may appear more than once (`expand`, `days`).
/// [`Query::encode`] does not depend on the order pairs were pushed in, so
/// two queries holding the same pairs always encode to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new query pair.
    #[inline]
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Push a new query pair, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Push `true` or `false`.
    #[inline]
    pub fn push_bool(&mut self, key: impl Into<String>, value: bool) {
        self.push(key, if value { "true" } else { "false" });
    }

    /// Push the pair only when `value` is not empty.
    #[inline]
    pub fn push_non_empty(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.push(key, value);
        }
    }

    /// Push `key=value` once for every value.
    pub fn push_repeated<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for v in values {
            self.push(key, v);
        }
    }

    /// Move every pair of `other` into this query.
    pub fn merge(&mut self, other: Query) {
        self.pairs.extend(other.pairs);
    }

    /// Get the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get every value for `key` in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the query holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode as `application/x-www-form-urlencoded`, pairs sorted by key then value.
    ///
    /// ```text
    /// [(timestamp, t), (key, k), (expand, user)] => "expand=user&key=k&timestamp=t"
    /// ```
    pub fn encode(&self) -> String {
        let mut pairs: Vec<&(String, String)> = self.pairs.iter().collect();
        pairs.sort();

        let mut s = form_urlencoded::Serializer::new(String::with_capacity(64));
        for (k, v) in pairs {
            s.append_pair(k, v);
        }
        s.finish()
    }

    /// Parse an encoded query string.
    pub fn parse(query: &str) -> Self {
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A request before authentication: what to call, not how it is signed.
#[derive(Debug, Clone)]
pub struct LogicalRequest {
    /// HTTP method.
    pub method: Method,
    /// Path below the version prefix, starting with `/`.
    pub path: String,
    /// Caller supplied query parameters.
    pub query: Query,
    /// Request body, possibly empty.
    pub body: Bytes,
}

impl LogicalRequest {
    /// Create a request without query or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: Bytes::new(),
        }
    }

    /// Set the query parameters.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Set a raw body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the JSON body.
    ///
    /// A value that cannot be serialized fails the request before anything is
    /// signed or sent.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value).map_err(|e| {
            Error::request_invalid(format!("encode {} {} body", self.method, self.path))
                .with_source(e)
        })?;
        Ok(self.with_body(body))
    }
}
