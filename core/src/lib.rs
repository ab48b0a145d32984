//! Core components for talking to the Luno API.
//!
//! This crate holds everything that must be bit-exact with the service: how a
//! request is authenticated, and how responses are routed into values or
//! errors. Resource types and their clients live in the `luno` crate.
//!
//! ## Overview
//!
//! - [`Signer`]: HMAC-SHA512 over `METHOD:path?query[:body]`, hex encoded.
//! - [`RequestBuilder`]: adds `key` and `timestamp`, signs, appends `sign`.
//! - [`decode()`]: routes a response by status into `T` or an [`Error`].
//! - [`Context`]: the transport ([`HttpSend`]) and environment ([`Env`]) a
//!   client runs with.
//! - [`UpdatePayload`]: merge vs overwrite projection over an opaque
//!   [`Document`].
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use luno_core::{Credential, Endpoint, LogicalRequest, Query, RequestBuilder, Signer};
//!
//! # fn main() -> luno_core::Result<()> {
//! let builder = RequestBuilder::new(
//!     Signer::new(Credential::new("key_abc", "secret")),
//!     Endpoint::new("api.luno.io", "v1"),
//! );
//!
//! let req = LogicalRequest::new(Method::GET, "/users").with_query(Query::new().with("limit", "10"));
//! let signed = builder.build(req)?;
//! assert!(signed.url.contains("&sign="));
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{codes, Error, ErrorKind, Result, ServiceError};
mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};
mod credential;
pub use credential::Credential;
mod request;
pub use request::{encode_path_segment, LogicalRequest, Query, PATH_SEGMENT_ENCODE_SET};
mod signer;
pub use signer::{string_to_sign, Signer};
mod builder;
pub use builder::{Endpoint, RequestBuilder, SignedRequest, APPLICATION_JSON};
mod diagnostics;
pub use diagnostics::Diagnostics;
mod decode;
pub use decode::{decode, decode_error, expect_status};
mod document;
pub use document::{Document, UpdateMode, UpdatePayload};
