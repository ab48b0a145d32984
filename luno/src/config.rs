use std::fmt::{Debug, Formatter};

use luno_core::utils::Redact;
use luno_core::{Context, Credential, Diagnostics, Endpoint, Error, Result};

use crate::constants::*;

/// Config carries all the configuration a [`Client`](crate::Client) needs.
///
/// Every field set explicitly wins over its env value.
#[derive(Clone, Default)]
pub struct Config {
    /// `api_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`LUNO_API_KEY`]
    pub api_key: Option<String>,
    /// `secret_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`LUNO_SECRET_KEY`]
    pub secret_key: Option<String>,
    /// `host` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`LUNO_HOST`]
    /// - default to `api.luno.io`
    pub host: Option<String>,
    /// `version` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`LUNO_API_VERSION`]
    /// - default to `v1`
    pub version: Option<String>,
    /// `scheme` defaults to `https`.
    ///
    /// Only local test servers should need anything else.
    pub scheme: Option<String>,
    /// Request/response logging switches, all off by default.
    pub diagnostics: Diagnostics,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set api_key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set secret_key
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set scheme
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Set diagnostics
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(LUNO_API_KEY) {
            self.api_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(LUNO_SECRET_KEY) {
            self.secret_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(LUNO_HOST) {
            self.host.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(LUNO_API_VERSION) {
            self.version.get_or_insert(v);
        }

        self
    }

    /// Build the credential, failing if either half is missing.
    pub(crate) fn credential(&self) -> Result<Credential> {
        let key = self.api_key.as_deref().unwrap_or_default();
        let secret = self.secret_key.as_deref().unwrap_or_default();

        let cred = Credential::new(key, secret);
        if !cred.is_valid() {
            return Err(Error::config_invalid(format!(
                "api key and secret key are required, set {LUNO_API_KEY} and {LUNO_SECRET_KEY}"
            )));
        }
        Ok(cred)
    }

    pub(crate) fn endpoint(&self) -> Endpoint {
        let endpoint = Endpoint::new(
            self.host.as_deref().unwrap_or(DEFAULT_HOST),
            self.version.as_deref().unwrap_or(DEFAULT_VERSION),
        );
        match &self.scheme {
            Some(scheme) => endpoint.with_scheme(scheme),
            None => endpoint,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(Redact::from))
            .field("secret_key", &self.secret_key.as_ref().map(Redact::from))
            .field("host", &self.host)
            .field("version", &self.version)
            .field("scheme", &self.scheme)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
