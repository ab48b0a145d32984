use std::fmt::{Debug, Formatter};

use luno_core::utils::Redact;
use luno_core::{Document, Query, Result, UpdateMode};
use serde::{Deserialize, Serialize};

use crate::resource::{ListFilter, Resource, ResourceClient};
use crate::{Client, Entity, Envelope, Paging, User};

/// ApiAuth is an api key pair, optionally owned by a user.
///
/// The service addresses updates by `key` but gets and deletes by `id`.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiAuth {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<User>>,
}

impl Debug for ApiAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiAuth")
            .field("entity", &self.entity)
            .field("user_id", &self.user_id)
            .field("key", &self.key)
            .field("secret", &Redact::from(&self.secret))
            .field("created", &self.created)
            .field("details", &self.details)
            .field("user", &self.user)
            .finish()
    }
}

impl Resource for ApiAuth {
    const PATH: &'static str = "/api_authentication";

    type Filter = ApiAuthFilter;

    fn resource_id(&self) -> &str {
        &self.key
    }

    fn update_fields(&self) -> Document {
        Document::new().with("details", self.details.clone())
    }
}

/// ApiAuthFilter narrows an api key list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiAuthFilter {
    /// Only keys of this user.
    pub user_id: String,
}

impl ListFilter for ApiAuthFilter {
    fn append_to(&self, query: &mut Query) {
        query.push_non_empty("user_id", &self.user_id);
    }
}

/// ApiAuthClient manages `/api_authentication`.
pub struct ApiAuthClient<'a> {
    inner: ResourceClient<'a, ApiAuth>,
}

impl<'a> ApiAuthClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            inner: ResourceClient::new(client),
        }
    }

    pub async fn list(
        &self,
        expand: &[&str],
        filter: Option<&ApiAuthFilter>,
        paging: Option<&Paging>,
    ) -> Result<Envelope<ApiAuth>> {
        self.inner.list(filter, paging, expand).await
    }

    /// Create a key pair. The returned value is the only one carrying the
    /// secret.
    pub async fn create(&self, api_auth: &ApiAuth, expand: &[&str]) -> Result<ApiAuth> {
        self.inner.create(api_auth, expand, Query::new()).await
    }

    pub async fn get(&self, id: &str, expand: &[&str]) -> Result<ApiAuth> {
        self.inner.get(id, expand).await
    }

    pub async fn update(&self, api_auth: &ApiAuth, overwrite_details: bool) -> Result<()> {
        self.inner
            .update(api_auth, UpdateMode::from_overwrite(overwrite_details), false)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id, Query::new()).await
    }
}
