use http::{Method, StatusCode};
use luno_core::{Document, LogicalRequest, Query, Result, UpdateMode};
use serde::{Deserialize, Serialize};

use crate::resource::{expand_params, ListFilter, Resource, ResourceClient};
use crate::{Client, Entity, Envelope, Paging, User};

/// Session is a logged in user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    /// Secret handed to the end user, used by [`SessionsClient::access`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expires: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_access: String,
    /// Number of accesses, maintained by the service.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub access_count: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Document>,
    /// Present when listed or fetched with `expand=user`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<User>>,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

impl Session {
    /// The fields a login may set on the session it opens.
    pub(crate) fn login_fields(&self) -> Document {
        let mut doc = Document::new();
        put_non_empty(&mut doc, "expires", &self.expires);
        put_non_empty(&mut doc, "ip", &self.ip);
        put_non_empty(&mut doc, "user_agent", &self.user_agent);
        if let Some(details) = &self.details {
            doc.insert("details".to_string(), details.clone().into());
        }
        doc
    }

    /// The fields an access may set: the update fields plus `key`.
    fn access_fields(&self) -> Document {
        let mut doc = Document::new();
        put_non_empty(&mut doc, "key", &self.key);
        doc.extend(self.update_fields().into_inner());
        doc
    }
}

fn put_non_empty(doc: &mut Document, key: &str, value: &str) {
    if !value.is_empty() {
        doc.insert(key.to_string(), value.into());
    }
}

impl Resource for Session {
    const PATH: &'static str = "/sessions";

    type Filter = SessionFilter;

    fn resource_id(&self) -> &str {
        &self.entity.id
    }

    /// Only the fields that are set, `key` never: it can only be matched
    /// by an access.
    fn update_fields(&self) -> Document {
        let mut doc = Document::new();
        put_non_empty(&mut doc, "user_id", &self.user_id);
        doc.extend(self.login_fields().into_inner());
        doc
    }
}

/// SessionFilter narrows a session list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionFilter {
    /// Only sessions of this user.
    pub user_id: String,
}

impl ListFilter for SessionFilter {
    fn append_to(&self, query: &mut Query) {
        query.push_non_empty("user_id", &self.user_id);
    }
}

/// SessionsClient manages `/sessions`.
pub struct SessionsClient<'a> {
    client: &'a Client,
    inner: ResourceClient<'a, Session>,
}

impl<'a> SessionsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            inner: ResourceClient::new(client),
        }
    }

    /// Most recent sessions first.
    pub async fn list(
        &self,
        expand: &[&str],
        filter: Option<&SessionFilter>,
        paging: Option<&Paging>,
    ) -> Result<Envelope<Session>> {
        self.inner.list(filter, paging, expand).await
    }

    /// Open a session for `session.user_id`.
    pub async fn create(&self, session: &Session, expand: &[&str]) -> Result<Session> {
        self.inner.create(session, expand, Query::new()).await
    }

    /// Get a session by id.
    pub async fn get(&self, id: &str) -> Result<Session> {
        self.inner.get(id, &[]).await
    }

    /// Update a session, replacing its details if `overwrite_details`.
    ///
    /// Never counts as an access.
    pub async fn update(&self, session: &Session, overwrite_details: bool) -> Result<()> {
        self.inner
            .update(session, UpdateMode::from_overwrite(overwrite_details), false)
            .await
    }

    /// Close a session.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id, Query::new()).await
    }

    /// Record an access to the session matching `session.key`.
    ///
    /// The service bumps `access_count` and `last_access` once and applies the
    /// other set fields like a merge update. Fails with
    /// [`codes::SESSION_NOT_FOUND`](luno_core::codes::SESSION_NOT_FOUND) for
    /// an unknown or expired key.
    pub async fn access(&self, session: &Session, expand: &[&str]) -> Result<Session> {
        let req = LogicalRequest::new(Method::POST, "/sessions/access")
            .with_query(expand_params(expand))
            .with_json(&session.access_fields())?;
        self.client.call(req, StatusCode::OK).await
    }
}
