use http::{Method, StatusCode};
use luno_core::{Document, LogicalRequest, Query, Result, UpdateMode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::AUTO_NAME;
use crate::resource::{expand_params, item_path, NoFilter, Resource, ResourceClient};
use crate::{Client, Entity, Envelope, Paging, Session};

/// User is a Luno user.
///
/// `id` is assigned by the service. `first_name` and `last_name` can be
/// derived from `name` with `auto_name`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created: String,
    /// Set while the user is deactivated.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub closed: String,
    /// Only sent on create, never returned.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Document>,
}

impl User {
    /// Whether the user is deactivated.
    pub fn is_closed(&self) -> bool {
        !self.closed.is_empty()
    }
}

impl Resource for User {
    const PATH: &'static str = "/users";
    const DERIVED_FIELDS: &'static [&'static str] = &["first_name", "last_name"];
    const AUTO_DERIVE_PARAM: Option<&'static str> = Some(AUTO_NAME);

    type Filter = NoFilter;

    fn resource_id(&self) -> &str {
        &self.entity.id
    }

    fn update_fields(&self) -> Document {
        Document::new()
            .with("email", self.email.as_str())
            .with("username", self.username.as_str())
            .with("name", self.name.as_str())
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
            .with("profile", self.profile.clone())
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    user: User,
    session: Session,
}

/// Which identifier a login is made with.
enum LoginWith<'a> {
    Id(&'a str),
    Email(&'a str),
    Username(&'a str),
    Any(&'a str),
}

impl LoginWith<'_> {
    fn field(&self) -> (&'static str, &str) {
        match self {
            LoginWith::Id(v) => ("id", *v),
            LoginWith::Email(v) => ("email", *v),
            LoginWith::Username(v) => ("username", *v),
            LoginWith::Any(v) => ("login", *v),
        }
    }
}

/// UsersClient manages `/users`.
pub struct UsersClient<'a> {
    client: &'a Client,
    inner: ResourceClient<'a, User>,
}

impl<'a> UsersClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            inner: ResourceClient::new(client),
        }
    }

    /// Most recent users first.
    pub async fn list(&self, expand: &[&str], paging: Option<&Paging>) -> Result<Envelope<User>> {
        self.inner.list(None, paging, expand).await
    }

    /// Get a user by id, or by `email:...` / `username:...`.
    pub async fn get(&self, id: &str) -> Result<User> {
        self.inner.get(id, &[]).await
    }

    /// Create a user, deriving first and last name from `name` if `auto_name`.
    pub async fn create(&self, user: &User, auto_name: bool, expand: &[&str]) -> Result<User> {
        let mut params = Query::new();
        params.push_bool(AUTO_NAME, auto_name);
        self.inner.create(user, expand, params).await
    }

    /// Update a user.
    ///
    /// `overwrite_profile` replaces the profile and clears every field left
    /// empty; otherwise only the set fields change and the profile is merged.
    pub async fn update(&self, user: &User, auto_name: bool, overwrite_profile: bool) -> Result<()> {
        self.inner
            .update(user, UpdateMode::from_overwrite(overwrite_profile), auto_name)
            .await
    }

    /// Delete a user permanently.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id, permanent(true)).await
    }

    /// Close a user, keeping it around so it can be reactivated.
    pub async fn deactivate(&self, id: &str) -> Result<()> {
        self.inner.delete(id, permanent(false)).await
    }

    /// Reopen a deactivated user.
    pub async fn reactivate(&self, id: &str) -> Result<()> {
        let path = format!("{}/reactivate", item_path(User::PATH, id)?);
        let req = LogicalRequest::new(Method::POST, path);
        self.client.call_empty(req, StatusCode::OK).await
    }

    /// Log in with the user's id.
    pub async fn login_with_id(
        &self,
        id: &str,
        password: &str,
        expand: &[&str],
        session: Option<&Session>,
    ) -> Result<(User, Session)> {
        self.login(LoginWith::Id(id), password, expand, session).await
    }

    /// Log in with the user's email.
    pub async fn login_with_email(
        &self,
        email: &str,
        password: &str,
        expand: &[&str],
        session: Option<&Session>,
    ) -> Result<(User, Session)> {
        self.login(LoginWith::Email(email), password, expand, session)
            .await
    }

    /// Log in with the user's username.
    pub async fn login_with_username(
        &self,
        username: &str,
        password: &str,
        expand: &[&str],
        session: Option<&Session>,
    ) -> Result<(User, Session)> {
        self.login(LoginWith::Username(username), password, expand, session)
            .await
    }

    /// Log in with whatever identifier the user typed: the service matches
    /// it against email and username.
    pub async fn login_with_any(
        &self,
        login: &str,
        password: &str,
        expand: &[&str],
        session: Option<&Session>,
    ) -> Result<(User, Session)> {
        self.login(LoginWith::Any(login), password, expand, session)
            .await
    }

    async fn login(
        &self,
        with: LoginWith<'_>,
        password: &str,
        expand: &[&str],
        session: Option<&Session>,
    ) -> Result<(User, Session)> {
        let (field, value) = with.field();
        let mut body = Document::new();
        if !value.is_empty() {
            body.insert(field.to_string(), value.into());
        }
        if !password.is_empty() {
            body.insert("password".to_string(), password.into());
        }
        if let Some(session) = session {
            body.insert("session".to_string(), session.login_fields().into());
        }

        let req = LogicalRequest::new(Method::POST, "/users/login")
            .with_query(expand_params(expand))
            .with_json(&body)?;
        let resp: LoginResponse = self.client.call(req, StatusCode::OK).await?;
        Ok((resp.user, resp.session))
    }

    /// Remove every session of a user.
    pub async fn delete_sessions(&self, id: &str) -> Result<()> {
        let path = format!("{}/sessions", item_path(User::PATH, id)?);
        let req = LogicalRequest::new(Method::DELETE, path);
        self.client.call_empty(req, StatusCode::OK).await
    }

    /// Check `password` against the user's, failing with
    /// [`codes::INCORRECT_PASSWORD`](luno_core::codes::INCORRECT_PASSWORD).
    pub async fn validate_password(&self, id: &str, password: &str) -> Result<()> {
        let path = format!("{}/password/validate", item_path(User::PATH, id)?);
        let req = LogicalRequest::new(Method::POST, path).with_json(&json!({
            "password": password,
        }))?;
        self.client.call_empty(req, StatusCode::OK).await
    }

    /// Set a new password.
    ///
    /// `current_password` is only sent, and checked, if `require_current`.
    pub async fn change_password(
        &self,
        id: &str,
        new_password: &str,
        current_password: &str,
        require_current: bool,
    ) -> Result<()> {
        let path = format!("{}/password/change", item_path(User::PATH, id)?);

        let mut query = Query::new();
        query.push_bool("require_current_password", require_current);

        let mut body = Document::new().with("password", new_password);
        if require_current {
            body.insert("current_password".to_string(), current_password.into());
        }

        let req = LogicalRequest::new(Method::POST, path)
            .with_query(query)
            .with_json(&body)?;
        self.client.call_empty(req, StatusCode::OK).await
    }
}

fn permanent(permanent: bool) -> Query {
    let mut q = Query::new();
    q.push_bool("permanent", permanent);
    q
}
