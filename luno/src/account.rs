use http::{Method, StatusCode};
use log::debug;
use luno_core::{Document, Error, LogicalRequest, Query, Result, UpdateMode, UpdatePayload};
use serde::{Deserialize, Serialize};

use crate::constants::AUTO_NAME;
use crate::{Client, Entity};

const PATH: &str = "/account";
const DERIVED_FIELDS: &[&str] = &["first_name", "last_name"];

/// Account is the Luno account owning the project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub closed: String,
}

impl Account {
    fn update_fields(&self) -> Document {
        Document::new()
            .with("email", self.email.as_str())
            .with("name", self.name.as_str())
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
    }
}

/// AccountClient manages `/account`.
pub struct AccountClient<'a> {
    client: &'a Client,
}

impl<'a> AccountClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<Account> {
        let req = LogicalRequest::new(Method::GET, PATH);
        self.client.call(req, StatusCode::OK).await
    }

    /// Replace the account's fields.
    ///
    /// Always a full update: empty fields are cleared.
    pub async fn update(&self, account: &Account, auto_name: bool) -> Result<()> {
        let payload = UpdatePayload::project(
            account.update_fields(),
            UpdateMode::Overwrite,
            DERIVED_FIELDS,
            auto_name,
        );

        let mut query = Query::new();
        query.push_bool(AUTO_NAME, auto_name);

        let req = LogicalRequest::new(Method::PUT, PATH)
            .with_query(query)
            .with_json(&payload)?;
        self.client.call_empty(req, StatusCode::OK).await
    }

    /// Account deletion is not supported.
    ///
    /// Always fails with [`ErrorKind::Unsupported`](luno_core::ErrorKind::Unsupported),
    /// right away and without building a request.
    pub fn delete(&self, _token: &str) -> Result<()> {
        debug!("account delete requested, refusing without sending a request");
        Err(Error::unsupported("account delete"))
    }
}
