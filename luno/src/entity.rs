//! Shapes shared by every resource.

use luno_core::Query;
use serde::{Deserialize, Serialize};

/// Entity is the common header of every resource: `type`, `id` and `url`.
///
/// All three are assigned by the service and never sent back on updates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Resource type such as `user` or `session`.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Resource id such as `usr_...`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Canonical url of the resource.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

/// Page links of a list response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// The next page, absent on the last one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Entity>,
    /// The previous page, absent on the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<Entity>,
}

/// Envelope is a list response: one page of resources plus its links.
///
/// The order of `list` is the order the service returned.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct Envelope<T> {
    /// Header of the list itself.
    #[serde(flatten)]
    pub entity: Entity,
    /// Resources on this page.
    #[serde(default)]
    pub list: Vec<T>,
    /// Links to adjacent pages.
    #[serde(default)]
    pub page: Page,
}

/// Paging selects a page of a list.
///
/// Empty cursors are not sent. `limit` is always sent, `0` leaves the page
/// size to the service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paging {
    /// Start after this id.
    pub from: String,
    /// Stop before this id.
    pub to: String,
    /// Max number of resources on the page.
    pub limit: u32,
}

impl Paging {
    /// Page of at most `limit` resources.
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    /// Set from
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    /// Set to
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    /// Query parameters for this page.
    pub fn params(&self) -> Query {
        let mut q = Query::new();
        q.push_non_empty("from", &self.from);
        q.push_non_empty("to", &self.to);
        q.push("limit", self.limit.to_string());
        q
    }
}
