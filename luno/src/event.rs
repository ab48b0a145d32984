use luno_core::{Document, Query, Result, UpdateMode};
use serde::{Deserialize, Serialize};

use crate::resource::{ListFilter, Resource, ResourceClient};
use crate::{Client, Entity, Envelope, Paging, User};

/// Event is something that happened to a user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<User>>,
}

impl Resource for Event {
    const PATH: &'static str = "/events";

    type Filter = EventFilter;

    fn resource_id(&self) -> &str {
        &self.entity.id
    }

    fn update_fields(&self) -> Document {
        Document::new().with("details", self.details.clone())
    }
}

/// EventFilter narrows an event list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Only events with this name.
    pub name: String,
    /// Only events of this user.
    pub user_id: String,
}

impl ListFilter for EventFilter {
    fn append_to(&self, query: &mut Query) {
        query.push_non_empty("user_id", &self.user_id);
        query.push_non_empty("name", &self.name);
    }
}

/// EventsClient manages `/events`.
pub struct EventsClient<'a> {
    inner: ResourceClient<'a, Event>,
}

impl<'a> EventsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            inner: ResourceClient::new(client),
        }
    }

    /// Most recent events first.
    pub async fn list(
        &self,
        expand: &[&str],
        filter: Option<&EventFilter>,
        paging: Option<&Paging>,
    ) -> Result<Envelope<Event>> {
        self.inner.list(filter, paging, expand).await
    }

    /// Record an event.
    pub async fn create(&self, event: &Event, expand: &[&str]) -> Result<Event> {
        self.inner.create(event, expand, Query::new()).await
    }

    /// Get an event by id.
    pub async fn get(&self, id: &str) -> Result<Event> {
        self.inner.get(id, &[]).await
    }

    /// Update the details of an event, replacing them if `overwrite_details`.
    pub async fn update(&self, event: &Event, overwrite_details: bool) -> Result<()> {
        self.inner
            .update(event, UpdateMode::from_overwrite(overwrite_details), false)
            .await
    }

    /// Delete an event.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id, Query::new()).await
    }
}
