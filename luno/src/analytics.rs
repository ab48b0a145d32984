//! Read-only aggregates over users, sessions and events.

use std::collections::BTreeMap;

use http::{Method, StatusCode};
use luno_core::{LogicalRequest, Query, Result};
use serde::{Deserialize, Serialize};

use crate::{Client, Entity};

/// Counts keyed by period, such as `{"1": 4, "7": 12, "28": 40}`.
pub type EntityAggregate = BTreeMap<String, i64>;

/// Per event name aggregates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventAggregates {
    #[serde(default)]
    pub list: Vec<EventAggregate>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventAggregate {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: i64,
    /// Time of the last occurrence.
    #[serde(default)]
    pub last: String,
}

/// TimelineFilter selects the events counted on a timeline.
///
/// `distinct` and `round_range` are always sent, the rest only when set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimelineFilter {
    /// Count each user at most once per bucket.
    pub distinct: bool,
    pub from: String,
    pub to: String,
    /// Bucket size, such as `day` or `hour`.
    pub group: String,
    pub name: String,
    /// Round `from`/`to` out to whole buckets.
    pub round_range: bool,
    pub user_id: String,
}

impl TimelineFilter {
    /// Query parameters for this filter.
    pub fn params(&self) -> Query {
        let mut q = Query::new();
        q.push_bool("distinct", self.distinct);
        q.push_bool("round_range", self.round_range);
        q.push_non_empty("from", &self.from);
        q.push_non_empty("to", &self.to);
        q.push_non_empty("group", &self.group);
        q.push_non_empty("name", &self.name);
        q.push_non_empty("user_id", &self.user_id);
        q
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// One bucket of a timeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub range: Option<Range>,
    #[serde(default, alias = "Count")]
    pub count: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsTimeline {
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    #[serde(default)]
    pub total: i64,
}

/// AnalyticsClient reads `/analytics`.
pub struct AnalyticsClient<'a> {
    client: &'a Client,
}

impl<'a> AnalyticsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// New users over each of `days`.
    pub async fn users(&self, days: &[&str]) -> Result<EntityAggregate> {
        self.aggregate("/analytics/users", days).await
    }

    /// New sessions over each of `days`.
    pub async fn sessions(&self, days: &[&str]) -> Result<EntityAggregate> {
        self.aggregate("/analytics/sessions", days).await
    }

    /// Recorded events over each of `days`.
    pub async fn events(&self, days: &[&str]) -> Result<EntityAggregate> {
        self.aggregate("/analytics/events", days).await
    }

    /// Count and last occurrence of every event name.
    pub async fn events_list(&self) -> Result<EventAggregates> {
        let req = LogicalRequest::new(Method::GET, "/analytics/events/list");
        self.client.call(req, StatusCode::OK).await
    }

    /// Event counts bucketed over time.
    pub async fn events_timeline(&self, filter: Option<&TimelineFilter>) -> Result<EventsTimeline> {
        let query = filter.map(TimelineFilter::params).unwrap_or_default();
        let req = LogicalRequest::new(Method::GET, "/analytics/events/timeline").with_query(query);
        self.client.call(req, StatusCode::OK).await
    }

    async fn aggregate(&self, path: &str, days: &[&str]) -> Result<EntityAggregate> {
        let mut query = Query::new();
        query.push_repeated("days", days.iter().copied());

        let req = LogicalRequest::new(Method::GET, path).with_query(query);
        self.client.call(req, StatusCode::OK).await
    }
}
