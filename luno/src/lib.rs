#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use luno_core::*;

mod constants;
pub use constants::{LUNO_API_KEY, LUNO_API_VERSION, LUNO_HOST, LUNO_SECRET_KEY};
mod config;
pub use config::Config;
mod client;
pub use client::Client;
mod entity;
pub use entity::{Entity, Envelope, Page, Paging};
mod resource;
pub use resource::{ListFilter, NoFilter, Resource, ResourceClient};

mod user;
pub use user::{User, UsersClient};
mod session;
pub use session::{Session, SessionFilter, SessionsClient};
mod event;
pub use event::{Event, EventFilter, EventsClient};
mod api_auth;
pub use api_auth::{ApiAuth, ApiAuthClient, ApiAuthFilter};
mod account;
pub use account::{Account, AccountClient};
pub mod analytics;
pub use analytics::AnalyticsClient;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{default_client, default_context};
