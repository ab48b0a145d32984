//! The shared resource contract.
//!
//! Every collection resource (users, sessions, events, api keys) supports
//! the same five operations over `/{collection}` and `/{collection}/{id}`.
//! [`ResourceClient`] implements them once, the per-resource clients only add
//! what is specific to them.

use std::marker::PhantomData;

use http::{Method, StatusCode};
use luno_core::{
    encode_path_segment, Document, LogicalRequest, Query, Result, UpdateMode, UpdatePayload,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::constants::EXPAND;
use crate::{Client, Envelope, Paging};

/// Resource is a type living in a collection of the API.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync {
    /// Collection path, such as `/users`.
    const PATH: &'static str;

    /// Fields the service derives by itself when asked to.
    const DERIVED_FIELDS: &'static [&'static str] = &[];

    /// Query flag asking the service to derive [`Resource::DERIVED_FIELDS`].
    const AUTO_DERIVE_PARAM: Option<&'static str> = None;

    /// Filter accepted by list.
    type Filter: ListFilter;

    /// Identifier addressing this resource in its item path.
    fn resource_id(&self) -> &str;

    /// Every mutable field, unset ones included.
    fn update_fields(&self) -> Document;
}

/// ListFilter narrows a list.
pub trait ListFilter {
    /// Append the filter's query parameters.
    fn append_to(&self, query: &mut Query);
}

/// NoFilter is for collections that cannot be filtered.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFilter;

impl ListFilter for NoFilter {
    fn append_to(&self, _: &mut Query) {}
}

/// `expand=...` once for every name.
pub(crate) fn expand_params(expand: &[&str]) -> Query {
    let mut q = Query::new();
    q.push_repeated(EXPAND, expand.iter().copied());
    q
}

/// `{collection}/{id}` with `id` encoded as one path segment.
pub(crate) fn item_path(collection: &str, id: &str) -> Result<String> {
    Ok(format!("{collection}/{}", encode_path_segment(id)?))
}

/// ResourceClient implements the operations shared by every resource `R`.
pub struct ResourceClient<'a, R> {
    client: &'a Client,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ResourceClient<'_, R> {}

impl<'a, R: Resource> ResourceClient<'a, R> {
    /// Create a resource client over `client`.
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    /// `GET {PATH}`: one page of resources.
    pub async fn list(
        &self,
        filter: Option<&R::Filter>,
        paging: Option<&Paging>,
        expand: &[&str],
    ) -> Result<Envelope<R>> {
        let mut query = expand_params(expand);
        if let Some(filter) = filter {
            filter.append_to(&mut query);
        }
        if let Some(paging) = paging {
            query.merge(paging.params());
        }

        let req = LogicalRequest::new(Method::GET, R::PATH).with_query(query);
        self.client.call(req, StatusCode::OK).await
    }

    /// `GET {PATH}/{id}`.
    pub async fn get(&self, id: &str, expand: &[&str]) -> Result<R> {
        let req =
            LogicalRequest::new(Method::GET, item_path(R::PATH, id)?).with_query(expand_params(expand));
        self.client.call(req, StatusCode::OK).await
    }

    /// `POST {PATH}`, returning the stored resource.
    ///
    /// `params` carries resource specific flags such as `auto_name`.
    pub async fn create(&self, resource: &R, expand: &[&str], params: Query) -> Result<R> {
        let mut query = expand_params(expand);
        query.merge(params);

        let req = LogicalRequest::new(Method::POST, R::PATH)
            .with_query(query)
            .with_json(resource)?;
        self.client.call(req, StatusCode::CREATED).await
    }

    /// `PATCH` or `PUT {PATH}/{id}` depending on `mode`.
    ///
    /// The body is [`Resource::update_fields`] projected for `mode`. When
    /// the resource supports it, `auto_derive` is always sent.
    pub async fn update(&self, resource: &R, mode: UpdateMode, auto_derive: bool) -> Result<()> {
        let path = item_path(R::PATH, resource.resource_id())?;
        let payload =
            UpdatePayload::project(resource.update_fields(), mode, R::DERIVED_FIELDS, auto_derive);

        let mut query = Query::new();
        if let Some(param) = R::AUTO_DERIVE_PARAM {
            query.push_bool(param, auto_derive);
        }

        let req = LogicalRequest::new(mode.method(), path)
            .with_query(query)
            .with_json(&payload)?;
        self.client.call_empty(req, StatusCode::OK).await
    }

    /// `DELETE {PATH}/{id}`.
    pub async fn delete(&self, id: &str, params: Query) -> Result<()> {
        let req = LogicalRequest::new(Method::DELETE, item_path(R::PATH, id)?).with_query(params);
        self.client.call_empty(req, StatusCode::OK).await
    }
}
