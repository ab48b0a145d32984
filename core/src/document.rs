use std::ops::{Deref, DerefMut};

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document is an opaque, ordered JSON object.
///
/// Used for free-form `profile` and `details` maps whose keys are owned by the
/// application, not by this crate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Document {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Document {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// How an update is applied by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// `PATCH`: only the fields sent change, documents are shallow merged.
    Merge,
    /// `PUT`: the mutable field set is replaced, documents included.
    Overwrite,
}

impl UpdateMode {
    /// `Overwrite` when `overwrite` is set, `Merge` otherwise.
    pub fn from_overwrite(overwrite: bool) -> Self {
        if overwrite {
            UpdateMode::Overwrite
        } else {
            UpdateMode::Merge
        }
    }

    /// The HTTP method carrying this mode.
    pub fn method(&self) -> Method {
        match self {
            UpdateMode::Merge => Method::PATCH,
            UpdateMode::Overwrite => Method::PUT,
        }
    }
}

/// UpdatePayload is the body of an update request.
///
/// Built from the full set of mutable fields of a resource, it only knows field
/// names, never their meaning, so every resource shares the same rules:
///
/// - [`UpdateMode::Overwrite`] sends every field, empty ones included, so the
///   service clears what the caller left empty. With auto-derive, derived
///   fields are sent cleared so the service recomputes them.
/// - [`UpdateMode::Merge`] drops `null` and empty string fields, which were
///   never set. With auto-derive, derived fields are dropped as well, merge
///   never clears anything it was not explicitly given.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UpdatePayload(Document);

impl UpdatePayload {
    /// Project `fields` for `mode`.
    ///
    /// `derived` names the fields the service computes itself when
    /// `auto_derive` is set (first and last name derived from the full name).
    pub fn project(fields: Document, mode: UpdateMode, derived: &[&str], auto_derive: bool) -> Self {
        let mut doc = fields;
        match mode {
            UpdateMode::Overwrite => {
                if auto_derive {
                    for key in derived {
                        doc.insert(key.to_string(), Value::String(String::new()));
                    }
                }
            }
            UpdateMode::Merge => {
                doc.retain(|_, v| !is_unset(v));
                if auto_derive {
                    for key in derived {
                        doc.remove(*key);
                    }
                }
            }
        }
        Self(doc)
    }

    /// The projected fields.
    pub fn fields(&self) -> &Document {
        &self.0
    }
}

fn is_unset(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
