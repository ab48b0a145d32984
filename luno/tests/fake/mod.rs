//! An in-memory Luno service.
//!
//! Verifies every request's `key`, `timestamp` and `sign` the way the real
//! service does, then serves users, sessions, events, api keys, the account
//! and analytics from memory. Merge vs replace, user deactivation and session
//! access counting follow the service's documented behavior.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};
use luno::hash::hex_hmac_sha512;
use luno::time::{format_rfc3339, now, parse_rfc3339};
use luno::{string_to_sign, Client, Config, Context, HttpSend, Query};
use serde_json::{json, Map, Value};

pub const KEY: &str = "key_0123456789abcdef";
pub const SECRET: &str = "sec_0123456789abcdef";

type Obj = Map<String, Value>;

const USER_FIELDS: &[&str] = &["email", "username", "name", "first_name", "last_name", "profile"];
const SESSION_FIELDS: &[&str] = &["user_id", "expires", "ip", "user_agent", "details"];
const DETAILS_ONLY: &[&str] = &["details"];
const ACCOUNT_FIELDS: &[&str] = &["email", "name", "first_name", "last_name"];

/// A request as the service received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Path without version prefix, such as `/users/usr_1`.
    pub path: String,
    /// Query without `key`, `timestamp` and `sign`.
    pub query: Query,
    pub content_type: Option<String>,
    /// `Null` for an empty body.
    pub body: Value,
}

#[derive(Debug, Default)]
struct State {
    seq: u64,
    users: Vec<Obj>,
    sessions: Vec<Obj>,
    events: Vec<Obj>,
    api_auths: Vec<Obj>,
    account: Obj,
    requests: Vec<Recorded>,
    next_reply: Option<(StatusCode, &'static str)>,
}

#[derive(Debug, Clone)]
pub struct FakeLuno {
    state: Arc<Mutex<State>>,
}

impl Default for FakeLuno {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLuno {
    pub fn new() -> Self {
        let account = json!({
            "type": "account",
            "id": "acc_1",
            "url": "/account",
            "email": "owner@bigtop.com",
            "name": "Big Top",
            "first_name": "Big",
            "last_name": "Top",
            "username": "bigtop",
            "created": "2016-08-15T16:50:12Z",
            "closed": "",
        });
        let state = State {
            account: as_obj(account),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A client talking to this service with the right credential.
    pub fn client(&self) -> Client {
        self.client_with(Config::new().with_api_key(KEY).with_secret_key(SECRET))
    }

    pub fn client_with(&self, config: Config) -> Client {
        let ctx = Context::new().with_http_send(self.clone());
        Client::new(ctx, config).expect("client must be created")
    }

    /// Every request received so far, signature failures excluded.
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("a request must have been sent")
    }

    /// Answer the next authenticated request with `status` and a raw `body`.
    pub fn reply_next(&self, status: StatusCode, body: &'static str) {
        self.state.lock().unwrap().next_reply = Some((status, body));
    }

    fn handle(&self, method: &Method, path_and_query: &str, headers: &HeaderMap, body: &Bytes) -> (StatusCode, Bytes) {
        let Some((signed, sign)) = path_and_query.rsplit_once("&sign=") else {
            return reply(error(StatusCode::UNAUTHORIZED, "missing_signature"));
        };
        let expected = hex_hmac_sha512(SECRET.as_bytes(), &string_to_sign(method, signed, body));
        if sign != expected {
            return reply(error(StatusCode::UNAUTHORIZED, "invalid_signature"));
        }

        let (path, raw_query) = signed.split_once('?').unwrap_or((signed, ""));
        let mut query = Query::parse(raw_query);
        if query.encode() != raw_query {
            return reply(error(StatusCode::BAD_REQUEST, "unordered_query"));
        }
        if query.get("key") != Some(KEY) {
            return reply(error(StatusCode::UNAUTHORIZED, "invalid_key"));
        }
        match query.get("timestamp").map(parse_rfc3339) {
            Some(Ok(_)) => {}
            _ => return reply(error(StatusCode::UNAUTHORIZED, "invalid_timestamp")),
        }
        query = query
            .iter()
            .filter(|(k, _)| *k != "key" && *k != "timestamp")
            .collect();

        let json = if body.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(body) {
                Ok(v) => v,
                Err(_) => return reply(error(StatusCode::BAD_REQUEST, "invalid_json")),
            }
        };

        let Some(path) = path.strip_prefix("/v1") else {
            return reply(error(StatusCode::NOT_FOUND, "not_found"));
        };

        let mut state = self.state.lock().unwrap();
        state.requests.push(Recorded {
            method: method.clone(),
            path: path.to_string(),
            query: query.clone(),
            content_type: headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: json.clone(),
        });
        if let Some((status, raw)) = state.next_reply.take() {
            return (status, Bytes::from_static(raw.as_bytes()));
        }

        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        reply(state.route(method, &segments, &query, as_obj(json)))
    }
}

#[async_trait]
impl HttpSend for FakeLuno {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default();

        let (status, body) = self.handle(&parts.method, &path_and_query, &parts.headers, &body);
        Ok(http::Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(body)?)
    }
}

type Reply = (StatusCode, Value);

fn reply((status, value): Reply) -> (StatusCode, Bytes) {
    (status, Bytes::from(value.to_string()))
}

fn ok(value: Value) -> Reply {
    (StatusCode::OK, value)
}

fn created(value: Value) -> Reply {
    (StatusCode::CREATED, value)
}

fn error(status: StatusCode, code: &str) -> Reply {
    (
        status,
        json!({
            "code": code,
            "message": code.replace('_', " "),
            "description": format!("fake luno rejected the request with {code}"),
            "status": status.as_u16(),
            "extra": {},
        }),
    )
}

fn as_obj(v: Value) -> Obj {
    match v {
        Value::Object(m) => m,
        _ => Obj::new(),
    }
}

fn str_of<'a>(obj: &'a Obj, key: &str) -> &'a str {
    obj.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn is_unset(v: &Value) -> bool {
    v.is_null() || v.as_str() == Some("")
}

fn find<'a>(items: &'a mut [Obj], key: &str, value: &str) -> Option<&'a mut Obj> {
    items.iter_mut().find(|o| str_of(o, key) == value)
}

/// Apply an update: `PUT` replaces `fields`, `PATCH` sets the given ones and
/// shallow merges the `doc` field.
fn apply_update(item: &mut Obj, body: &Obj, method: &Method, fields: &[&str], doc: &str) {
    for field in fields {
        let given = body.get(*field).filter(|v| !v.is_null());
        if method == Method::PUT {
            match given {
                Some(v) if !is_unset(v) => {
                    item.insert(field.to_string(), v.clone());
                }
                _ => {
                    item.remove(*field);
                }
            }
            continue;
        }

        let Some(v) = given else { continue };
        match (item.get_mut(*field), v) {
            (Some(Value::Object(existing)), Value::Object(patch)) if *field == doc => {
                for (k, v) in patch {
                    existing.insert(k.clone(), v.clone());
                }
            }
            _ => {
                item.insert(field.to_string(), v.clone());
            }
        }
    }
}

fn auto_name(item: &mut Obj) {
    let name = str_of(item, "name").to_string();
    let (first, last) = name.split_once(' ').unwrap_or((name.as_str(), ""));
    item.insert("first_name".to_string(), first.into());
    item.insert("last_name".to_string(), last.trim().into());
}

fn wants_auto_name(query: &Query) -> bool {
    query.get("auto_name") == Some("true")
}

fn public_user(user: &Obj) -> Value {
    let mut user = user.clone();
    user.remove("password");
    Value::Object(user)
}

fn without_secret(auth: &Obj) -> Value {
    let mut auth = auth.clone();
    auth.remove("secret");
    Value::Object(auth)
}

fn list(items: Vec<Value>, query: &Query) -> Value {
    let limit: usize = query
        .get("limit")
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(usize::MAX);
    let page: Vec<Value> = items.into_iter().take(limit).collect();
    json!({"type": "list", "list": page, "page": {}})
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.seq += 1;
        format!("{prefix}_{}", self.seq)
    }

    fn route(&mut self, method: &Method, segments: &[&str], query: &Query, body: Obj) -> Reply {
        match (method.clone(), segments) {
            (Method::GET, ["users"]) => {
                let users = self.users.iter().map(public_user).collect();
                ok(list(users, query))
            }
            (Method::POST, ["users"]) => self.create_user(body, query),
            (Method::POST, ["users", "login"]) => self.login(body, query),
            (Method::GET, ["users", id]) => match self.user(id) {
                Some(user) => ok(public_user(user)),
                None => error(StatusCode::NOT_FOUND, "user_not_found"),
            },
            (Method::PUT | Method::PATCH, ["users", id]) => {
                let Some(user) = find(&mut self.users, "id", id) else {
                    return error(StatusCode::NOT_FOUND, "user_not_found");
                };
                apply_update(user, &body, method, USER_FIELDS, "profile");
                if wants_auto_name(query) {
                    auto_name(user);
                }
                ok(json!({}))
            }
            (Method::DELETE, ["users", id]) => self.delete_user(id, query),
            (Method::POST, ["users", id, "reactivate"]) => match find(&mut self.users, "id", id) {
                Some(user) => {
                    user.remove("closed");
                    ok(json!({}))
                }
                None => error(StatusCode::NOT_FOUND, "user_not_found"),
            },
            (Method::DELETE, ["users", id, "sessions"]) => {
                self.sessions.retain(|s| str_of(s, "user_id") != *id);
                ok(json!({}))
            }
            (Method::POST, ["users", id, "password", "validate"]) => {
                let Some(user) = find(&mut self.users, "id", id) else {
                    return error(StatusCode::NOT_FOUND, "user_not_found");
                };
                if str_of(user, "password") == str_of(&body, "password") {
                    ok(json!({}))
                } else {
                    error(StatusCode::UNAUTHORIZED, "incorrect_password")
                }
            }
            (Method::POST, ["users", id, "password", "change"]) => {
                let Some(user) = find(&mut self.users, "id", id) else {
                    return error(StatusCode::NOT_FOUND, "user_not_found");
                };
                if query.get("require_current_password") == Some("true")
                    && str_of(user, "password") != str_of(&body, "current_password")
                {
                    return error(StatusCode::UNAUTHORIZED, "incorrect_password");
                }
                user.insert("password".to_string(), body.get("password").cloned().unwrap_or_default());
                ok(json!({}))
            }

            (Method::GET, ["sessions"]) => {
                let user_id = query.get("user_id");
                let sessions = self
                    .sessions
                    .iter()
                    .filter(|s| user_id.map_or(true, |u| str_of(s, "user_id") == u))
                    .map(|s| self.expanded(s, query))
                    .collect();
                ok(list(sessions, query))
            }
            (Method::POST, ["sessions"]) => {
                let user_id = str_of(&body, "user_id").to_string();
                if self.user(&user_id).is_none() {
                    return error(StatusCode::NOT_FOUND, "user_not_found");
                }
                let session = self.open_session(&user_id, &body);
                created(self.expanded(&session, query))
            }
            (Method::POST, ["sessions", "access"]) => {
                let key = str_of(&body, "key").to_string();
                let Some(session) = find(&mut self.sessions, "key", &key) else {
                    return error(StatusCode::NOT_FOUND, "session_not_found");
                };
                apply_update(session, &body, &Method::PATCH, SESSION_FIELDS, "details");
                let count = session.get("access_count").and_then(Value::as_u64).unwrap_or(0);
                session.insert("access_count".to_string(), (count + 1).into());
                session.insert("last_access".to_string(), format_rfc3339(now()).into());

                let session = session.clone();
                ok(self.expanded(&session, query))
            }
            (Method::GET, ["sessions", id]) => match self.sessions.iter().find(|s| str_of(s, "id") == *id) {
                Some(s) => ok(self.expanded(s, query)),
                None => error(StatusCode::NOT_FOUND, "session_not_found"),
            },
            (Method::PUT | Method::PATCH, ["sessions", id]) => {
                let Some(session) = find(&mut self.sessions, "id", id) else {
                    return error(StatusCode::NOT_FOUND, "session_not_found");
                };
                apply_update(session, &body, method, SESSION_FIELDS, "details");
                ok(json!({}))
            }
            (Method::DELETE, ["sessions", id]) => remove(&mut self.sessions, "id", id, "session_not_found"),

            (Method::GET, ["events"]) => {
                let name = query.get("name");
                let user_id = query.get("user_id");
                let events = self
                    .events
                    .iter()
                    .filter(|e| name.map_or(true, |n| str_of(e, "name") == n))
                    .filter(|e| user_id.map_or(true, |u| str_of(e, "user_id") == u))
                    .map(|e| self.expanded(e, query))
                    .collect();
                ok(list(events, query))
            }
            (Method::POST, ["events"]) => {
                if str_of(&body, "name").is_empty() {
                    return error(StatusCode::BAD_REQUEST, "missing_name");
                }
                let id = self.next_id("evt");
                let mut event = body;
                event.insert("type".to_string(), "event".into());
                event.insert("url".to_string(), format!("/events/{id}").into());
                event.insert("id".to_string(), id.into());
                if str_of(&event, "timestamp").is_empty() {
                    event.insert("timestamp".to_string(), format_rfc3339(now()).into());
                }
                self.events.push(event.clone());
                created(self.expanded(&event, query))
            }
            (Method::GET, ["events", id]) => match self.events.iter().find(|e| str_of(e, "id") == *id) {
                Some(e) => ok(Value::Object(e.clone())),
                None => error(StatusCode::NOT_FOUND, "event_not_found"),
            },
            (Method::PUT | Method::PATCH, ["events", id]) => {
                let Some(event) = find(&mut self.events, "id", id) else {
                    return error(StatusCode::NOT_FOUND, "event_not_found");
                };
                apply_update(event, &body, method, DETAILS_ONLY, "details");
                ok(json!({}))
            }
            (Method::DELETE, ["events", id]) => remove(&mut self.events, "id", id, "event_not_found"),

            (Method::GET, ["api_authentication"]) => {
                let user_id = query.get("user_id");
                let auths = self
                    .api_auths
                    .iter()
                    .filter(|a| user_id.map_or(true, |u| str_of(a, "user_id") == u))
                    .map(without_secret)
                    .collect();
                ok(list(auths, query))
            }
            (Method::POST, ["api_authentication"]) => {
                let id = self.next_id("api");
                let key = self.next_id("key");
                let secret = self.next_id("secret");
                let mut auth = body;
                auth.insert("type".to_string(), "api_authentication".into());
                auth.insert("url".to_string(), format!("/api_authentication/{id}").into());
                auth.insert("id".to_string(), id.into());
                auth.insert("key".to_string(), key.into());
                auth.insert("secret".to_string(), secret.into());
                auth.insert("created".to_string(), format_rfc3339(now()).into());
                self.api_auths.push(auth.clone());
                created(Value::Object(auth))
            }
            (Method::GET, ["api_authentication", id]) => {
                match self.api_auths.iter().find(|a| str_of(a, "id") == *id) {
                    Some(a) => ok(without_secret(a)),
                    None => error(StatusCode::NOT_FOUND, "api_authentication_not_found"),
                }
            }
            (Method::PUT | Method::PATCH, ["api_authentication", key]) => {
                let Some(auth) = find(&mut self.api_auths, "key", key) else {
                    return error(StatusCode::NOT_FOUND, "api_authentication_not_found");
                };
                apply_update(auth, &body, method, DETAILS_ONLY, "details");
                ok(json!({}))
            }
            (Method::DELETE, ["api_authentication", id]) => {
                remove(&mut self.api_auths, "id", id, "api_authentication_not_found")
            }

            (Method::GET, ["account"]) => ok(Value::Object(self.account.clone())),
            (Method::PUT, ["account"]) => {
                apply_update(&mut self.account, &body, method, ACCOUNT_FIELDS, "");
                if wants_auto_name(query) {
                    auto_name(&mut self.account);
                }
                ok(json!({}))
            }

            (Method::GET, ["analytics", "users"]) => ok(aggregate(self.users.len(), query)),
            (Method::GET, ["analytics", "sessions"]) => ok(aggregate(self.sessions.len(), query)),
            (Method::GET, ["analytics", "events"]) => ok(aggregate(self.events.len(), query)),
            (Method::GET, ["analytics", "events", "list"]) => {
                let mut by_name: BTreeMap<String, (i64, String)> = BTreeMap::new();
                for e in &self.events {
                    let entry = by_name.entry(str_of(e, "name").to_string()).or_default();
                    entry.0 += 1;
                    entry.1 = str_of(e, "timestamp").to_string();
                }
                let list: Vec<Value> = by_name
                    .into_iter()
                    .map(|(name, (count, last))| json!({"name": name, "count": count, "last": last}))
                    .collect();
                ok(json!({ "list": list }))
            }
            (Method::GET, ["analytics", "events", "timeline"]) => {
                if query.get("distinct").is_none() || query.get("round_range").is_none() {
                    return error(StatusCode::BAD_REQUEST, "missing_timeline_flags");
                }
                let name = query.get("name");
                let count = self
                    .events
                    .iter()
                    .filter(|e| name.map_or(true, |n| str_of(e, "name") == n))
                    .count();
                ok(json!({
                    "timeline": [{
                        "timestamp": "2016-08-15T00:00:00Z",
                        "range": {"from": "2016-08-15T00:00:00Z", "to": "2016-08-16T00:00:00Z"},
                        "count": count,
                    }],
                    "total": count,
                }))
            }

            _ => error(StatusCode::NOT_FOUND, "not_found"),
        }
    }

    /// Look a user up by id, `email:` or `username:`.
    fn user(&self, id: &str) -> Option<&Obj> {
        let (key, value) = match id.split_once(':') {
            Some(("email", v)) => ("email", v),
            Some(("username", v)) => ("username", v),
            _ => ("id", id),
        };
        self.users.iter().find(|u| str_of(u, key) == value)
    }

    fn expanded(&self, item: &Obj, query: &Query) -> Value {
        let mut item = item.clone();
        if query.get_all("expand").contains(&"user") {
            if let Some(user) = self.user(str_of(&item, "user_id")) {
                item.insert("user".to_string(), public_user(user));
            }
        }
        Value::Object(item)
    }

    fn create_user(&mut self, body: Obj, query: &Query) -> Reply {
        let email = str_of(&body, "email");
        if !email.is_empty() && self.users.iter().any(|u| str_of(u, "email") == email) {
            return error(StatusCode::CONFLICT, "email_exists");
        }

        let id = self.next_id("usr");
        let mut user = body;
        user.insert("type".to_string(), "user".into());
        user.insert("url".to_string(), format!("/users/{id}").into());
        user.insert("id".to_string(), id.into());
        user.insert("created".to_string(), format_rfc3339(now()).into());
        if wants_auto_name(query) {
            auto_name(&mut user);
        }
        self.users.push(user.clone());
        created(public_user(&user))
    }

    fn delete_user(&mut self, id: &str, query: &Query) -> Reply {
        if query.get("permanent") == Some("false") {
            return match find(&mut self.users, "id", id) {
                Some(user) => {
                    user.insert("closed".to_string(), format_rfc3339(now()).into());
                    ok(json!({}))
                }
                None => error(StatusCode::NOT_FOUND, "user_not_found"),
            };
        }

        self.sessions.retain(|s| str_of(s, "user_id") != id);
        remove(&mut self.users, "id", id, "user_not_found")
    }

    fn login(&mut self, body: Obj, query: &Query) -> Reply {
        let user = ["id", "email", "username"]
            .into_iter()
            .find(|k| !str_of(&body, k).is_empty())
            .and_then(|k| self.users.iter().find(|u| str_of(u, k) == str_of(&body, k)))
            .or_else(|| {
                let login = str_of(&body, "login");
                self.users.iter().find(|u| {
                    !login.is_empty() && (str_of(u, "email") == login || str_of(u, "username") == login)
                })
            })
            .cloned();

        let Some(user) = user else {
            return error(StatusCode::UNAUTHORIZED, "incorrect_password");
        };
        if str_of(&user, "password") != str_of(&body, "password") {
            return error(StatusCode::UNAUTHORIZED, "incorrect_password");
        }
        if !str_of(&user, "closed").is_empty() {
            return error(StatusCode::FORBIDDEN, "user_closed");
        }
        let session = match body.get("session") {
            None => Obj::new(),
            Some(Value::Object(session)) => session.clone(),
            Some(_) => return error(StatusCode::BAD_REQUEST, "invalid_session"),
        };

        let session = self.open_session(str_of(&user, "id"), &session);
        ok(json!({
            "user": public_user(&user),
            "session": self.expanded(&session, query),
        }))
    }

    fn open_session(&mut self, user_id: &str, fields: &Obj) -> Obj {
        let id = self.next_id("sess");
        let key = self.next_id("sk");

        let mut session = Obj::new();
        session.insert("type".to_string(), "session".into());
        session.insert("id".to_string(), id.clone().into());
        session.insert("url".to_string(), format!("/sessions/{id}").into());
        session.insert("user_id".to_string(), user_id.into());
        session.insert("key".to_string(), key.into());
        session.insert("created".to_string(), format_rfc3339(now()).into());
        session.insert("access_count".to_string(), 0.into());
        for field in ["expires", "ip", "user_agent", "details"] {
            if let Some(v) = fields.get(field).filter(|v| !is_unset(v)) {
                session.insert(field.to_string(), v.clone());
            }
        }
        self.sessions.push(session.clone());
        session
    }
}

fn remove(items: &mut Vec<Obj>, key: &str, value: &str, not_found: &str) -> Reply {
    let before = items.len();
    items.retain(|o| str_of(o, key) != value);
    if items.len() == before {
        error(StatusCode::NOT_FOUND, not_found)
    } else {
        ok(json!({}))
    }
}

fn aggregate(count: usize, query: &Query) -> Value {
    let mut days = query.get_all("days");
    if days.is_empty() {
        days = vec!["1", "7", "28"];
    }
    Value::Object(days.into_iter().map(|d| (d.to_string(), json!(count))).collect())
}
