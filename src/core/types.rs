use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::core::config::DEFAULT_SERVICE;

/// API version used when a request does not name one.
pub const DEFAULT_API_VERSION: &str = "1.1";

/// Query parameters of a request, keyed by name.
pub type Query = Map<String, Value>;

/// Where the SDK is running; selects the user-agent header name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Server-side process, sends `User-Agent`.
    #[default]
    Server,
    /// Any other context, sends `X-LC-UA`.
    Client,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
        }
    }
}

/// Per-call authentication overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOptions {
    /// Explicit session token; skips the current-user lookup.
    pub session_token: Option<String>,
    /// Explicit master-key choice. `Some(false)` suppresses a global `true`.
    pub use_master_key: Option<bool>,
}

impl AuthOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    #[must_use]
    pub const fn with_use_master_key(mut self, use_master_key: bool) -> Self {
        self.use_master_key = Some(use_master_key);
        self
    }
}

/// User reported by a [`CurrentUserProvider`](crate::core::traits::CurrentUserProvider).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub session_token: Option<String>,
}

impl CurrentUser {
    pub fn with_session_token(session_token: impl Into<String>) -> Self {
        Self {
            session_token: Some(session_token.into()),
        }
    }
}

/// One logical API call, consumed by [`Dispatcher::dispatch`](crate::core::kernel::Dispatcher::dispatch).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    service: String,
    version: String,
    method: Method,
    path: String,
    query: Option<Query>,
    body: Option<Value>,
    auth: AuthOptions,
    sign_key: bool,
}

impl RequestDescriptor {
    /// Create a request for `path` on the default service and API version.
    ///
    /// `path` should start with `/` or be empty.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            method,
            path: path.into(),
            query: None,
            body: Some(Value::Object(Map::new())),
            auth: AuthOptions::default(),
            sign_key: true,
        }
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Replace the body; `None` sends no body at all.
    #[must_use]
    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthOptions) -> Self {
        self.auth = auth;
        self
    }

    /// Choose between a signed (`X-LC-Sign`) and a plain (`X-LC-Key`) key header.
    #[must_use]
    pub const fn with_sign_key(mut self, sign_key: bool) -> Self {
        self.sign_key = sign_key;
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub const fn auth(&self) -> &AuthOptions {
        &self.auth
    }

    pub const fn sign_key(&self) -> bool {
        self.sign_key
    }

    pub(crate) fn into_parts(self) -> RequestParts {
        RequestParts {
            service: self.service,
            version: self.version,
            method: self.method,
            path: self.path,
            query: self.query,
            body: self.body,
            auth: self.auth,
            sign_key: self.sign_key,
        }
    }
}

/// Owned fields of a consumed [`RequestDescriptor`].
#[derive(Debug)]
pub(crate) struct RequestParts {
    pub service: String,
    pub version: String,
    pub method: Method,
    pub path: String,
    pub query: Option<Query>,
    pub body: Option<Value>,
    pub auth: AuthOptions,
    pub sign_key: bool,
}
