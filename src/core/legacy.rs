//! Adapter for the older `route/class/objectId` calling convention.

use crate::core::errors::DispatchError;
use crate::core::types::{AuthOptions, Query, RequestDescriptor};
use reqwest::Method;
use serde_json::{Map, Value};

/// Body key that must travel in the query instead.
pub const FETCH_WHEN_SAVE_KEY: &str = "_fetchWhenSave";
/// Body key that must travel in the query instead.
pub const WHERE_KEY: &str = "_where";

/// Join the present segments as `/route/class/objectId`.
///
/// Missing and empty segments are skipped.
pub fn build_legacy_path(
    route: Option<&str>,
    class_name: Option<&str>,
    object_id: Option<&str>,
) -> String {
    [route, class_name, object_id]
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .fold(String::new(), |mut path, segment| {
            path.push('/');
            path.push_str(segment);
            path
        })
}

/// Reject reserved keys in `data`.
pub fn validate_data(data: Option<&Map<String, Value>>) -> Result<(), DispatchError> {
    let Some(data) = data else {
        return Ok(());
    };
    for key in [FETCH_WHEN_SAVE_KEY, WHERE_KEY] {
        if data.contains_key(key) {
            return Err(DispatchError::InvalidParameters(format!(
                "{} should be in the query",
                key
            )));
        }
    }
    Ok(())
}

/// Move `data` into the query for GET requests.
///
/// GET carries no body: every `data` entry whose key is not already in
/// `query` is copied over, and the returned body is `None`. Existing query
/// keys win on collision. Other methods keep `data` as the body (an empty
/// object when absent) and the query untouched.
pub fn adapt_method(
    method: &Method,
    data: Option<Map<String, Value>>,
    query: Option<Query>,
) -> (Option<Value>, Option<Query>) {
    if !method.as_str().eq_ignore_ascii_case("GET") {
        return (Some(Value::Object(data.unwrap_or_default())), query);
    }

    let Some(data) = data.filter(|d| !d.is_empty()) else {
        return (None, query);
    };

    let mut merged = query.unwrap_or_default();
    for (key, value) in data {
        merged.entry(key).or_insert(value);
    }
    (None, Some(merged))
}

/// A call in the legacy convention.
#[derive(Debug, Clone)]
pub struct LegacyRequest {
    pub route: Option<String>,
    pub class_name: Option<String>,
    pub object_id: Option<String>,
    pub method: Method,
    pub data: Option<Map<String, Value>>,
    pub query: Option<Query>,
    pub auth: AuthOptions,
}

impl LegacyRequest {
    pub fn new(method: Method) -> Self {
        Self {
            route: None,
            class_name: None,
            object_id: None,
            method,
            data: None,
            query: None,
            auth: AuthOptions::default(),
        }
    }

    #[must_use]
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }

    #[must_use]
    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    #[must_use]
    pub fn auth(mut self, auth: AuthOptions) -> Self {
        self.auth = auth;
        self
    }

    /// Validate and convert into a [`RequestDescriptor`] on the default service.
    pub fn into_descriptor(self) -> Result<RequestDescriptor, DispatchError> {
        validate_data(self.data.as_ref())?;

        let path = build_legacy_path(
            self.route.as_deref(),
            self.class_name.as_deref(),
            self.object_id.as_deref(),
        );
        let (body, query) = adapt_method(&self.method, self.data, self.query);

        let descriptor = RequestDescriptor::new(self.method, path)
            .with_body(body)
            .with_auth(self.auth);

        Ok(match query {
            Some(query) => descriptor.with_query(query),
            None => descriptor,
        })
    }
}
