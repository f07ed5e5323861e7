use crate::core::{
    config::{GlobalConfig, SharedConfig},
    errors::TransportError,
    types::{CurrentUser, Query},
};
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Method};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Performs one HTTP call.
///
/// Retries, pooling, TLS and timeouts all live behind this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the decoded JSON payload
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `url` - Absolute URL without query string
    /// * `query` - Query parameters, not yet encoded
    /// * `body` - JSON body, if any
    /// * `headers` - Fully resolved request headers
    async fn send(
        &self,
        method: Method,
        url: &str,
        query: Option<&Query>,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value, TransportError>;
}

/// Keeps the per-service base URL table up to date.
pub trait Router: Send + Sync {
    /// Trigger a refresh. Must not block; stale routes are acceptable for
    /// the call that triggered it.
    fn refresh(&self);
}

/// Source of the logged-in user, if any.
#[async_trait]
pub trait CurrentUserProvider: Send + Sync {
    async fn current(&self) -> Option<CurrentUser>;
}

/// Router that never changes the service table.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRouter;

impl Router for NoopRouter {
    fn refresh(&self) {}
}

/// Router that pins a fixed service table into the shared configuration.
#[derive(Debug, Clone)]
pub struct StaticRouter {
    config: SharedConfig,
    server_urls: HashMap<String, String>,
}

impl StaticRouter {
    pub fn new(config: SharedConfig, server_urls: HashMap<String, String>) -> Self {
        Self {
            config,
            server_urls,
        }
    }
}

impl Router for StaticRouter {
    fn refresh(&self) {
        let server_urls = &self.server_urls;
        self.config.update(|cfg: &mut GlobalConfig| {
            for (service, url) in server_urls {
                if cfg.server_urls.get(service) != Some(url) {
                    debug!(service = %service, url = %url, "Updating service route");
                    cfg.server_urls.insert(service.clone(), url.clone());
                }
            }
        });
    }
}

/// Provider used when the application has no user session support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCurrentUser;

#[async_trait]
impl CurrentUserProvider for NoCurrentUser {
    async fn current(&self) -> Option<CurrentUser> {
        None
    }
}

/// Provider that always reports the same user.
#[derive(Debug, Clone, Default)]
pub struct StaticCurrentUser {
    user: Option<CurrentUser>,
}

impl StaticCurrentUser {
    pub fn new(user: Option<CurrentUser>) -> Self {
        Self { user }
    }
}

#[async_trait]
impl CurrentUserProvider for StaticCurrentUser {
    async fn current(&self) -> Option<CurrentUser> {
        self.user.clone()
    }
}
