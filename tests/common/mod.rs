#![allow(dead_code)]

use async_trait::async_trait;
use baas_dispatch::core::types::Query;
use baas_dispatch::{
    CurrentUser, CurrentUserProvider, Credentials, GlobalConfig, Router, Transport, TransportError,
};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One call seen by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub query: Option<Query>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

/// Transport that records every call and replies with a canned result.
pub struct RecordingTransport {
    reply: Result<Value, TransportError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn ok(value: Value) -> Self {
        Self {
            reply: Ok(value),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: TransportError) -> Self {
        Self {
            reply: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        query: Option<&Query>,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            query: query.cloned(),
            body: body.cloned(),
            headers,
        });
        self.reply.clone()
    }
}

/// Current-user provider that counts lookups.
pub struct CountingUsers {
    token: Option<String>,
    delay: Duration,
    lookups: AtomicUsize,
}

impl CountingUsers {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token.map(str::to_string),
            delay: Duration::ZERO,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CurrentUserProvider for CountingUsers {
    async fn current(&self) -> Option<CurrentUser> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Some(CurrentUser {
            session_token: self.token.clone(),
        })
    }
}

/// Router that counts refreshes.
#[derive(Default)]
pub struct CountingRouter {
    refreshes: AtomicUsize,
}

impl CountingRouter {
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl Router for CountingRouter {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn test_credentials() -> Credentials {
    Credentials::new("test-app-id", "test-app-key").master_key("test-master-key")
}

pub fn test_config() -> GlobalConfig {
    GlobalConfig::new()
        .with_server_url("api", "https://api.example.com/")
        .with_user_agent("baas-dispatch-tests")
}
