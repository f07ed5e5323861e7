use crate::core::config::{ConfigError, Credentials, GlobalConfig, SharedConfig};
use crate::core::errors::{DispatchError, NormalizedError};
use crate::core::kernel::headers::{base_headers, resolve_session};
use crate::core::kernel::normalize::normalize;
use crate::core::kernel::rest::ReqwestTransport;
use crate::core::kernel::url::build_url;
use crate::core::legacy::LegacyRequest;
use crate::core::traits::{CurrentUserProvider, NoCurrentUser, NoopRouter, Router, Transport};
use crate::core::types::{Platform, RequestDescriptor};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, debug_span, instrument, Instrument};

/// Pending result of a dispatched call.
pub type DispatchFuture = BoxFuture<'static, Result<Value, NormalizedError>>;

/// Builder for [`Dispatcher`]
pub struct DispatcherBuilder {
    credentials: Credentials,
    config: SharedConfig,
    transport: Option<Arc<dyn Transport>>,
    router: Arc<dyn Router>,
    users: Arc<dyn CurrentUserProvider>,
    platform: Platform,
}

impl DispatcherBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            config: SharedConfig::default(),
            transport: None,
            router: Arc::new(NoopRouter),
            users: Arc::new(NoCurrentUser),
            platform: Platform::default(),
        }
    }

    /// Share an existing configuration handle
    pub fn with_shared_config(mut self, config: SharedConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_config(self, config: GlobalConfig) -> Self {
        self.with_shared_config(SharedConfig::new(config))
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = router;
        self
    }

    pub fn with_current_user(mut self, users: Arc<dyn CurrentUserProvider>) -> Self {
        self.users = users;
        self
    }

    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Build the dispatcher
    ///
    /// Falls back to a default [`ReqwestTransport`] when none was given.
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        self.credentials.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(Dispatcher {
            credentials: Arc::new(self.credentials),
            config: self.config,
            transport,
            router: self.router,
            users: self.users,
            platform: self.platform,
        })
    }
}

/// Turns [`RequestDescriptor`]s into authenticated calls.
///
/// Cheap to clone; every call works on its own configuration snapshot and
/// performs its own current-user lookup.
#[derive(Clone)]
pub struct Dispatcher {
    credentials: Arc<Credentials>,
    config: SharedConfig,
    transport: Arc<dyn Transport>,
    router: Arc<dyn Router>,
    users: Arc<dyn CurrentUserProvider>,
    platform: Platform,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn builder(credentials: Credentials) -> DispatcherBuilder {
        DispatcherBuilder::new(credentials)
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Start a call.
    ///
    /// Credentials, the service URL and the static headers are checked here,
    /// before anything touches the network; those failures come back as
    /// [`DispatchError`]. Everything that fails later resolves the returned
    /// future to a [`NormalizedError`].
    pub fn dispatch(&self, descriptor: RequestDescriptor) -> Result<DispatchFuture, DispatchError> {
        self.credentials.validate()?;

        let request = descriptor.into_parts();
        let span = debug_span!(
            "dispatch",
            service = %request.service,
            method = %request.method,
            path = %request.path,
        );

        self.router.refresh();
        let config = self.config.snapshot();

        let url = build_url(&config, &request.service, &request.version, &request.path)?;
        let headers = base_headers(
            &self.credentials,
            &config,
            &request.auth,
            self.platform,
            request.sign_key,
        )?;

        let body = if carries_body(&request.method) {
            request.body
        } else {
            None
        };

        let transport = Arc::clone(&self.transport);
        let users = Arc::clone(&self.users);

        let call = async move {
            let headers = resolve_session(headers, &config, &request.auth, users.as_ref())
                .await
                .map_err(|e| match e {
                    ConfigError::InvalidHeader(_) => {
                        NormalizedError::unknown(Some("invalid session token header".to_string()))
                    }
                    other => NormalizedError::unknown(Some(other.to_string())),
                })?;

            transport
                .send(
                    request.method,
                    &url,
                    request.query.as_ref(),
                    body.as_ref(),
                    headers,
                )
                .await
                .map_err(|err| {
                    let normalized = normalize(&err);
                    debug!(code = normalized.code, error = %err, "Request failed");
                    normalized
                })
        };

        Ok(call.instrument(span).boxed())
    }

    /// Dispatch and wait, folding both error channels into [`DispatchError`].
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<Value, DispatchError> {
        Ok(self.dispatch(descriptor)?.await?)
    }

    /// Dispatch, wait, and deserialize the payload.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, DispatchError> {
        let value = self.send(descriptor).await?;
        serde_json::from_value(value).map_err(|e| {
            NormalizedError::unknown(Some(format!("Failed to deserialize JSON: {}", e))).into()
        })
    }

    /// Issue a call through the legacy route/class/object adapter.
    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn legacy_request(&self, request: LegacyRequest) -> Result<Value, DispatchError> {
        let descriptor = request.into_descriptor()?;
        self.send(descriptor).await
    }
}

/// GET and HEAD requests never carry a body.
fn carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}
