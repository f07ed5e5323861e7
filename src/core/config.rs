use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, PoisonError, RwLock};

/// Service name used when a request does not name one.
pub const DEFAULT_SERVICE: &str = "api";

/// User agent sent when the application does not configure its own.
pub const DEFAULT_USER_AGENT: &str = concat!("baas-dispatch/", env!("CARGO_PKG_VERSION"));

/// Application credentials used to authenticate every request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_key: Option<Secret<String>>,
    pub master_key: Option<Secret<String>>,
    pub hook_key: Option<Secret<String>>,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for Credentials {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        fn redacted(value: Option<&Secret<String>>) -> Option<&'static str> {
            value.map(|_| "[REDACTED]")
        }

        let mut state = serializer.serialize_struct("Credentials", 4)?;
        state.serialize_field("app_id", &self.app_id)?;
        state.serialize_field("app_key", &redacted(self.app_key.as_ref()))?;
        state.serialize_field("master_key", &redacted(self.master_key.as_ref()))?;
        state.serialize_field("hook_key", &redacted(self.hook_key.as_ref()))?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Credentials {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CredentialsHelper {
            app_id: String,
            app_key: Option<String>,
            master_key: Option<String>,
            hook_key: Option<String>,
        }

        let helper = CredentialsHelper::deserialize(deserializer)?;
        Ok(Self {
            app_id: helper.app_id,
            app_key: helper.app_key.map(Secret::new),
            master_key: helper.master_key.map(Secret::new),
            hook_key: helper.hook_key.map(Secret::new),
        })
    }
}

impl Credentials {
    /// Create credentials with the application id and the standard application key
    #[must_use]
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_key: non_empty(app_key.into()).map(Secret::new),
            master_key: None,
            hook_key: None,
        }
    }

    /// Create credentials that only carry the administrative key
    #[must_use]
    pub fn with_only_master_key(app_id: impl Into<String>, master_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_key: None,
            master_key: non_empty(master_key.into()).map(Secret::new),
            hook_key: None,
        }
    }

    /// Create credentials from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_APP_ID` (required)
    /// - `{PREFIX}_APP_KEY` (optional)
    /// - `{PREFIX}_MASTER_KEY` (optional)
    /// - `{PREFIX}_HOOK_KEY` (optional)
    ///
    /// At least one of the two keys must be present.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let app_id_var = format!("{}_APP_ID", prefix);

        let app_id = env::var(&app_id_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(app_id_var))?;

        let read = |suffix: &str| {
            env::var(format!("{}_{}", prefix, suffix))
                .ok()
                .and_then(non_empty)
                .map(Secret::new)
        };

        let credentials = Self {
            app_id,
            app_key: read("APP_KEY"),
            master_key: read("MASTER_KEY"),
            hook_key: read("HOOK_KEY"),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Create credentials from .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Create credentials from a specific .env file path
    ///
    /// A missing file is not an error; the process environment is used as-is.
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        load_env_file(env_file_path)?;
        Self::from_env(prefix)
    }

    /// Set the administrative key
    #[must_use]
    pub fn master_key(mut self, master_key: impl Into<String>) -> Self {
        self.master_key = non_empty(master_key.into()).map(Secret::new);
        self
    }

    /// Set the hook key
    #[must_use]
    pub fn hook_key(mut self, hook_key: impl Into<String>) -> Self {
        self.hook_key = non_empty(hook_key.into()).map(Secret::new);
        self
    }

    /// A request may only proceed with an application id and at least one key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.is_empty() {
            return Err(ConfigError::MissingCredentials(
                "application id is not set".to_string(),
            ));
        }
        if self.app_key.is_none() && self.master_key.is_none() {
            return Err(ConfigError::MissingCredentials(
                "neither the application key nor the master key is set".to_string(),
            ));
        }
        Ok(())
    }

    /// Get application key (use carefully - exposes secret)
    pub fn app_key_secret(&self) -> Option<&str> {
        self.app_key.as_ref().map(|s| s.expose_secret().as_str())
    }

    /// Get master key (use carefully - exposes secret)
    pub fn master_key_secret(&self) -> Option<&str> {
        self.master_key.as_ref().map(|s| s.expose_secret().as_str())
    }

    /// Get hook key (use carefully - exposes secret)
    pub fn hook_key_secret(&self) -> Option<&str> {
        self.hook_key.as_ref().map(|s| s.expose_secret().as_str())
    }
}

/// Process-wide settings read by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default for "use the master key"; `None` means unset.
    pub use_master_key: Option<bool>,
    /// Production/staging selector; `None` sends no production header.
    pub production: Option<bool>,
    /// Base URL per service name.
    pub server_urls: HashMap<String, String>,
    pub user_agent: String,
    /// Skip the current-user lookup when no session token is passed explicitly.
    pub disable_current_user: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            use_master_key: None,
            production: None,
            server_urls: HashMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            disable_current_user: false,
        }
    }
}

impl GlobalConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_API_SERVER` (base URL of the `api` service)
    /// - `{PREFIX}_PRODUCTION` (optional, `true`/`false`/`1`/`0`)
    /// - `{PREFIX}_USE_MASTER_KEY` (optional, `true`/`false`/`1`/`0`)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let server_var = format!("{}_API_SERVER", prefix);

        let server = env::var(&server_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(server_var))?;

        let flag = |suffix: &str| -> Result<Option<bool>, ConfigError> {
            let name = format!("{}_{}", prefix, suffix);
            env::var(&name).ok().map_or(Ok(None), |raw| {
                parse_flag(&raw).map(Some).ok_or_else(|| {
                    ConfigError::InvalidConfiguration(format!(
                        "{} must be a boolean, got '{}'",
                        name, raw
                    ))
                })
            })
        };

        Ok(Self {
            use_master_key: flag("USE_MASTER_KEY")?,
            production: flag("PRODUCTION")?,
            ..Self::default()
        }
        .with_server_url(DEFAULT_SERVICE, server))
    }

    /// Set the default for using the master key
    #[must_use]
    pub const fn with_use_master_key(mut self, use_master_key: bool) -> Self {
        self.use_master_key = Some(use_master_key);
        self
    }

    /// Set production mode
    #[must_use]
    pub const fn with_production(mut self, production: bool) -> Self {
        self.production = Some(production);
        self
    }

    /// Set the base URL of a service
    #[must_use]
    pub fn with_server_url(mut self, service: impl Into<String>, url: impl Into<String>) -> Self {
        self.server_urls.insert(service.into(), url.into());
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Disable the automatic current-user session lookup
    #[must_use]
    pub const fn with_disable_current_user(mut self, disable: bool) -> Self {
        self.disable_current_user = disable;
        self
    }

    pub fn server_url(&self, service: &str) -> Option<&str> {
        self.server_urls.get(service).map(String::as_str)
    }
}

/// Shared, mutable handle around [`GlobalConfig`].
///
/// Requests never hold the lock across an await point: they take a
/// [`snapshot`](Self::snapshot) once and work on that copy.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<GlobalConfig>>,
}

impl SharedConfig {
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Consistent copy of the current configuration.
    pub fn snapshot(&self) -> GlobalConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate the configuration in place, e.g. after re-routing.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut GlobalConfig),
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

impl From<GlobalConfig> for SharedConfig {
    fn from(config: GlobalConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(feature = "env-file")]
fn load_env_file(env_file_path: &str) -> Result<(), ConfigError> {
    match dotenv::from_path(env_file_path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::InvalidConfiguration(format!(
            "Failed to load .env file '{}': {}",
            env_file_path, e
        ))),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("No server URL configured for service '{0}'")]
    MissingServerUrl(String),

    #[error("Invalid header value for {0}")]
    InvalidHeader(String),
}
