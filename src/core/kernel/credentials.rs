use crate::core::config::{ConfigError, Credentials, GlobalConfig};
use crate::core::kernel::signer::{sign_key, MASTER_KEY_SUFFIX};
use crate::core::types::AuthOptions;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::warn;

pub const KEY_HEADER: HeaderName = HeaderName::from_static("x-lc-key");
pub const SIGN_HEADER: HeaderName = HeaderName::from_static("x-lc-sign");

/// The one authentication header of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    pub name: HeaderName,
    pub value: String,
}

impl AuthHeader {
    pub fn header_value(&self) -> Result<HeaderValue, ConfigError> {
        let mut value = HeaderValue::from_str(&self.value)
            .map_err(|_| ConfigError::InvalidHeader(self.name.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Whether a call should use the master key.
///
/// Per-call options win over the global default, including an explicit
/// `false`; with neither set the standard key is used.
pub fn use_master_key(config: &GlobalConfig, auth: &AuthOptions) -> bool {
    auth.use_master_key
        .or(config.use_master_key)
        .unwrap_or(false)
}

/// Pick the key for this call and encode it as either `X-LC-Sign` or `X-LC-Key`.
///
/// Requesting the master key without one configured is not fatal: a warning
/// is logged and the application key is used instead. Returns
/// `MissingCredentials` only when the chosen branch has no key at all.
pub fn resolve_auth_header(
    credentials: &Credentials,
    config: &GlobalConfig,
    auth: &AuthOptions,
    sign: bool,
) -> Result<AuthHeader, ConfigError> {
    if use_master_key(config, auth) {
        if let Some(master_key) = credentials.master_key_secret() {
            return Ok(if sign {
                AuthHeader {
                    name: SIGN_HEADER,
                    value: sign_key(master_key, true),
                }
            } else {
                AuthHeader {
                    name: KEY_HEADER,
                    value: format!("{},{}", master_key, MASTER_KEY_SUFFIX),
                }
            });
        }
        warn!(
            app_id = %credentials.app_id,
            "masterKey is not set, falling back to the application key"
        );
    }

    let app_key = credentials.app_key_secret().ok_or_else(|| {
        ConfigError::MissingCredentials("application key is not set".to_string())
    })?;

    Ok(if sign {
        AuthHeader {
            name: SIGN_HEADER,
            value: sign_key(app_key, false),
        }
    } else {
        AuthHeader {
            name: KEY_HEADER,
            value: app_key.to_string(),
        }
    })
}
