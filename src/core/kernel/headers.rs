use crate::core::config::{ConfigError, Credentials, GlobalConfig};
use crate::core::kernel::credentials::resolve_auth_header;
use crate::core::traits::CurrentUserProvider;
use crate::core::types::{AuthOptions, Platform};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, instrument};

pub const ID_HEADER: HeaderName = HeaderName::from_static("x-lc-id");
pub const HOOK_KEY_HEADER: HeaderName = HeaderName::from_static("x-lc-hook-key");
/// Production/staging selector, sent as `1` or `0`.
pub const PROD_HEADER: HeaderName = HeaderName::from_static("x-lc-prod");
pub const SESSION_HEADER: HeaderName = HeaderName::from_static("x-lc-session");
pub const CLIENT_UA_HEADER: HeaderName = HeaderName::from_static("x-lc-ua");

pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Build every header that does not depend on the session.
///
/// This never suspends and performs no I/O.
pub fn base_headers(
    credentials: &Credentials,
    config: &GlobalConfig,
    auth: &AuthOptions,
    platform: Platform,
    sign: bool,
) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    headers.insert(ID_HEADER, header_value(&ID_HEADER, &credentials.app_id)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

    let auth_header = resolve_auth_header(credentials, config, auth, sign)?;
    headers.insert(auth_header.name.clone(), auth_header.header_value()?);

    if let Some(hook_key) = credentials.hook_key_secret() {
        let mut value = header_value(&HOOK_KEY_HEADER, hook_key)?;
        value.set_sensitive(true);
        headers.insert(HOOK_KEY_HEADER, value);
    }

    if let Some(production) = config.production {
        let value = if production { "1" } else { "0" };
        headers.insert(PROD_HEADER, HeaderValue::from_static(value));
    }

    let ua_header = match platform {
        Platform::Server => USER_AGENT,
        Platform::Client => CLIENT_UA_HEADER,
    };
    let ua_value = header_value(&ua_header, &config.user_agent)?;
    headers.insert(ua_header, ua_value);

    Ok(headers)
}

/// Attach `X-LC-Session` to `headers`.
///
/// An explicit token in `auth` is used as-is. Otherwise, unless the lookup is
/// disabled, `users` is queried once; an empty token is ignored.
pub async fn resolve_session(
    mut headers: HeaderMap,
    config: &GlobalConfig,
    auth: &AuthOptions,
    users: &dyn CurrentUserProvider,
) -> Result<HeaderMap, ConfigError> {
    let token = match &auth.session_token {
        Some(token) => Some(token.clone()),
        None if config.disable_current_user => None,
        None => {
            let user = users.current().await;
            debug!(found = user.is_some(), "Resolved current user");
            user.and_then(|u| u.session_token)
        }
    };

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let mut value = header_value(&SESSION_HEADER, &token)?;
        value.set_sensitive(true);
        headers.insert(SESSION_HEADER, value);
    }

    Ok(headers)
}

/// Build the complete header set for one call.
#[instrument(skip_all, fields(app_id = %credentials.app_id, platform = %platform))]
pub async fn build_headers(
    credentials: &Credentials,
    config: &GlobalConfig,
    auth: &AuthOptions,
    platform: Platform,
    sign: bool,
    users: &dyn CurrentUserProvider,
) -> Result<HeaderMap, ConfigError> {
    let headers = base_headers(credentials, config, auth, platform, sign)?;
    resolve_session(headers, config, auth, users).await
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::credentials::{KEY_HEADER, SIGN_HEADER};
    use crate::core::traits::{NoCurrentUser, StaticCurrentUser};
    use crate::core::types::CurrentUser;

    fn credentials() -> Credentials {
        Credentials::new("app-id", "app-key")
    }

    fn config() -> GlobalConfig {
        GlobalConfig::new().with_user_agent("test-agent/1.0")
    }

    #[test]
    fn test_base_headers_minimal() {
        let headers = base_headers(
            &credentials(),
            &config(),
            &AuthOptions::new(),
            Platform::Server,
            false,
        )
        .unwrap();

        assert_eq!(headers[ID_HEADER], "app-id");
        assert_eq!(headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(headers[KEY_HEADER], "app-key");
        assert_eq!(headers[USER_AGENT], "test-agent/1.0");
        assert!(!headers.contains_key(SIGN_HEADER));
        assert!(!headers.contains_key(HOOK_KEY_HEADER));
        assert!(!headers.contains_key(PROD_HEADER));
        assert!(!headers.contains_key(CLIENT_UA_HEADER));
    }

    #[test]
    fn test_signed_and_plain_are_exclusive() {
        let headers = base_headers(
            &credentials(),
            &config(),
            &AuthOptions::new(),
            Platform::Server,
            true,
        )
        .unwrap();

        assert!(headers.contains_key(SIGN_HEADER));
        assert!(!headers.contains_key(KEY_HEADER));
    }

    #[test]
    fn test_optional_headers() {
        let credentials = credentials().hook_key("hook");
        let config = config().with_production(false);

        let headers = base_headers(
            &credentials,
            &config,
            &AuthOptions::new(),
            Platform::Client,
            false,
        )
        .unwrap();

        assert_eq!(headers[HOOK_KEY_HEADER], "hook");
        assert_eq!(headers[PROD_HEADER], "0");
        assert_eq!(headers[CLIENT_UA_HEADER], "test-agent/1.0");
        assert!(!headers.contains_key(USER_AGENT));

        let headers = base_headers(
            &credentials,
            &config.with_production(true),
            &AuthOptions::new(),
            Platform::Client,
            false,
        )
        .unwrap();
        assert_eq!(headers[PROD_HEADER], "1");
    }

    #[test]
    fn test_invalid_header_value() {
        let credentials = Credentials::new("app\nid", "app-key");
        let result = base_headers(
            &credentials,
            &config(),
            &AuthOptions::new(),
            Platform::Server,
            false,
        );
        assert!(matches!(result, Err(ConfigError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_explicit_session_token_wins() {
        let users = StaticCurrentUser::new(Some(CurrentUser::with_session_token("from-user")));
        let auth = AuthOptions::new().with_session_token("explicit");

        let headers = build_headers(
            &credentials(),
            &config(),
            &auth,
            Platform::Server,
            true,
            &users,
        )
        .await
        .unwrap();

        assert_eq!(headers[SESSION_HEADER], "explicit");
    }

    #[tokio::test]
    async fn test_session_from_current_user() {
        let users = StaticCurrentUser::new(Some(CurrentUser::with_session_token("from-user")));

        let headers = build_headers(
            &credentials(),
            &config(),
            &AuthOptions::new(),
            Platform::Server,
            true,
            &users,
        )
        .await
        .unwrap();

        assert_eq!(headers[SESSION_HEADER], "from-user");
        // Session resolution only adds to the base headers.
        assert_eq!(headers[ID_HEADER], "app-id");
        assert!(headers.contains_key(SIGN_HEADER));
    }

    #[tokio::test]
    async fn test_session_lookup_disabled() {
        let users = StaticCurrentUser::new(Some(CurrentUser::with_session_token("from-user")));

        let headers = build_headers(
            &credentials(),
            &config().with_disable_current_user(true),
            &AuthOptions::new(),
            Platform::Server,
            true,
            &users,
        )
        .await
        .unwrap();

        assert!(!headers.contains_key(SESSION_HEADER));
    }

    #[tokio::test]
    async fn test_empty_or_missing_session_is_skipped() {
        let users = StaticCurrentUser::new(Some(CurrentUser::default()));
        let headers = build_headers(
            &credentials(),
            &config(),
            &AuthOptions::new(),
            Platform::Server,
            true,
            &users,
        )
        .await
        .unwrap();
        assert!(!headers.contains_key(SESSION_HEADER));

        let headers = build_headers(
            &credentials(),
            &config(),
            &AuthOptions::new().with_session_token(""),
            Platform::Server,
            true,
            &NoCurrentUser,
        )
        .await
        .unwrap();
        assert!(!headers.contains_key(SESSION_HEADER));
    }
}
