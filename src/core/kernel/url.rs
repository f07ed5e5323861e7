use crate::core::config::{ConfigError, GlobalConfig};

/// Build the absolute URL of `path` on `service`.
///
/// Exactly one `/` separates the base URL from the version; `path` is
/// appended verbatim and is expected to start with `/` or be empty.
/// Query encoding is left to the transport.
pub fn build_url(
    config: &GlobalConfig,
    service: &str,
    version: &str,
    path: &str,
) -> Result<String, ConfigError> {
    let base = config
        .server_url(service)
        .ok_or_else(|| ConfigError::MissingServerUrl(service.to_string()))?;

    let base = base.trim_end_matches('/');
    let version = version.trim_start_matches('/');

    Ok(format!("{}/{}{}", base, version, path))
}
