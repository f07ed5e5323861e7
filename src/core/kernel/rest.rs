use crate::core::config::ConfigError;
use crate::core::errors::TransportError;
use crate::core::traits::Transport;
use crate::core::types::Query;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use tracing::{instrument, trace};

/// Configuration for the reqwest transport
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Name used in tracing spans
    pub name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            name: "baas".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl TransportConfig {
    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the name reported in tracing spans
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Builder for [`ReqwestTransport`]
#[derive(Debug, Default)]
pub struct ReqwestTransportBuilder {
    config: TransportConfig,
    client: Option<Client>,
}

impl ReqwestTransportBuilder {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Use an existing client instead of building one
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, ConfigError> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(std::time::Duration::from_secs(self.config.timeout_seconds))
                .build()
                .map_err(|e| {
                    ConfigError::InvalidConfiguration(format!(
                        "Failed to build HTTP client: {}",
                        e
                    ))
                })?,
        };

        Ok(ReqwestTransport {
            client,
            config: self.config,
        })
    }
}

/// [`Transport`] backed by reqwest
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Create a transport with default settings
    pub fn new() -> Result<Self, ConfigError> {
        ReqwestTransportBuilder::default().build()
    }

    /// Encode query values: strings verbatim, everything else as compact JSON
    fn query_pairs(query: &Query) -> Vec<(&str, String)> {
        query
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.as_str(), value)
            })
            .collect()
    }

    /// Handle the response and extract JSON
    #[instrument(skip(self, response), fields(transport = %self.config.name, status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<Value, TransportError> {
        let status = response.status();
        let response_text = response.text().await.map_err(|e| TransportError::Failed {
            code: Some(i64::from(status.as_u16())),
            message: format!("Failed to read response body: {}", e),
        })?;

        trace!("Response body: {}", response_text);

        if status.is_success() {
            if response_text.is_empty() {
                return Ok(Value::Object(serde_json::Map::new()));
            }
            let value: Value = match serde_json::from_str(&response_text) {
                Ok(value) => value,
                Err(_) => {
                    return Err(TransportError::Text {
                        status: status.as_u16(),
                        response_text,
                    });
                }
            };
            if is_error_envelope(&value) {
                return Err(TransportError::Structured {
                    status: status.as_u16(),
                    response: value,
                });
            }
            Ok(value)
        } else {
            Err(TransportError::Text {
                status: status.as_u16(),
                response_text,
            })
        }
    }
}

/// An object with a numeric `code` and a string `error` is a failure even on 2xx.
fn is_error_envelope(value: &Value) -> bool {
    value.get("code").is_some_and(Value::is_i64) && value.get("error").is_some_and(Value::is_string)
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, query, body, headers), fields(transport = %self.config.name, method = %method, url = %url))]
    async fn send(
        &self,
        method: Method,
        url: &str,
        query: Option<&Query>,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value, TransportError> {
        let mut request = self.client.request(method, url).headers(headers);

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            request = request.query(&Self::query_pairs(query));
        }

        if let Some(body) = body {
            let body_bytes = serde_json::to_vec(body).map_err(|e| TransportError::Failed {
                code: None,
                message: format!("Failed to serialize request body: {}", e),
            })?;
            request = request.body(body_bytes);
        }

        let response = request.send().await.map_err(|e| TransportError::Failed {
            code: e.status().map(|s| i64::from(s.as_u16())),
            message: format!("Request failed: {}", e),
        })?;

        self.handle_response(response).await
    }
}
