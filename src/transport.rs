use crate::{config::AppConfig, errors::ClientError};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Thin wrapper over [`reqwest::Client`] implementing the backend's
/// REST/JSON contract.
///
/// Every call carries the session cookie (the jar is shared across the
/// client), serializes bodies as JSON, and normalizes responses: the body
/// is parsed as JSON best-effort (a non-JSON body counts as `{}`), and a
/// non-2xx status becomes a [`ClientError`] carrying the server's
/// `message`/`error` field. 401 and 403 are distinguished so the caller
/// can route the user to login or a non-privileged page.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| ClientError::Network(format!("invalid base url: {}", e)))?;

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Issues a request and returns the parsed JSON body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::Network(format!("invalid path {}: {}", path, e)))?;

        debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Best-effort JSON parse: an empty or non-JSON body is treated as {}
        let text = response.text().await?;
        let data: Value = serde_json::from_str(&text).unwrap_or_else(|_| json!({}));

        if !status.is_success() {
            warn!("{} {} failed with {}", method, path, status);
            return Err(Self::status_error(status, &data));
        }

        Ok(data)
    }

    /// Issues a request and deserializes the body into `T`.
    pub async fn send_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let data = self.send(method, path, body).await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_as(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ClientError> {
        self.send_as(Method::POST, path, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ClientError> {
        self.send_as(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_as(Method::DELETE, path, None).await
    }

    fn status_error(status: StatusCode, data: &Value) -> ClientError {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden,
            _ => ClientError::Api {
                status: status.as_u16(),
                message: server_message(data),
            },
        }
    }
}

/// Extracts the server-supplied error text from a response envelope,
/// preferring `message` over `error`, with the contract's fallback.
fn server_message(data: &Value) -> String {
    data.get("message")
        .and_then(Value::as_str)
        .or_else(|| data.get("error").and_then(Value::as_str))
        .unwrap_or("Request failed")
        .to_string()
}
