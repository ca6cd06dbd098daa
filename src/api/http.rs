// SPDX-License-Identifier: MIT
//! HTTP transport wrapper.
//!
//! One request core shared by every domain call. Request bodies are
//! serialized as JSON. Responses parse under a single rule set: a 204, a
//! zero content-length, or a non-JSON content type means "no body" and is
//! never a failure. A non-2xx status always becomes a typed [`ApiError`]
//! carrying the extracted message, the status code, and the raw payload for
//! diagnostics.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const FALLBACK_MESSAGE: &str = "Request failed";

/// Typed failure surface of the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Server {
        status: u16,
        /// Server-supplied `error` field, else the HTTP status reason,
        /// else a fixed fallback.
        message: String,
        /// Raw parsed body, kept for diagnostic use.
        payload: Option<Value>,
    },
    /// The request never produced a usable response (connect, timeout,
    /// body read).
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    /// A 2xx response that should have carried a JSON document did not.
    #[error("response body was empty or not JSON")]
    MissingBody,
    /// A 2xx JSON body that does not match the expected shape.
    #[error("failed to decode server response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code, when the failure came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin request core over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct Http {
    client: reqwest::Client,
    base_url: String,
}

impl Http {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a JSON document. An empty body is an error here: list and
    /// status endpoints always answer with a document.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.client.get(self.url(path)))
            .await?
            .ok_or(ApiError::MissingBody)
    }

    /// GET where the response body, if any, is ignored (health ping).
    pub async fn get_ok(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<Value>(self.client.get(self.url(path)))
            .await
            .map(|_| ())
    }

    /// POST a JSON body; the response document is optional.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.client.post(self.url(path)).json(body))
            .await
    }

    /// POST with no body and no expected response document (fire-and-confirm).
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<Value>(self.client.post(self.url(path)))
            .await
            .map(|_| ())
    }

    /// DELETE with a JSON body; the response document is ignored.
    pub async fn delete<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.execute::<Value>(self.client.delete(self.url(path)).json(body))
            .await
            .map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let payload = parse_body(response).await;

        if !status.is_success() {
            let message = extract_error_message(status, payload.as_ref());
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
                payload,
            });
        }

        match payload {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

/// Parse a response body under the no-body rules. Unreadable or malformed
/// JSON degrades to "no body"; the status code alone decides success.
async fn parse_body(response: reqwest::Response) -> Option<Value> {
    if response.status() == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
        return None;
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));
    if !is_json {
        return None;
    }

    response.json::<Value>().await.ok()
}

fn extract_error_message(status: StatusCode, payload: Option<&Value>) -> String {
    if let Some(Value::String(message)) = payload.and_then(|value| value.get("error")) {
        if !message.trim().is_empty() {
            return message.clone();
        }
    }

    if let Some(reason) = status.canonical_reason() {
        return reason.to_string();
    }

    FALLBACK_MESSAGE.to_string()
}
