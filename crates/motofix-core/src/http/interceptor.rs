//! Request interceptor
//!
//! Every call made through [`ApiClient`] carries the stored bearer token, and
//! every 401 response tears the session down: the store is cleared and the
//! event bus is told to send the user back to the sign-in screen.

use crate::error::{MotofixError, MotofixResult};
use crate::events::{Event, EventBus};
use crate::session::SessionStore;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// HTTP client with bearer injection and global 401 handling
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    store: Arc<SessionStore>,
    events: EventBus,
}

impl ApiClient {
    /// Wrap an existing reqwest client
    pub fn with_http_client(
        http: reqwest::Client,
        store: Arc<SessionStore>,
        events: EventBus,
    ) -> Self {
        Self {
            http,
            store,
            events,
        }
    }

    /// Start a request, attaching the stored bearer token when there is one
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.store.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and map non-success responses to errors
    pub async fn send(&self, builder: RequestBuilder) -> MotofixResult<Response> {
        let request = builder.build()?;
        let sent_token = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(bearer_token);
        let method = request.method().clone();
        let url = request.url().to_string();

        tracing::debug!(%method, %url, authenticated = sent_token.is_some(), "sending request");
        let response = self.http.execute(request).await?;
        let status = response.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "response received");

        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = sent_token {
                self.on_unauthorized(&token);
            }
            return Err(MotofixError::Unauthorized {
                message,
                url: Some(url),
            });
        }

        Err(MotofixError::from_status(status.as_u16(), message, Some(url)))
    }

    /// Send a request and decode a JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> MotofixResult<T> {
        let response = self.send(builder).await?;
        let url = response.url().to_string();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            MotofixError::json_with_context(e.to_string(), format!("Decoding response from {}", url))
        })
    }

    /// Underlying client, for calls that must bypass the interceptor
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    fn on_unauthorized(&self, token: &str) {
        match self.store.clear_if_current(token) {
            Ok(true) => {
                tracing::info!("credential rejected by server, session cleared");
                self.events.publish(Event::SessionExpired);
                self.events.publish(Event::navigate_to_login());
            }
            Ok(false) => {
                tracing::debug!("401 for a token that is no longer stored, ignoring");
            }
            Err(e) => {
                tracing::warn!("failed to clear session after 401: {}", e);
                self.events.publish(Event::SessionExpired);
                self.events.publish(Event::navigate_to_login());
            }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

fn bearer_token(value: &HeaderValue) -> Option<String> {
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Pull a human-readable message out of an error response
async fn error_message(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();

    let body = match response.text().await {
        Ok(body) => body,
        Err(_) => return fallback,
    };

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        for field in ["message", "error", "detail"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.len() > 500 {
        fallback
    } else {
        trimmed.to_string()
    }
}
