//! Auth service client

use super::phone::{OneTimeCode, PhoneNumber};
use crate::error::{MotofixError, MotofixResult};
use crate::http::{ApiClient, join_url};
use crate::session::{Session, User};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Client for the remote auth microservice
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
    base_url: String,
}

#[derive(Serialize)]
struct CodeRequest<'a> {
    phone: &'a str,
}

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    phone: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    #[serde(alias = "access_token", alias = "accessToken")]
    token: String,
    user: User,
}

/// The verify endpoint answers either `{ "user": {...} }` or the bare user
#[derive(Deserialize)]
#[serde(untagged)]
enum WhoAmIResponse {
    Wrapped { user: User },
    Bare(User),
}

impl AuthClient {
    pub fn new(api: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into(),
        }
    }

    /// Ask the auth service to send a one-time code to `phone`
    pub async fn request_code(&self, phone: &PhoneNumber) -> MotofixResult<()> {
        let url = join_url(&self.base_url, "/auth/request-otp");
        let builder = self.api.request(Method::POST, &url).json(&CodeRequest {
            phone: phone.as_str(),
        });
        self.api.send(builder).await?;
        tracing::info!(phone = %phone, "one-time code requested");
        Ok(())
    }

    /// Exchange a one-time code for a bearer token and user record
    pub async fn exchange_code(
        &self,
        phone: &PhoneNumber,
        code: &OneTimeCode,
        display_name: Option<&str>,
    ) -> MotofixResult<Session> {
        let url = join_url(&self.base_url, "/auth/verify-otp");
        let builder = self.api.request(Method::POST, &url).json(&ExchangeRequest {
            phone: phone.as_str(),
            code: code.as_str(),
            name: display_name.map(str::trim).filter(|n| !n.is_empty()),
        });

        let response: ExchangeResponse = self.api.send_json(builder).await?;
        if response.token.is_empty() {
            return Err(MotofixError::json_with_context(
                "empty token",
                "Decoding credential exchange response",
            ));
        }

        Ok(Session {
            token: response.token,
            user: response.user,
        })
    }

    /// Fetch the user the stored token belongs to
    pub async fn current_user(&self) -> MotofixResult<User> {
        let url = join_url(&self.base_url, "/auth/me");
        let response: WhoAmIResponse = self
            .api
            .send_json(self.api.request(Method::GET, &url))
            .await?;
        Ok(match response {
            WhoAmIResponse::Wrapped { user } | WhoAmIResponse::Bare(user) => user,
        })
    }

    /// Invalidate `token` server-side
    ///
    /// Goes around the interceptor: the local session is already gone by the
    /// time this runs, and a 401 here must not trigger another teardown.
    pub async fn invalidate(&self, token: &str) -> MotofixResult<()> {
        let url = join_url(&self.base_url, "/auth/logout");
        let response = self
            .api
            .http()
            .post(&url)
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(MotofixError::http_with_status(
                "token invalidation rejected",
                response.status().as_u16(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::session::{Role, SessionStore};
    use crate::storage::MemorySessionStorage;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> (AuthClient, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(Arc::new(MemorySessionStorage::new())));
        let api = ApiClient::with_http_client(reqwest::Client::new(), store.clone(), EventBus::default());
        (AuthClient::new(api, server.uri()), store)
    }

    fn phone() -> PhoneNumber {
        PhoneNumber::parse("+256700000000", "256").unwrap()
    }

    #[tokio::test]
    async fn test_request_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/request-otp"))
            .and(body_json(json!({"phone": "+256700000000"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sent": true})))
            .expect(1)
            .mount(&server)
            .await;

        let (auth, _) = client(&server);
        auth.request_code(&phone()).await.unwrap();
    }

    #[tokio::test]
    async fn test_exchange_code_with_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .and(body_json(json!({"phone": "+256700000000", "code": "1234", "name": "Amina"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "jwt-abc",
                "user": {"id": 1, "phone": "+256700000000", "name": "Amina", "role": "driver"}
            })))
            .mount(&server)
            .await;

        let (auth, _) = client(&server);
        let session = auth
            .exchange_code(&phone(), &OneTimeCode::parse("1234").unwrap(), Some(" Amina "))
            .await
            .unwrap();
        assert_eq!(session.token, "jwt-abc");
        assert_eq!(session.user.id, "1");
        assert_eq!(session.user.role, Role::Driver);
    }

    #[tokio::test]
    async fn test_exchange_code_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Code has expired"})),
            )
            .mount(&server)
            .await;

        let (auth, _) = client(&server);
        let err = auth
            .exchange_code(&phone(), &OneTimeCode::parse("9999").unwrap(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, MotofixError::Validation { ref message, .. } if message == "Code has expired"));
    }

    #[tokio::test]
    async fn test_current_user_accepts_both_shapes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": "u9", "phone": "+256700000009"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u9", "phone": "+256700000009", "displayName": "Moses"
            })))
            .mount(&server)
            .await;

        let (auth, _) = client(&server);
        let first = auth.current_user().await.unwrap();
        let second = auth.current_user().await.unwrap();
        assert_eq!(first.id, "u9");
        assert_eq!(second.display_name.as_deref(), Some("Moses"));
    }

    #[tokio::test]
    async fn test_invalidate_sends_explicit_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(header("Authorization", "Bearer old-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (auth, _) = client(&server);
        auth.invalidate("old-token").await.unwrap();
    }
}
