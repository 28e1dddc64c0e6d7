use std::collections::HashMap;
use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::dtos::{ChatCompletionRequest, ChatCompletionResponse};

/// Failure talking to an upstream HTTP service. Carries the cause for the
/// logs; clients only ever see a generic message.
#[derive(Debug)]
pub enum UpstreamError {
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
    MissingChoice,
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Transport(e) => write!(f, "request failed: {}", e),
            UpstreamError::Status { status, body } => {
                write!(f, "upstream answered {}: {}", status, body)
            }
            UpstreamError::MissingChoice => write!(f, "response contained no choices"),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Transport(e)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status { status, body })
}

/// Chat-completion client for the language model provider.
///
/// Cloning is cheap because reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct LlmClient {
    pub conn: reqwest::Client,
    llm_url: String,
    api_key: String,
    model_name: String,
}

impl LlmClient {
    pub fn new(conn: reqwest::Client, llm_url: &str, api_key: &str, model_name: &str) -> Self {
        Self {
            conn,
            llm_url: llm_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model_name: model_name.to_string(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// POST `{llm_url}/v1/chat/completions` and return the first choice's
    /// message text. A null content comes back as an empty string.
    ///
    /// No retries and no client-side timeout beyond reqwest's defaults.
    pub async fn chat(&self, request: &ChatCompletionRequest) -> Result<String, UpstreamError> {
        let full_url = format!("{}/v1/chat/completions", self.llm_url);

        let response = self
            .conn
            .post(full_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let completion: ChatCompletionResponse = ensure_success(response).await?.json().await?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(UpstreamError::MissingChoice)?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct AdminUserList {
    #[serde(default)]
    users: Vec<AdminUser>,
}

#[derive(Debug, Deserialize)]
struct AdminUser {
    id: Uuid,
    email: Option<String>,
}

/// Privileged client for the identity provider's admin API
/// (`{AUTH_ADMIN_URL}/admin/users`).
///
/// Disabled when either the URL or the service key is not configured; the
/// user listing then degrades to profile-only data.
#[derive(Clone)]
pub struct AuthAdminClient {
    conn: reqwest::Client,
    endpoint: Option<(String, String)>,
}

impl AuthAdminClient {
    pub fn new(conn: reqwest::Client, url: Option<&str>, service_key: Option<&str>) -> Self {
        let endpoint = match (url, service_key) {
            (Some(url), Some(key)) => Some((url.trim_end_matches('/').to_string(), key.to_string())),
            _ => None,
        };
        Self { conn, endpoint }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Emails keyed by identity id. `Ok(None)` when the client is disabled.
    pub async fn list_emails(&self) -> Result<Option<HashMap<Uuid, String>>, UpstreamError> {
        let Some((url, key)) = &self.endpoint else {
            return Ok(None);
        };

        let response = self
            .conn
            .get(format!("{}/admin/users", url))
            .query(&[("page", "1"), ("per_page", "1000")])
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await?;

        let list: AdminUserList = ensure_success(response).await?.json().await?;

        Ok(Some(
            list.users
                .into_iter()
                .filter_map(|user| user.email.map(|email| (user.id, email)))
                .collect(),
        ))
    }

    /// Delete the identity. Returns `false` when the client is disabled.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool, UpstreamError> {
        let Some((url, key)) = &self.endpoint else {
            return Ok(false);
        };

        let response = self
            .conn
            .delete(format!("{}/admin/users/{}", url, user_id))
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::ChatMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4-turbo-preview".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            temperature: 0.7,
            max_tokens: 1000,
            response_format: None,
        }
    }

    #[tokio::test]
    async fn chat_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4-turbo-preview",
                "max_tokens": 1000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }]
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(
            reqwest::Client::new(),
            &format!("{}/", server.uri()),
            "sk-test",
            "gpt-4-turbo-preview",
        );
        assert_eq!(client.chat(&request()).await.unwrap(), "Hi there");
    }

    #[tokio::test]
    async fn null_content_is_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": null } }]
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(reqwest::Client::new(), &server.uri(), "k", "m");
        assert_eq!(client.chat(&request()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn provider_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = LlmClient::new(reqwest::Client::new(), &server.uri(), "k", "m");
        match client.chat(&request()).await {
            Err(UpstreamError::Status { status, body }) => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = LlmClient::new(reqwest::Client::new(), &server.uri(), "k", "m");
        assert!(matches!(
            client.chat(&request()).await,
            Err(UpstreamError::MissingChoice)
        ));
    }

    #[tokio::test]
    async fn disabled_admin_client_skips_the_lookup() {
        let client = AuthAdminClient::new(reqwest::Client::new(), Some("http://x"), None);
        assert!(!client.is_enabled());
        assert!(client.list_emails().await.unwrap().is_none());
        assert!(!client.delete_user(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn admin_client_maps_emails_by_id() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .and(header("apikey", "service"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "users": [
                    { "id": id, "email": "ana@example.com" },
                    { "id": Uuid::new_v4(), "email": null }
                ]
            })))
            .mount(&server)
            .await;

        let client =
            AuthAdminClient::new(reqwest::Client::new(), Some(server.uri().as_str()), Some("service"));
        let emails = client.list_emails().await.unwrap().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails.get(&id).map(String::as_str), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn admin_lookup_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client =
            AuthAdminClient::new(reqwest::Client::new(), Some(server.uri().as_str()), Some("bad"));
        assert!(client.list_emails().await.is_err());
    }
}
