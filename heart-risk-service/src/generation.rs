//! Client for the external text-generation (chat completions) API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::ReportError;

pub const DEFAULT_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "mistral-small-latest";

/// Turns a prompt into report text.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ReportError>;
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 3000,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Mistral chat-completions client.
///
/// No request timeout is configured; a hung upstream call only stalls the
/// request that issued it.
#[derive(Clone)]
pub struct MistralClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    settings: GenerationSettings,
}

impl MistralClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }
}

#[async_trait]
impl ReportGenerator for MistralClient {
    async fn generate(&self, prompt: &str) -> Result<String, ReportError> {
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
        };

        info!(model = %self.settings.model, "Requesting report from generation API");

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Generation API returned {}: {}", status, body);
            return Err(ReportError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        extract_report(&body)
    }
}

/// Pull the first completion's message content out of a response body.
pub fn extract_report(body: &str) -> Result<String, ReportError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ReportError::MalformedUpstream(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ReportError::MalformedUpstream("no completion content returned".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Clone)]
    struct MockProvider {
        status: StatusCode,
        reply: Value,
        captured: Arc<Mutex<Option<(Option<String>, Value)>>>,
    }

    async fn complete(
        State(provider): State<MockProvider>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *provider.captured.lock().unwrap() = Some((auth, body));
        (provider.status, Json(provider.reply.clone()))
    }

    async fn spawn_provider(status: StatusCode, reply: Value) -> (String, MockProvider) {
        let provider = MockProvider {
            status,
            reply,
            captured: Arc::new(Mutex::new(None)),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(complete))
            .with_state(provider.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/v1/chat/completions", addr), provider)
    }

    fn completion(content: &str) -> Value {
        json!({
            "id": "cmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        })
    }

    #[tokio::test]
    async fn test_generate_sends_chat_request_and_returns_content() {
        let (url, provider) = spawn_provider(StatusCode::OK, completion("Eat more lentils.")).await;
        let client = MistralClient::new(url, "secret-key", GenerationSettings::default());

        let report = client.generate("How is my heart?").await.unwrap();
        assert_eq!(report, "Eat more lentils.");

        let (auth, body) = provider.captured.lock().unwrap().clone().unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer secret-key"));
        assert_eq!(body["model"], "mistral-small-latest");
        assert_eq!(
            body["messages"],
            json!([{ "role": "user", "content": "How is my heart?" }])
        );
        assert_eq!(body["max_tokens"], 3000);
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["top_p"], 0.9);
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let (url, _provider) = spawn_provider(
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Unauthorized" }),
        )
        .await;
        let client = MistralClient::new(url, "bad-key", GenerationSettings::default());

        match client.generate("prompt").await {
            Err(ReportError::Upstream { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Unauthorized"));
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = MistralClient::new(
            format!("http://{}/v1/chat/completions", addr),
            "key",
            GenerationSettings::default(),
        );
        let error = client.generate("prompt").await.unwrap_err();
        assert!(matches!(error, ReportError::Transport(_)));
    }

    #[test]
    fn test_extract_report_takes_first_choice() {
        let body = json!({
            "choices": [
                { "message": { "content": "first" } },
                { "message": { "content": "second" } }
            ]
        });
        assert_eq!(extract_report(&body.to_string()).unwrap(), "first");
    }

    #[test]
    fn test_extract_report_rejects_empty_choices() {
        let error = extract_report(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(error, ReportError::MalformedUpstream(_)));
    }

    #[test]
    fn test_extract_report_rejects_non_json() {
        let error = extract_report("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(error, ReportError::MalformedUpstream(_)));
    }
}
