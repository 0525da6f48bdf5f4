use crate::config::Config;
use crate::error::ServiceError;
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERVICE: &str = "OpenAI";
const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.8;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Free-text generation from a single user prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Chat-completion client. The credential is fixed at construction.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
    retry: RetryConfig,
}

impl OpenAiClient {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_url: impl Into<String>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            api_url: api_url.into(),
            retry,
        }
    }

    /// `None` when no credential is configured.
    pub fn from_config(client: reqwest::Client, config: &Config) -> Option<Self> {
        let api_key = config.openai_api_key.clone()?;
        Some(Self::new(
            client,
            api_key,
            config.openai_model.clone(),
            config.openai_api_url.clone(),
            RetryConfig::api_call(config.max_attempts),
        ))
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::transport(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ServiceError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::malformed(SERVICE, format!("invalid JSON body: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ServiceError::malformed(SERVICE, "response contained no choices"))
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let request = self.build_request(prompt);
        debug!("Sending {} prompt ({} chars)", self.model, prompt.len());

        with_retry_if(
            &self.retry,
            "OpenAI completion",
            || self.send(&request),
            ServiceError::is_retryable,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_openai_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-3.5-turbo",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": content
                    },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    fn client_for(server: &MockServer, retry: RetryConfig) -> OpenAiClient {
        OpenAiClient::new(
            reqwest::Client::new(),
            "test-openai-key",
            "gpt-3.5-turbo",
            format!("{}/v1/chat/completions", server.uri()),
            retry,
        )
    }

    // ==================== Request Structure Tests ====================

    #[test]
    fn test_request_has_system_and_user_roles() {
        let client = OpenAiClient::new(
            reqwest::Client::new(),
            "key",
            "gpt-3.5-turbo",
            "http://localhost",
            RetryConfig::single_attempt(),
        );
        let request = client.build_request("List synonyms");

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, "You are a helpful assistant.");
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.messages[1].content, "List synonyms");
        assert_eq!(request.max_tokens, 300);
        assert!((request.temperature - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            max_tokens: 300,
            temperature: 0.8,
        };

        let json = serde_json::to_string(&request).expect("Should serialize");
        assert!(json.contains("gpt-3.5-turbo"));
        assert!(json.contains("\"max_tokens\":300"));
        assert!(json.contains("0.8"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = Config {
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_api_url: "http://localhost".to_string(),
            translate_api_url: "http://localhost".to_string(),
            definition_source: crate::config::DefinitionSource::WordNet,
            free_dictionary_api_url: "http://localhost".to_string(),
            wordnet_dir: "data/wordnet".into(),
            cmudict_path: "data/cmudict.dict".into(),
            dictionary_dir: "data/dictionaries".into(),
            min_synonyms: 3,
            request_timeout: Duration::from_secs(30),
            max_attempts: 3,
            port: 8080,
        };

        assert!(OpenAiClient::from_config(reqwest::Client::new(), &config).is_none());
        let config = config.with_api_key(Some("sk-test".to_string()));
        assert!(OpenAiClient::from_config(reqwest::Client::new(), &config).is_some());
    }

    // ==================== Wiremock Tests ====================

    #[tokio::test]
    async fn test_generate_success_trims_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 300
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_openai_response("  run: to move fast\n")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, RetryConfig::single_attempt());
        let text = client.generate("prompt").await.expect("Should succeed");

        assert_eq!(text, "run: to move fast");
    }

    #[tokio::test]
    async fn test_generate_unauthorized_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(
            &mock_server,
            RetryConfig::new(3, Duration::from_millis(10)),
        );
        let err = client.generate("prompt").await.expect_err("Should fail");

        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("invalid api key"));
    }

    #[tokio::test]
    async fn test_generate_server_error_is_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = client_for(
            &mock_server,
            RetryConfig::new(2, Duration::from_millis(10)),
        );
        let err = client.generate("prompt").await.expect_err("Should fail");

        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_generate_empty_choices_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, RetryConfig::single_attempt());
        let err = client.generate("prompt").await.expect_err("Should fail");

        assert!(err.to_string().contains("no choices"));
    }
}
