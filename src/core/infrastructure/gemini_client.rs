//! HTTP client for the Gemini `generateContent` REST endpoint.

use crate::{
    GeminiConfig, SupervisorError, SupervisorResult, ValidationError,
    assistant::application::{
        request::generation_request::{GenerateContentRequest, GenerationRequest},
        response::generate_content_response::{ErrorResponse, GenerateContentResponse},
        service::text_generator::TextGenerator,
    },
};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, StatusCode};
use std::num::NonZeroU32;
use std::sync::Arc;
use url::Url;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client that sends generation requests to a hosted Gemini model.
///
/// The API key travels in the `x-goog-api-key` header, never in the URL, so it
/// cannot leak through request logs. When a rate limit is configured, every
/// request waits for capacity before it is sent.
#[derive(Debug)]
pub struct GeminiClient {
    http_client: Client,
    endpoint: Url,
    config: Arc<GeminiConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl GeminiClient {
    /// Creates a new `GeminiClient`.
    ///
    /// # Errors
    /// Returns `SupervisorError::Validation` for a malformed base URL, model name or
    /// rate limit, and `SupervisorError::ExternalService` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> SupervisorResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SupervisorError::ExternalService(e.to_string()))?;

        if config.model.trim().is_empty() || config.model.contains('/') {
            return Err(ValidationError::Field {
                field: "model".to_string(),
                message: format!("Invalid model name '{}'", config.model),
            }
            .into());
        }

        let base = Url::parse(&config.base_url)
            .map_err(|e| ValidationError::Format(format!("Invalid base URL: {}", e)))?;
        let endpoint = base
            .join(&format!("models/{}:generateContent", config.model))
            .map_err(|e| ValidationError::Format(format!("Invalid model path: {}", e)))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                rl.validate()?;
                let per_second = NonZeroU32::new(rl.requests_per_second)
                    .ok_or_else(|| ValidationError::Format("zero rate".to_string()))?;
                let burst = NonZeroU32::new(rl.burst_size)
                    .ok_or_else(|| ValidationError::Format("zero burst".to_string()))?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            endpoint,
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns the model this client targets.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends one `generateContent` call and returns the parsed response.
    ///
    /// # Errors
    /// * `SupervisorError::InvalidCredential` when the service rejects the API key
    /// * `SupervisorError::ExternalService` for transport failures, other non-2xx
    ///   statuses or an unparsable body
    pub async fn generate_content(
        &self,
        body: &GenerateContentRequest,
    ) -> SupervisorResult<GenerateContentResponse> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        tracing::debug!(model = %self.config.model, turns = body.contents.len(), "Sending generateContent request");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| SupervisorError::ExternalService(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Self::classify_failure(status, &error_text));
        }

        response.json::<GenerateContentResponse>().await.map_err(|e| {
            SupervisorError::ExternalService(format!("Failed to parse response: {}", e))
        })
    }

    /// Maps a non-2xx reply onto the credential / generic split.
    fn classify_failure(status: StatusCode, body: &str) -> SupervisorError {
        let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
        let invalid_key = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            || parsed
                .as_ref()
                .is_some_and(|envelope| envelope.error.is_invalid_api_key())
            || body.contains("API_KEY_INVALID");

        let message = parsed
            .map(|envelope| envelope.error.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| body.to_string());

        if invalid_key {
            tracing::warn!(%status, "Text generation rejected the API key");
            SupervisorError::InvalidCredential(message)
        } else {
            tracing::warn!(%status, "Text generation request failed");
            SupervisorError::ExternalService(format!("API error ({}): {}", status, message))
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> SupervisorResult<String> {
        let body = GenerateContentRequest::from(&request);
        let response = self.generate_content(&body).await?;
        response.text().ok_or_else(|| {
            SupervisorError::ExternalService("Response contained no text".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiKey, RateLimitConfig};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    const MODEL_PATH: &str = "/v1beta/models/gemini-test:generateContent";

    fn create_test_config(server_url: &str) -> GeminiConfig {
        GeminiConfig::new(ApiKey::new("AIzaSyTestKey").unwrap())
            .with_model("gemini-test")
            .with_base_url(format!("{}/v1beta", server_url))
    }

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        })
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;
        let client = GeminiClient::new(create_test_config(&mock_server.uri())).unwrap();

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "AIzaSyTestKey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("Cluster looks healthy.")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let text = client
            .generate(GenerationRequest::one_shot("summarize"))
            .await
            .unwrap();
        assert_eq!(text, "Cluster looks healthy.");
    }

    #[tokio::test]
    async fn test_invalid_key_is_reported_distinctly() {
        let mock_server = MockServer::start().await;
        let client = GeminiClient::new(create_test_config(&mock_server.uri())).unwrap();

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT",
                    "details": [{"reason": "API_KEY_INVALID"}]
                }
            })))
            .mount(&mock_server)
            .await;

        let result = client.generate(GenerationRequest::one_shot("hi")).await;
        assert!(matches!(result, Err(SupervisorError::InvalidCredential(_))));
    }

    #[tokio::test]
    async fn test_unauthorized_status_is_credential_error() {
        let mock_server = MockServer::start().await;
        let client = GeminiClient::new(create_test_config(&mock_server.uri())).unwrap();

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let result = client.generate(GenerationRequest::one_shot("hi")).await;
        assert!(matches!(result, Err(SupervisorError::InvalidCredential(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_generic_failure() {
        let mock_server = MockServer::start().await;
        let client = GeminiClient::new(create_test_config(&mock_server.uri())).unwrap();

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let result = client.generate(GenerationRequest::one_shot("hi")).await;
        match result {
            Err(SupervisorError::ExternalService(message)) => {
                assert!(message.contains("503"));
                assert!(message.contains("overloaded"));
            }
            other => panic!("expected ExternalService, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_failure() {
        let mock_server = MockServer::start().await;
        let client = GeminiClient::new(create_test_config(&mock_server.uri())).unwrap();

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&mock_server)
            .await;

        let result = client.generate(GenerationRequest::one_shot("hi")).await;
        assert!(matches!(result, Err(SupervisorError::ExternalService(_))));
    }

    #[tokio::test]
    async fn test_rejects_bad_configuration() {
        let config = create_test_config("http://127.0.0.1:1").with_model("");
        assert!(matches!(
            GeminiClient::new(config),
            Err(SupervisorError::Validation { .. })
        ));

        let config = create_test_config("http://127.0.0.1:1").with_rate_limit(RateLimitConfig {
            requests_per_second: 0,
            burst_size: 1,
        });
        assert!(matches!(
            GeminiClient::new(config),
            Err(SupervisorError::Validation { .. })
        ));

        let config = create_test_config("not a url");
        assert!(GeminiClient::new(config).is_err());
    }

    #[tokio::test]
    async fn test_rate_limiting_delays_requests() {
        use std::time::{Duration, Instant};

        let mock_server = MockServer::start().await;
        let config = create_test_config(&mock_server.uri()).with_rate_limit(RateLimitConfig {
            requests_per_second: 2,
            burst_size: 2,
        });
        let client = GeminiClient::new(config).unwrap();

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
            .expect(4)
            .mount(&mock_server)
            .await;

        let start = Instant::now();
        let (a, b) = tokio::join!(
            client.generate(GenerationRequest::one_shot("1")),
            client.generate(GenerationRequest::one_shot("2"))
        );
        a.unwrap();
        b.unwrap();
        assert!(start.elapsed() < Duration::from_millis(500));

        let start = Instant::now();
        let (c, d) = tokio::join!(
            client.generate(GenerationRequest::one_shot("3")),
            client.generate(GenerationRequest::one_shot("4"))
        );
        c.unwrap();
        d.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(900));
    }
}
