use std::time::Duration;

use reqwest::{multipart::Form, Client as HttpClient, Response};
use serde_json::Value;

use crate::{
    config::Config,
    models::ChatbotForward,
    services::ai::{AiClient, AiError},
};

/// AI client speaking HTTP/JSON to the Python AI service
#[derive(Clone)]
pub struct HttpAiClient {
    http_client: HttpClient,
    base_url: String,
    default_timeout: Duration,
    chatbot_timeout: Duration,
    summarize_timeout: Duration,
}

impl HttpAiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_timeout: Duration::from_secs(10),
            chatbot_timeout: Duration::from_secs(15),
            summarize_timeout: Duration::from_secs(20),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            default_timeout: config.ai_recommendation_timeout(),
            chatbot_timeout: config.chatbot_timeout(),
            summarize_timeout: config.summarize_timeout(),
            ..Self::new(config.ai_service_url.clone())
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, timeout: Duration) -> Result<Value, AiError> {
        let response = self
            .http_client
            .get(self.url(path))
            .timeout(timeout)
            .send()
            .await?;

        Self::read_json(path, response).await
    }

    async fn read_json(path: &str, response: Response) -> Result<Value, AiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "AI service request failed"
            );
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl AiClient for HttpAiClient {
    async fn recommendations(&self, user_id: i64, timeout: Duration) -> Result<Value, AiError> {
        self.get_json(&format!("/recommendations/{}", user_id), timeout)
            .await
    }

    async fn chatbot(&self, request: ChatbotForward) -> Result<Value, AiError> {
        let path = "/chatbot";
        let response = self
            .http_client
            .post(self.url(path))
            .timeout(self.chatbot_timeout)
            .json(&request)
            .send()
            .await?;

        Self::read_json(path, response).await
    }

    async fn learning_path(&self, user_id: i64) -> Result<Value, AiError> {
        self.get_json(&format!("/learning-path/{}", user_id), self.default_timeout)
            .await
    }

    async fn full_recommendations(&self, user_id: i64) -> Result<Value, AiError> {
        self.get_json(
            &format!("/full-recommendations/{}", user_id),
            self.default_timeout,
        )
        .await
    }

    async fn summarize(&self, text: String) -> Result<Value, AiError> {
        let path = "/summarize";
        let form = Form::new().text("text", text);
        let response = self
            .http_client
            .post(self.url(path))
            .timeout(self.summarize_timeout)
            .multipart(form)
            .send()
            .await?;

        Self::read_json(path, response).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
