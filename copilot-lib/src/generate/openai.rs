use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::generate::LanguageModel;
use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat completion client for OpenAI and compatible endpoints.
pub struct OpenAiChat {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    /// Create a client.
    ///
    /// # Arguments
    /// * `api_key` - Bearer token for the endpoint
    /// * `model` - Model name (e.g., "gpt-4o-mini")
    /// * `endpoint` - API base URL, without the `/chat/completions` suffix
    /// * `timeout` - Limit for the whole request; expiry is a generation failure
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::GenerationUnavailable(
                "OpenAI API key not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::GenerationUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            temperature: 0.2,
        })
    }

    /// Create a client from settings.
    pub fn from_settings(api_key: impl Into<String>, settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            api_key,
            settings.chat_model.clone(),
            settings.chat_endpoint.clone(),
            settings.timeout(),
        )?
        .with_temperature(settings.temperature))
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

impl LanguageModel for OpenAiChat {
    fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "requesting completion");
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::GenerationUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::GenerationUnavailable(format!(
                "chat API error {status}: {body}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| Error::GenerationUnavailable(e.to_string()))?;

        extract_content(body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn extract_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| Error::GenerationUnavailable("model returned no content".to_string()))
}
