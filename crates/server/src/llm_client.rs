//! OpenAI-compatible chat completions client backing the confirmation classifier.
//!
//! Works against hosted endpoints and local runtimes that expose `/v1/chat/completions`.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use loanline_agent::LlmClient;
use loanline_core::config::ClassifierConfig;

#[derive(Clone, Debug)]
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatTurn<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
        api_key: Option<SecretString>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build chat completions client")?;
        let endpoint = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
        Ok(Self { client, endpoint, model: model.into(), api_key })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let base_url =
            config.base_url.as_deref().ok_or_else(|| anyhow!("classifier.base_url is not set"))?;
        Self::new(
            base_url,
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
            config.api_key.clone(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages: [ChatTurn { role: "user", content: prompt }],
            temperature: 0.0,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.context("chat completions request failed")?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("chat completions endpoint returned {status}"));
        }
        let completion: CompletionResponse =
            response.json().await.context("chat completions response was not valid json")?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completions response carried no content"))
    }
}
