//! HTTP implementation of the text-generation contract.
//!
//! Talks to an OpenAI-style chat-completions endpoint via reqwest. Endpoint
//! and model come from configuration; the bearer key, when present, comes
//! from the `DOCMILL_API_KEY` environment variable.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::contract::{GeneratedText, GenerationRequest, TextGenError, TextGenerator};

/// Environment variable holding the API key. Never read from config files.
pub const API_KEY_ENV: &str = "DOCMILL_API_KEY";

/// reqwest-backed `TextGenerator` for an OpenAI-style chat-completions API.
pub struct HttpTextGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpTextGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        if config.api_key.is_none() {
            warn!(
                endpoint = %config.endpoint,
                "No API key in environment, sending unauthenticated requests"
            );
        }
        HttpTextGenerator {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedText, TextGenError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You write concise Markdown documentation for command-line tools."
                },
                {
                    "role": "user",
                    "content": request.prompt
                }
            ]
        });

        debug!(
            purpose = request.purpose.name(),
            endpoint = %self.endpoint,
            "Sending generation request"
        );
        let mut http_request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to decode response body>"));
            warn!(
                status = %status,
                endpoint = %self.endpoint,
                "Text generation API returned error. Response body: {body}"
            );
            return Err(format!("text generation API returned {status}: {body}").into());
        }

        let json_val = response.json::<serde_json::Value>().await?;
        let text = json_val
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or("text generation response had no choices[0].message.content")?;

        info!(
            purpose = request.purpose.name(),
            chars = text.len(),
            "Received generated text"
        );
        Ok(GeneratedText {
            text: text.to_string(),
        })
    }
}
