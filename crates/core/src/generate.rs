//! External text-generation collaborator.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, SummarizeError};

pub const OPENAI_RESPONSES_ENDPOINT: &str = "https://api.openai.com/v1/responses";
pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Seam for the text-generation service: takes a model identifier and the
/// assembled prompt, returns the generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, input: &str) -> Result<String>;
}

/// OpenAI responses-API implementation.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: OPENAI_RESPONSES_ENDPOINT.to_string(),
            api_key,
        }
    }

    /// Read the API key from the environment, failing early when it is unset.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var(OPENAI_API_KEY_ENV).map_err(|_| SummarizeError::MissingApiKey {
                env_var: OPENAI_API_KEY_ENV.to_string(),
            })?;
        Ok(Self::new(api_key))
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, model: &str, input: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": model,
                "input": input,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SummarizeError::ExternalService {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = serde_json::from_str(&body)?;
        let output = extract_output_text(&envelope);
        if output.is_empty() {
            return Err(SummarizeError::NoOutputText);
        }
        Ok(output)
    }
}

/// Pull the generated text out of a responses-API envelope: either the flat
/// `output_text` field, or the `output` list's message content parts joined
/// in order.
pub fn extract_output_text(envelope: &Value) -> String {
    if let Some(text) = envelope.get("output_text").and_then(Value::as_str) {
        return text.to_string();
    }

    let mut parts: Vec<&str> = Vec::new();
    if let Some(output) = envelope.get("output").and_then(Value::as_array) {
        for item in output {
            if item.get("type").and_then(Value::as_str) != Some("message") {
                continue;
            }
            let Some(content) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for part in content {
                if part.get("type").and_then(Value::as_str) == Some("output_text") {
                    if let Some(text) = part.get("text").and_then(Value::as_str) {
                        parts.push(text);
                    }
                }
            }
        }
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flat_output_text_wins() {
        let envelope = json!({ "output_text": "hello", "output": [] });
        assert_eq!(extract_output_text(&envelope), "hello");
    }

    #[test]
    fn nested_message_parts_are_joined_in_order() {
        let envelope = json!({
            "output": [
                { "type": "reasoning", "content": [] },
                {
                    "type": "message",
                    "content": [
                        { "type": "output_text", "text": "first" },
                        { "type": "refusal", "refusal": "n/a" },
                        { "type": "output_text", "text": "second" }
                    ]
                },
                {
                    "type": "message",
                    "content": [ { "type": "output_text", "text": "third" } ]
                }
            ]
        });
        assert_eq!(extract_output_text(&envelope), "first\nsecond\nthird");
    }

    #[test]
    fn unusable_envelope_yields_empty_string() {
        assert_eq!(extract_output_text(&json!({})), "");
        assert_eq!(extract_output_text(&json!({ "output": "nope" })), "");
        assert_eq!(
            extract_output_text(&json!({ "output": [{ "type": "message" }] })),
            ""
        );
    }
}
