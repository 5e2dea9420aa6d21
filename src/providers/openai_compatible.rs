use super::base_client::HttpClient;
use super::image::extract_images;
use super::{Completion, LlmProvider, Message};
use crate::core::error::LeetobError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

/// Text of `choices[0].message.content` when the model answered with a plain string.
fn response_text(raw: &Value) -> Option<String> {
    raw.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[derive(Clone)]
pub struct OpenAICompatibleProvider {
    client: HttpClient,
}

impl OpenAICompatibleProvider {
    pub fn new(base_url: String, api_key: String) -> Result<Self, LeetobError> {
        // Use Bearer token authentication
        let auth_header = Some(("Authorization".to_string(), format!("Bearer {}", api_key)));

        Ok(Self {
            client: HttpClient::new(base_url, auth_header)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }
}

#[async_trait]
impl LlmProvider for OpenAICompatibleProvider {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<Completion, LeetobError> {
        let payload = ChatCompletionRequest {
            model,
            messages,
            max_tokens,
        };

        let response = self.client.post("chat/completions", &payload).await?;
        let response_body: String = response.text().await?;
        let raw: Value = serde_json::from_str(&response_body)?;

        if let Some(err) = raw.get("error") {
            let detail = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return Err(LeetobError::Api(detail));
        }

        let has_choices = raw
            .get("choices")
            .and_then(Value::as_array)
            .is_some_and(|choices| !choices.is_empty());
        if !has_choices {
            return Err(LeetobError::Api("No choices in API response".to_string()));
        }

        let completion = Completion {
            text: response_text(&raw),
            images: extract_images(&raw),
            raw,
        };
        debug!(
            model,
            text_len = completion.text.as_ref().map_or(0, String::len),
            images = completion.images.len(),
            "completion received"
        );
        Ok(completion)
    }
}
