use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{http_client, read_json, GenerationOptions};
use crate::provider::Provider;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

// A wish or 30-ish short reasons fit comfortably.
const MAX_TOKENS: u32 = 1024;

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.to_string(),
            endpoint: MESSAGES_URL.to_string(),
        }
    }

    /// Send requests somewhere other than the public API.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Claude has no JSON response mode; `options.json` is left to the prompt.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        let request = MessagesRequest {
            model,
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            top_p: options.top_p,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let body: MessagesResponse = read_json(response, Provider::Claude).await?;
        Ok(body.content.into_iter().map(|block| block.text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = MessagesRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: "a wish please",
            }],
            temperature: Some(0.8),
            top_p: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "a wish please");
        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("top_p").is_none());
    }

    #[test]
    fn test_response_joins_text_blocks() {
        let body = r#"{"content":[{"type":"text","text":"Happy "},{"type":"text","text":"birthday"}]}"#;
        let response: MessagesResponse = serde_json::from_str(body).unwrap();
        let text: String = response.content.into_iter().map(|b| b.text).collect();
        assert_eq!(text, "Happy birthday");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let client = ClaudeClient::new("key").with_endpoint("http://127.0.0.1:9/v1/messages");
        let result = client
            .generate("claude-sonnet-4-20250514", "hi", &GenerationOptions::default())
            .await;
        assert!(result.is_err());
    }
}
