pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use claude::ClaudeClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::provider::Provider;

/// A wish nobody sees after this long is not worth waiting for.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Error bodies can be whole HTML pages.
const MAX_ERROR_BODY: usize = 300;

fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Decode a provider response, turning non-2xx statuses into errors that
/// carry the start of the body.
async fn read_json<T: DeserializeOwned>(response: Response, provider: Provider) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(anyhow!("{} API error {}: {}", provider.display_name(), status, body));
    }
    response
        .json()
        .await
        .with_context(|| format!("Unexpected {} response", provider.display_name()))
}

/// Sampling knobs shared by every provider. Providers ignore what they
/// cannot express.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    /// Ask the provider for a JSON-only response.
    pub json: bool,
}

/// A configured client for one of the supported providers.
#[derive(Clone)]
pub enum ProviderClient {
    Gemini(GeminiClient),
    Ollama(OllamaClient),
    Claude(ClaudeClient),
    OpenAI(OpenAIClient),
}

impl ProviderClient {
    /// Build the client for the configured provider. Fails when a hosted
    /// provider has no API key.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = config.provider();
        let missing_key = || anyhow!("{} API key not configured", provider.display_name());

        Ok(match provider {
            Provider::Gemini => {
                let key = config.gemini_api_key.as_deref().ok_or_else(missing_key)?;
                ProviderClient::Gemini(GeminiClient::new(key))
            }
            Provider::Ollama => ProviderClient::Ollama(OllamaClient::new(config.ollama_url())),
            Provider::Claude => {
                let key = config.claude_api_key.as_deref().ok_or_else(missing_key)?;
                ProviderClient::Claude(ClaudeClient::new(key))
            }
            Provider::OpenAI => {
                let key = config.openai_api_key.as_deref().ok_or_else(missing_key)?;
                ProviderClient::OpenAI(OpenAIClient::new(key))
            }
        })
    }

    pub fn provider(&self) -> Provider {
        match self {
            ProviderClient::Gemini(_) => Provider::Gemini,
            ProviderClient::Ollama(_) => Provider::Ollama,
            ProviderClient::Claude(_) => Provider::Claude,
            ProviderClient::OpenAI(_) => Provider::OpenAI,
        }
    }

    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        match self {
            ProviderClient::Gemini(client) => client.generate(model, prompt, options).await,
            ProviderClient::Ollama(client) => client.generate(model, prompt, options).await,
            ProviderClient::Claude(client) => client.generate(model, prompt, options).await,
            ProviderClient::OpenAI(client) => client.generate(model, prompt, options).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosted_provider_without_key_fails() {
        let config = Config {
            provider: Some("claude".to_string()),
            claude_api_key: None,
            ..Config::new()
        };
        let err = ProviderClient::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("Claude"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = Config {
            provider: Some("ollama".to_string()),
            ..Config::new()
        };
        let client = ProviderClient::from_config(&config).unwrap();
        assert_eq!(client.provider(), Provider::Ollama);
    }

    #[test]
    fn test_gemini_with_key() {
        let config = Config {
            provider: Some("gemini".to_string()),
            gemini_api_key: Some("test-key".to_string()),
            ..Config::new()
        };
        let client = ProviderClient::from_config(&config).unwrap();
        assert_eq!(client.provider(), Provider::Gemini);
    }
}
