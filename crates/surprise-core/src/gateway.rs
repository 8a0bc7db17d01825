//! Text generation for the wish and reasons screens.
//!
//! Callers never see a failure: every error path ends in a fixed fallback
//! so the stage machine always receives something it can show.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::ai::{GenerationOptions, ProviderClient};
use crate::stage::WishTone;
use crate::state::{MAX_AGE, MIN_AGE};

/// Shown when the provider answers with nothing.
pub const EMPTY_WISH: &str = "Happy Birthday! You are amazing.";

/// One entry of the fallback reasons list.
pub const FALLBACK_REASON: &str = "Because you're absolutely wonderful and unique!";

const WISH_TEMPERATURE: f32 = 0.8;
const WISH_TOP_P: f32 = 0.9;

/// Source of the generated birthday text.
#[async_trait]
pub trait TextGateway: Send + Sync {
    async fn generate_wish(&self, name: &str, age: u32, tone: WishTone) -> String;

    async fn generate_reasons(&self, name: &str, age: u32) -> Vec<String>;
}

/// Wish used when the provider call fails.
pub fn fallback_wish(name: &str, age: u32) -> String {
    format!(
        "Happy {}th Birthday, {}! May your day be as bright and beautiful as your smile!",
        age, name
    )
}

/// Reasons used when the provider call fails or returns something unusable.
/// One entry per year, bounded to `MIN_AGE..=MAX_AGE` so the list is never
/// empty.
pub fn fallback_reasons(age: u32) -> Vec<String> {
    let count = age.clamp(MIN_AGE, MAX_AGE);
    vec![FALLBACK_REASON.to_string(); count as usize]
}

pub fn wish_prompt(name: &str, age: u32, tone: WishTone) -> String {
    match tone {
        WishTone::Roast => format!(
            "Write a funny, lighthearted birthday roast for {name} who is turning {age}. \
             Tease them gently about being small but cute, and keep it witty but kind."
        ),
        _ => format!(
            "Write a beautiful, personalized birthday poem for {name} who is turning {age}. \
             Make it {} and memorable. Emphasize how {name} brings smiles and joy to others.",
            tone.as_str()
        ),
    }
}

pub fn reasons_prompt(name: &str, age: u32) -> String {
    format!(
        "Generate exactly {age} short (5-10 words each), sweet, and diverse reasons to celebrate \
         {name} on their {age}th birthday. Focus on their personality, their age, their future, \
         and the joy they bring. Return only a JSON array of strings."
    )
}

#[derive(Error, Debug)]
pub enum ReasonsError {
    #[error("reasons response is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reasons response is not a list of strings")]
    Malformed,

    #[error("reasons response is an empty list")]
    Empty,
}

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("code fence pattern is valid")
    })
}

/// Parse a model's reasons answer.
///
/// Accepts a JSON array of strings, optionally inside a Markdown code fence
/// or wrapped in an object with a single array field.
pub fn parse_reasons(text: &str) -> Result<Vec<String>, ReasonsError> {
    let body = code_fence()
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str());

    let value: Value = serde_json::from_str(body.trim())?;
    let reasons = reasons_from_value(value)?;

    if reasons.is_empty() {
        return Err(ReasonsError::Empty);
    }
    Ok(reasons)
}

fn reasons_from_value(value: Value) -> Result<Vec<String>, ReasonsError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(Ok(s.trim().to_string())),
                _ => Some(Err(ReasonsError::Malformed)),
            })
            .collect(),
        Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
            Some((_, inner @ Value::Array(_))) => reasons_from_value(inner),
            _ => Err(ReasonsError::Malformed),
        },
        _ => Err(ReasonsError::Malformed),
    }
}

/// Gateway backed by a hosted or local model.
///
/// With no client configured every request resolves to the fallback text.
#[derive(Clone)]
pub struct AiGateway {
    client: Option<ProviderClient>,
    model: String,
}

impl AiGateway {
    pub fn new(client: ProviderClient, model: &str) -> Self {
        Self {
            client: Some(client),
            model: model.to_string(),
        }
    }

    pub fn offline() -> Self {
        Self {
            client: None,
            model: String::new(),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    pub fn describe(&self) -> String {
        match &self.client {
            Some(client) => format!("{} · {}", client.provider().display_name(), self.model),
            None => "offline".to_string(),
        }
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> anyhow::Result<String> {
        match &self.client {
            Some(client) => client.generate(&self.model, prompt, options).await,
            None => Err(anyhow::anyhow!("no text provider configured")),
        }
    }
}

#[async_trait]
impl TextGateway for AiGateway {
    async fn generate_wish(&self, name: &str, age: u32, tone: WishTone) -> String {
        let options = GenerationOptions {
            temperature: Some(WISH_TEMPERATURE),
            top_p: Some(WISH_TOP_P),
            json: false,
        };

        match self.generate(&wish_prompt(name, age, tone), &options).await {
            Ok(text) if text.trim().is_empty() => {
                tracing::warn!(tone = tone.as_str(), "wish came back empty");
                EMPTY_WISH.to_string()
            }
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(tone = tone.as_str(), error = %e, "wish generation failed, using fallback");
                fallback_wish(name, age)
            }
        }
    }

    async fn generate_reasons(&self, name: &str, age: u32) -> Vec<String> {
        let options = GenerationOptions {
            json: true,
            ..GenerationOptions::default()
        };

        let text = match self.generate(&reasons_prompt(name, age), &options).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "reasons generation failed, using fallback");
                return fallback_reasons(age);
            }
        };

        match parse_reasons(&text) {
            Ok(reasons) => {
                if reasons.len() != age as usize {
                    tracing::debug!(got = reasons.len(), wanted = age, "reasons count differs from age");
                }
                reasons
            }
            Err(e) => {
                tracing::warn!(error = %e, "reasons response unusable, using fallback");
                fallback_reasons(age)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let reasons = parse_reasons(r#"["Your laugh", "  Your kindness  "]"#).unwrap();
        assert_eq!(reasons, vec!["Your laugh", "Your kindness"]);
    }

    #[test]
    fn test_parse_fenced_array() {
        let text = "```json\n[\"Your smile lights rooms\", \"You remember every birthday\"]\n```";
        let reasons = parse_reasons(text).unwrap();
        assert_eq!(reasons.len(), 2);
        assert_eq!(reasons[0], "Your smile lights rooms");
    }

    #[test]
    fn test_parse_object_wrapping_array() {
        let reasons = parse_reasons(r#"{"reasons": ["One", "Two", "Three"]}"#).unwrap();
        assert_eq!(reasons, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_parse_skips_blank_entries() {
        let reasons = parse_reasons(r#"["One", "", "   ", "Two"]"#).unwrap();
        assert_eq!(reasons, vec!["One", "Two"]);
    }

    #[test]
    fn test_parse_rejects_unusable_answers() {
        assert!(matches!(parse_reasons("Here are some reasons!"), Err(ReasonsError::Json(_))));
        assert!(matches!(parse_reasons("[]"), Err(ReasonsError::Empty)));
        assert!(matches!(parse_reasons(r#"["", " "]"#), Err(ReasonsError::Empty)));
        assert!(matches!(parse_reasons("[1, 2]"), Err(ReasonsError::Malformed)));
        assert!(matches!(parse_reasons(r#"{"a": [], "b": []}"#), Err(ReasonsError::Malformed)));
        assert!(matches!(parse_reasons(r#""just a string""#), Err(ReasonsError::Malformed)));
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(fallback_reasons(24).len(), 24);
        assert!(fallback_reasons(3).iter().all(|r| r == FALLBACK_REASON));
        assert_eq!(fallback_reasons(0).len(), 1);
        assert_eq!(fallback_reasons(4_000_000_000).len(), MAX_AGE as usize);
        let wish = fallback_wish("Asha", 30);
        assert!(wish.starts_with("Happy 30th Birthday, Asha!"));
    }

    #[test]
    fn test_prompts_mention_recipient() {
        for tone in WishTone::all() {
            let prompt = wish_prompt("Asha", 30, tone);
            assert!(prompt.contains("Asha"));
            assert!(prompt.contains("30"));
        }
        assert!(wish_prompt("Asha", 30, WishTone::Roast).contains("roast"));
        assert!(wish_prompt("Asha", 30, WishTone::Funny).contains("funny"));
        assert!(reasons_prompt("Asha", 30).contains("exactly 30"));
    }

    #[tokio::test]
    async fn test_offline_gateway_falls_back() {
        let gateway = AiGateway::offline();
        assert!(gateway.is_offline());

        let wish = gateway.generate_wish("Asha", 30, WishTone::Funny).await;
        assert_eq!(wish, fallback_wish("Asha", 30));

        let reasons = gateway.generate_reasons("Asha", 30).await;
        assert_eq!(reasons, fallback_reasons(30));
    }

    #[tokio::test]
    async fn test_unreachable_provider_falls_back() {
        // Nothing listens on port 9 locally, so the request fails fast.
        let client = ProviderClient::Ollama(crate::ai::OllamaClient::new("http://127.0.0.1:9"));
        let gateway = AiGateway::new(client, "gemma3:latest");

        let reasons = gateway.generate_reasons("Asha", 5).await;
        assert_eq!(reasons, fallback_reasons(5));

        let wish = gateway.generate_wish("Asha", 5, WishTone::Heartfelt).await;
        assert_eq!(wish, fallback_wish("Asha", 5));
    }
}
