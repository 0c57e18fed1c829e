use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

use shared_config::AppConfig;

use crate::models::TriageError;

pub const OUT_OF_SCOPE_MESSAGE: &str =
    "This question is outside my medical scope. Please ask about health symptoms, conditions, or care.";

/// Prompts that are clearly not about health skip the AI call entirely.
const NON_MEDICAL_TRIGGERS: &[&str] = &[
    "capital of",
    "who is",
    "what is node",
    "what is javascript",
    "programming",
    "python",
    "java ",
    "c++",
    "react",
    "football",
    "cricket",
    "movie",
    "song",
    "weather",
    "stock",
    "bitcoin",
    "crypto",
    "country",
    "president",
    "prime minister",
    "capital city",
];

pub fn is_non_medical(query: &str) -> bool {
    let lower = query.to_lowercase();
    NON_MEDICAL_TRIGGERS
        .iter()
        .any(|trigger| lower.contains(trigger))
}

/// Generative advice capability. `advise` yields `None` when no advice
/// text can be produced, letting callers fall back to their own canned
/// responses instead of failing the request.
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    async fn advise(&self, query: &str) -> Result<Option<String>, TriageError>;
}

/// Picks the live provider when an API key is configured, otherwise the
/// inert one.
pub fn advice_provider(config: &AppConfig) -> Arc<dyn AdviceProvider> {
    if config.is_advice_configured() {
        Arc::new(GeminiAdviceProvider::new(config))
    } else {
        warn!("Advice API key not configured; AI advice disabled");
        Arc::new(UnconfiguredAdviceProvider)
    }
}

pub struct GeminiAdviceProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiAdviceProvider {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.clone(),
        }
    }

    fn advice_prompt(query: &str) -> String {
        format!(
            r#"You are responding as a licensed clinician. A patient reports: "{query}".

STRICT RESPONSE REQUIREMENTS:
- Provide only clinically relevant information. Do not include any non-medical content, metadata, sources, or system notes.
- Do not diagnose or claim certainty. Use non-diagnostic language ("may be consistent with", "could be due to").
- Be concise, empathetic, and actionable.
- Structure the response with these headings only: Assessment, Self-care, Red flags, Next steps.
- Keep within 1600 characters total.

OUT-OF-SCOPE HANDLING:
If the patient's message is not about health, symptoms, conditions, risks, or medical self-care, respond EXACTLY with: "{out_of_scope}" and nothing else.

Now write the response."#,
            query = query,
            out_of_scope = OUT_OF_SCOPE_MESSAGE,
        )
    }

    /// Sends a generation request and pulls the first candidate's text.
    pub async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, TriageError> {
        let url = format!(
            "{}/models/gemini-1.5-flash:generateContent?key={}",
            self.base_url, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "temperature": 0.3,
                    "topP": 0.9,
                    "topK": 40,
                    "maxOutputTokens": max_output_tokens
                }
            }))
            .send()
            .await
            .map_err(|e| TriageError::Advice(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Advice API returned {}: {}", status, body);
            return Err(TriageError::Advice(format!(
                "advice service returned {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TriageError::Advice(e.to_string()))?;

        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("No response generated.")
            .to_string();

        Ok(text)
    }
}

#[async_trait]
impl AdviceProvider for GeminiAdviceProvider {
    async fn advise(&self, query: &str) -> Result<Option<String>, TriageError> {
        if is_non_medical(query) {
            return Ok(Some(OUT_OF_SCOPE_MESSAGE.to_string()));
        }

        let prompt = Self::advice_prompt(query);
        let text = self.generate(&prompt, 512).await?;
        Ok(Some(text))
    }
}

/// Stands in when no API key is configured; always yields no advice so
/// callers use their canned responses.
pub struct UnconfiguredAdviceProvider;

#[async_trait]
impl AdviceProvider for UnconfiguredAdviceProvider {
    async fn advise(&self, _query: &str) -> Result<Option<String>, TriageError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_medical_triggers_are_detected() {
        assert!(is_non_medical("What is the capital of France?"));
        assert!(is_non_medical("tell me about BITCOIN"));
        assert!(!is_non_medical("I have chest pain and nausea"));
    }

    #[tokio::test]
    async fn unconfigured_provider_yields_no_advice() {
        let provider = UnconfiguredAdviceProvider;
        let result = provider.advise("fever").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn gemini_provider_short_circuits_non_medical_prompts() {
        let config = shared_utils::test_utils::TestConfig::default().to_app_config();
        let provider = GeminiAdviceProvider::new(&config);
        let result = provider.advise("who is the president").await.unwrap();
        assert_eq!(result, Some(OUT_OF_SCOPE_MESSAGE.to_string()));
    }
}
