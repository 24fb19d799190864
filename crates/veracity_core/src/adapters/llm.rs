//! Last-resort LLM adapter.
//!
//! Only consulted when every real source came back empty or unverified.
//! Speaks both Ollama-style and OpenAI-compatible endpoints, demands a
//! strict-JSON verdict, and clamps confidence so a model guess can never
//! outrank a source that produced actual evidence.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::AdapterError;
use crate::types::{Claim, Rating, Verification, MAX_CAVEATS};

use super::SourceAdapter;

/// Ceiling on fallback confidence.
const MAX_CONFIDENCE: f64 = 0.6;

const SYSTEM_PROMPT: &str = "You are a careful fact-checking assistant. Assess the factual \
accuracy of the claim using your general knowledge. Be conservative: prefer \"unverified\" \
when you are not sure. Respond with valid JSON only.";

const SCHEMA_DESCRIPTION: &str = r#"{
  "rating": "one of: verified, mostly_true, mixed, mostly_false, false, unverified, opinion, outdated",
  "confidence": "number between 0 and 1",
  "summary": "one or two sentences explaining the assessment",
  "caveats": ["optional list of caveats"]
}"#;

/// The verdict shape the model must return.
#[derive(Debug, Deserialize)]
struct LlmVerdict {
    rating: String,
    confidence: f64,
    summary: String,
    #[serde(default)]
    caveats: Vec<String>,
}

/// Parse the model's rating string; anything unknown is unverified.
fn parse_rating(raw: &str) -> Rating {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase()))
        .unwrap_or(Rating::Unverified)
}

/// Adapter over an Ollama or OpenAI-compatible chat endpoint.
pub struct LlmAdapter {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmAdapter {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("veracity/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self { config, http })
    }

    fn user_prompt(claim: &Claim) -> String {
        let mut prompt = format!(
            "Claim: {}\n\nRespond with JSON matching this schema:\n{}",
            claim.text, SCHEMA_DESCRIPTION
        );
        if let Some(context) = &claim.context {
            prompt = format!("Context: {}\n\n{}", context, prompt);
        }
        prompt
    }

    async fn call_ollama(&self, claim: &Claim) -> Result<LlmVerdict, AdapterError> {
        let url = format!("{}/api/generate", self.config.endpoint);
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": format!("{}\n\n{}", SYSTEM_PROMPT, Self::user_prompt(claim)),
            "stream": false,
            "format": "json",
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(AdapterError::from_http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))?;
        let text = envelope
            .get("response")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AdapterError::Decode("empty ollama response".to_string()))?;
        serde_json::from_str(text).map_err(|e| AdapterError::Decode(e.to_string()))
    }

    async fn call_openai_compatible(&self, claim: &Claim) -> Result<LlmVerdict, AdapterError> {
        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": Self::user_prompt(claim)},
            ],
            "response_format": {"type": "json_object"},
        });

        let mut request = self.http.post(&url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(AdapterError::from_http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))?;
        let text = envelope
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| AdapterError::Decode("empty completion".to_string()))?;
        serde_json::from_str(text).map_err(|e| AdapterError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SourceAdapter for LlmAdapter {
    fn name(&self) -> &'static str {
        "llm-fallback"
    }

    async fn verify(&self, claim: &Claim) -> Result<Option<Verification>, AdapterError> {
        let verdict = if self.config.is_local_endpoint() {
            self.call_ollama(claim).await?
        } else {
            self.call_openai_compatible(claim).await?
        };

        let rating = parse_rating(&verdict.rating);
        let confidence = verdict.confidence.clamp(0.0, 1.0).min(MAX_CONFIDENCE);
        debug!(claim_id = %claim.id, %rating, confidence, "llm fallback verdict");

        let mut caveats = vec!["Assessment generated by a language model without source documents".to_string()];
        caveats.extend(verdict.caveats);
        caveats.truncate(MAX_CAVEATS);

        Ok(Some(Verification {
            claim_id: claim.id.clone(),
            rating,
            confidence,
            summary: verdict.summary,
            evidence: vec![],
            checked_at: Utc::now(),
            caveats,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating_known_and_unknown() {
        assert_eq!(parse_rating("mostly_true"), Rating::MostlyTrue);
        assert_eq!(parse_rating(" False "), Rating::False);
        assert_eq!(parse_rating("probably"), Rating::Unverified);
        assert_eq!(parse_rating(""), Rating::Unverified);
    }

    #[test]
    fn test_verdict_schema() {
        let verdict: LlmVerdict = serde_json::from_str(
            r#"{"rating": "mixed", "confidence": 0.8, "summary": "Partially supported."}"#,
        )
        .unwrap();
        assert_eq!(verdict.rating, "mixed");
        assert!(verdict.caveats.is_empty());
    }

    #[test]
    fn test_user_prompt_includes_context() {
        let mut claim = Claim::new("c1", "The dam was completed in 1936");
        claim.context = Some("Article about the Hoover Dam".to_string());
        let prompt = LlmAdapter::user_prompt(&claim);
        assert!(prompt.starts_with("Context: Article about the Hoover Dam"));
        assert!(prompt.contains("Claim: The dam was completed in 1936"));
    }
}
