//! Wikipedia reference adapter.
//!
//! Wikipedia is supplementary-only: it contributes background evidence but
//! never a verdict, so the rating is always `unverified` and confidence is
//! capped low enough that it can never outrank a real fact-check. Relevance
//! blends significant-word overlap with verbatim numeric matches, since a
//! number in a claim ("330 meters", "1889") is the strongest lexical signal
//! an encyclopedia extract can confirm.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::config::WikipediaConfig;
use crate::error::AdapterError;
use crate::query::{numeric_tokens, search_query, significant_words};
use crate::types::{Claim, Evidence, Rating, Verification};

use super::SourceAdapter;

/// Blended score above this is relevant (numeric match alone also passes).
const RELEVANCE_THRESHOLD: f64 = 0.3;

/// Confidence cap: Wikipedia is explicitly non-authoritative.
const MAX_CONFIDENCE: f64 = 0.5;

// ── Upstream schema ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    pageid: u64,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, PageExtract>,
}

#[derive(Debug, Deserialize)]
struct PageExtract {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
}

/// One scored candidate page.
struct ScoredPage {
    title: String,
    extract: String,
    score: f64,
    matched_terms: Vec<String>,
    matched_numbers: usize,
}

/// Score a page extract against the claim.
///
/// 0.6 × (fraction of significant claim words present) +
/// 0.4 × (fraction of claim numeric tokens present verbatim).
fn score_extract(claim_text: &str, extract: &str) -> (f64, Vec<String>, usize) {
    let lowered = extract.to_lowercase();

    let significant = significant_words(claim_text);
    let matched_terms: Vec<String> = significant
        .iter()
        .filter(|w| lowered.contains(w.as_str()))
        .cloned()
        .collect();
    let word_frac = if significant.is_empty() {
        0.0
    } else {
        matched_terms.len() as f64 / significant.len() as f64
    };

    let numbers = numeric_tokens(claim_text);
    let matched_numbers = numbers.iter().filter(|n| lowered.contains(n.as_str())).count();
    let num_frac = if numbers.is_empty() {
        0.0
    } else {
        matched_numbers as f64 / numbers.len() as f64
    };

    (0.6 * word_frac + 0.4 * num_frac, matched_terms, matched_numbers)
}

fn page_url(title: &str) -> String {
    format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_"))
}

/// Adapter over the MediaWiki search + extracts API.
pub struct WikipediaAdapter {
    config: WikipediaConfig,
    http: reqwest::Client,
}

impl WikipediaAdapter {
    pub fn new(config: WikipediaConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("veracity/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self { config, http })
    }

    async fn search_pages(&self, terms: &str) -> Result<Vec<SearchHit>, AdapterError> {
        let limit = self.config.max_pages.to_string();
        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srlimit", limit.as_str()),
                ("srsearch", terms),
            ])
            .send()
            .await
            .map_err(AdapterError::from_http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))?;
        Ok(body.query.map(|q| q.search).unwrap_or_default())
    }

    async fn fetch_extracts(&self, hits: &[SearchHit]) -> Result<Vec<PageExtract>, AdapterError> {
        let ids = hits
            .iter()
            .map(|h| h.pageid.to_string())
            .collect::<Vec<_>>()
            .join("|");
        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("format", "json"),
                ("pageids", ids.as_str()),
            ])
            .send()
            .await
            .map_err(AdapterError::from_http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let body: ExtractResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))?;
        let mut pages = body.query.map(|q| q.pages).unwrap_or_default();

        // The pages object is keyed by pageid; restore search ranking order.
        Ok(hits
            .iter()
            .filter_map(|h| pages.remove(&h.pageid.to_string()))
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for WikipediaAdapter {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    async fn verify(&self, claim: &Claim) -> Result<Option<Verification>, AdapterError> {
        let terms = search_query(&claim.text, 10);
        if terms.is_empty() {
            return Ok(None);
        }

        let hits = self.search_pages(&terms).await?;
        if hits.is_empty() {
            debug!(claim_id = %claim.id, "no wikipedia results");
            return Ok(None);
        }

        let extracts = self.fetch_extracts(&hits).await?;
        let claim_has_numbers = !numeric_tokens(&claim.text).is_empty();

        let mut relevant: Vec<ScoredPage> = extracts
            .into_iter()
            .filter(|p| !p.extract.is_empty())
            .filter_map(|p| {
                let (score, matched_terms, matched_numbers) =
                    score_extract(&claim.text, &p.extract);
                let is_relevant = score > RELEVANCE_THRESHOLD
                    || (claim_has_numbers && matched_numbers >= 1);
                if is_relevant {
                    Some(ScoredPage {
                        title: p.title,
                        extract: p.extract,
                        score,
                        matched_terms,
                        matched_numbers,
                    })
                } else {
                    None
                }
            })
            .collect();

        if relevant.is_empty() {
            debug!(claim_id = %claim.id, "no wikipedia page cleared relevance");
            return Ok(None);
        }

        // Best page first; ties keep search ranking order.
        relevant.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let best = &relevant[0];

        let top_terms = best
            .matched_terms
            .iter()
            .take(5)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let summary = if top_terms.is_empty() {
            format!(
                "Wikipedia article \"{}\" covers this topic ({} matching figure{})",
                best.title,
                best.matched_numbers,
                if best.matched_numbers == 1 { "" } else { "s" }
            )
        } else {
            format!(
                "Wikipedia article \"{}\" covers this topic (key terms: {})",
                best.title, top_terms
            )
        };

        let confidence = (0.2 + 0.5 * best.score).min(MAX_CONFIDENCE);

        let evidence: Vec<Evidence> = relevant
            .iter()
            .map(|p| Evidence {
                url: page_url(&p.title),
                source_name: "Wikipedia".to_string(),
                quote: Some(p.extract.chars().take(200).collect()),
                date_published: None,
                peer_reviewed: None,
            })
            .collect();

        Ok(Some(Verification {
            claim_id: claim.id.clone(),
            rating: Rating::Unverified,
            confidence,
            summary,
            evidence,
            checked_at: Utc::now(),
            caveats: vec![
                "Wikipedia is a general reference, not a fact-checking source".to_string(),
            ],
        }))
    }
}
