//! Google Fact Check Tools adapter.
//!
//! Queries the claims:search index and folds published reviews into one
//! verdict. Free-text publisher ratings are mapped onto the closed rating
//! vocabulary by ordered substring rules; the aggregate rating is the most
//! frequent mapped rating with ties broken by encounter order.
//!
//! Rate-limit discipline: 429/503 retried up to 3 attempts with exponential
//! backoff; every other failure is surfaced once and downgraded to absent
//! by the caller.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::config::FactCheckConfig;
use crate::error::AdapterError;
use crate::query::search_query;
use crate::retry::RetryPolicy;
use crate::types::{Claim, Evidence, Rating, Verification, MAX_EVIDENCE_ITEMS};

use super::SourceAdapter;

/// Map a publisher's free-text rating to the closed vocabulary.
///
/// Rule order matters: qualified families ("mostly true", "mostly false",
/// the mixed family) must match before the bare "true"/"false" substrings
/// they contain.
pub fn map_textual_rating(text: &str) -> Rating {
    let r = text.to_lowercase();

    if r.contains("mostly true") || r.contains("mostly correct") {
        return Rating::MostlyTrue;
    }
    if r.contains("mostly false") {
        return Rating::MostlyFalse;
    }
    if ["mixed", "mixture", "half", "partly", "misleading"]
        .iter()
        .any(|k| r.contains(k))
    {
        return Rating::Mixed;
    }
    if ["pants on fire", "false", "hoax", "fake", "incorrect"]
        .iter()
        .any(|k| r.contains(k))
    {
        return Rating::False;
    }
    if ["opinion", "satire"].iter().any(|k| r.contains(k)) {
        return Rating::Opinion;
    }
    if r.contains("outdated") || r.contains("no longer") {
        return Rating::Outdated;
    }
    if ["true", "correct", "accurate"].iter().any(|k| r.contains(k)) {
        return Rating::Verified;
    }

    Rating::Unverified
}

// ── Upstream schema ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ClaimSearchResponse {
    #[serde(default)]
    claims: Vec<IndexedClaim>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexedClaim {
    #[serde(default)]
    claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimReview {
    #[serde(default)]
    publisher: Option<Publisher>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    review_date: Option<String>,
    #[serde(default)]
    textual_rating: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    #[serde(default)]
    name: Option<String>,
}

/// Adapter over the Google Fact Check Tools claims:search index.
pub struct FactCheckAdapter {
    config: FactCheckConfig,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl FactCheckAdapter {
    pub fn new(config: FactCheckConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("veracity/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            config,
            http,
            retry: RetryPolicy::transient_http(),
        })
    }

    async fn fetch_reviews(&self, query: &str) -> Result<Vec<ClaimReview>, AdapterError> {
        let key = self.config.api_key.as_deref().unwrap_or_default();
        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[("query", query), ("languageCode", "en"), ("key", key)])
            .send()
            .await
            .map_err(AdapterError::from_http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let body: ClaimSearchResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))?;

        Ok(body
            .claims
            .into_iter()
            .flat_map(|c| c.claim_review)
            .collect())
    }

    /// Fold mapped review ratings into (aggregate rating, confidence).
    fn score_reviews(ratings: &[Rating]) -> Option<(Rating, f64)> {
        if ratings.is_empty() {
            return None;
        }

        // Most frequent rating; ties keep the first encountered.
        let mut counts: Vec<(Rating, usize)> = Vec::new();
        for rating in ratings {
            match counts.iter_mut().find(|(r, _)| r == rating) {
                Some((_, n)) => *n += 1,
                None => counts.push((*rating, 1)),
            }
        }
        // Strict `>` keeps the first-encountered rating on ties.
        let (aggregate, dominant_count) = counts
            .iter()
            .copied()
            .fold((Rating::Unverified, 0), |acc, (r, n)| {
                if n > acc.1 {
                    (r, n)
                } else {
                    acc
                }
            });

        let n = ratings.len();
        let confidence = if n == 1 {
            0.6
        } else {
            let base = (0.5 + 0.1 * n as f64).min(0.9);
            let unanimous = dominant_count == n;
            if unanimous {
                (base + 0.1).min(0.95)
            } else {
                base
            }
        };

        Some((aggregate, confidence))
    }
}

#[async_trait]
impl SourceAdapter for FactCheckAdapter {
    fn name(&self) -> &'static str {
        "google-factcheck"
    }

    async fn verify(&self, claim: &Claim) -> Result<Option<Verification>, AdapterError> {
        let query = search_query(&claim.text, usize::MAX);
        if query.is_empty() {
            return Ok(None);
        }

        let reviews = self
            .retry
            .run(self.name(), || self.fetch_reviews(&query))
            .await?;

        if reviews.is_empty() {
            debug!(claim_id = %claim.id, "no fact-check reviews found");
            return Ok(None);
        }

        let ratings: Vec<Rating> = reviews
            .iter()
            .map(|r| map_textual_rating(r.textual_rating.as_deref().unwrap_or_default()))
            .collect();

        let (rating, confidence) = match Self::score_reviews(&ratings) {
            Some(scored) => scored,
            None => return Ok(None),
        };

        let dominant = ratings.iter().filter(|r| **r == rating).count();
        let evidence: Vec<Evidence> = reviews
            .iter()
            .take(MAX_EVIDENCE_ITEMS)
            .filter_map(|review| {
                review.url.as_ref().map(|url| Evidence {
                    url: url.clone(),
                    source_name: review
                        .publisher
                        .as_ref()
                        .and_then(|p| p.name.clone())
                        .unwrap_or_else(|| "Fact-check publisher".to_string()),
                    quote: review.title.clone(),
                    date_published: review.review_date.clone(),
                    peer_reviewed: None,
                })
            })
            .collect();

        let summary = format!(
            "{} of {} fact-check review{} rate this claim as {}",
            dominant,
            reviews.len(),
            if reviews.len() == 1 { "" } else { "s" },
            rating.label()
        );

        Ok(Some(Verification {
            claim_id: claim.id.clone(),
            rating,
            confidence,
            summary,
            evidence,
            checked_at: Utc::now(),
            caveats: vec![],
        }))
    }
}
