//! PubMed literature adapter.
//!
//! Hard-gated to health and medical claims. Runs esearch → esummary,
//! scores article titles for lexical overlap with the claim, classifies
//! relevant titles as supporting or contradicting via fixed keyword lists,
//! and only issues a verdict once at least three relevant articles exist.
//!
//! Title-only analysis is deliberately conservative: the caveats say so on
//! every result.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::config::PubMedConfig;
use crate::error::AdapterError;
use crate::query::{search_query, shared_token_count, significant_words};
use crate::types::{Claim, Evidence, Rating, Verification, MAX_EVIDENCE_ITEMS};

use super::SourceAdapter;

/// Health/medical keyword gate. A claim must contain one of these before
/// PubMed is queried at all.
const HEALTH_KEYWORDS: &[&str] = &[
    // conditions
    "alzheimer", "arthritis", "asthma", "autism", "cancer", "cholesterol",
    "covid", "dementia", "depression", "diabetes", "disease", "flu",
    "infection", "influenza", "obesity", "stroke", "syndrome", "tumor",
    "virus",
    // treatments and substances
    "antibiotic", "drug", "medication", "medicine", "supplement", "surgery",
    "therapy", "treatment", "vaccin", "vitamin",
    // body systems
    "blood", "brain", "cardiac", "heart", "hormone", "immune", "kidney",
    "liver", "lung", "metabolism", "neuron",
    // research process
    "clinical", "diagnosis", "dose", "epidemi", "patient", "placebo",
    "symptom", "trial",
    // general
    "diet", "exercise", "health", "medical", "nutrition",
];

/// Title keywords suggesting a study supports a claim.
const SUPPORT_TERMS: &[&str] = &[
    "confirm", "support", "evidence for", "associated with", "linked to",
    "effective", "efficacy", "benefit", "improve", "reduces risk",
    "protective", "promotes",
];

/// Title keywords suggesting a study contradicts a claim.
const CONTRADICT_TERMS: &[&str] = &[
    "no association", "not associated", "no evidence", "no significant",
    "no effect", "ineffective", "fails to", "refute", "debunk", "myth",
    "contrary to", "does not",
];

/// Minimum shared ≥4-char tokens between title and claim for relevance.
const MIN_SHARED_TOKENS: usize = 2;

/// Minimum relevant articles before a non-neutral verdict is allowed.
const MIN_ARTICLES_FOR_VERDICT: usize = 3;

/// Whether the PubMed stage applies to this claim text at all.
pub fn is_health_claim(text: &str) -> bool {
    let lowered = text.to_lowercase();
    HEALTH_KEYWORDS.iter().any(|k| lowered.contains(k))
}

// ── Upstream schema ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// esummary keys its result object by article uid, so the envelope is
/// parsed loosely and each article strictly.
#[derive(Debug, Deserialize)]
struct ESummaryResponse {
    result: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct ArticleSummary {
    #[serde(default)]
    title: String,
    #[serde(default)]
    pubdate: String,
}

struct ScoredArticle {
    uid: String,
    summary: ArticleSummary,
}

enum Sentiment {
    Supporting,
    Contradicting,
    Neutral,
}

/// Classify a title against the fixed sentiment lists. Mutually exclusive:
/// a title carrying both kinds of terms counts as neutral.
fn classify_title(title: &str) -> Sentiment {
    let lowered = title.to_lowercase();
    let supports = SUPPORT_TERMS.iter().any(|t| lowered.contains(t));
    let contradicts = CONTRADICT_TERMS.iter().any(|t| lowered.contains(t));
    match (supports, contradicts) {
        (true, false) => Sentiment::Supporting,
        (false, true) => Sentiment::Contradicting,
        _ => Sentiment::Neutral,
    }
}

/// Verdict policy over classified relevant articles.
fn verdict(relevant: usize, supporting: usize, contradicting: usize) -> (Rating, f64, String) {
    if relevant < MIN_ARTICLES_FOR_VERDICT {
        return (
            Rating::Unverified,
            0.3,
            format!(
                "Only {} relevant stud{} found; more research needed before a verdict",
                relevant,
                if relevant == 1 { "y" } else { "ies" }
            ),
        );
    }

    let dominant = supporting.max(contradicting);
    let confidence = (0.4 + 0.05 * dominant as f64).min(0.7);

    if supporting > 2 * contradicting {
        (
            Rating::MostlyTrue,
            confidence,
            format!(
                "{} of {} relevant studies support this claim",
                supporting, relevant
            ),
        )
    } else if contradicting > 2 * supporting {
        (
            Rating::MostlyFalse,
            confidence,
            format!(
                "{} of {} relevant studies contradict this claim",
                contradicting, relevant
            ),
        )
    } else {
        (
            Rating::Mixed,
            confidence,
            format!(
                "Published research is split: {} supporting vs {} contradicting among {} relevant studies",
                supporting, contradicting, relevant
            ),
        )
    }
}

fn standing_caveats() -> Vec<String> {
    vec![
        "Analysis is based on article titles only; full texts were not reviewed".to_string(),
        "Scientific consensus may evolve as new research is published".to_string(),
        "Consult a qualified healthcare professional for medical decisions".to_string(),
    ]
}

/// Adapter over the NCBI E-utilities (esearch + esummary).
pub struct PubMedAdapter {
    config: PubMedConfig,
    http: reqwest::Client,
}

impl PubMedAdapter {
    pub fn new(config: PubMedConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("veracity/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self { config, http })
    }

    async fn search_ids(&self, terms: &str) -> Result<Vec<String>, AdapterError> {
        let url = format!("{}/esearch.fcgi", self.config.endpoint);
        let retmax = self.config.max_articles.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("db", "pubmed"),
                ("retmode", "json"),
                ("retmax", retmax.as_str()),
                ("term", terms),
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

        let body: ESearchResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))?;
        Ok(body.esearchresult.idlist)
    }

    async fn fetch_summaries(&self, ids: &[String]) -> Result<Vec<ScoredArticle>, AdapterError> {
        let url = format!("{}/esummary.fcgi", self.config.endpoint);
        let joined = ids.join(",");
        let response = self
            .http
            .get(&url)
            .query(&[("db", "pubmed"), ("retmode", "json"), ("id", joined.as_str())])
            .send()
            .await
            .map_err(AdapterError::from_http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let body: ESummaryResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))?;
        let result = body
            .result
            .ok_or_else(|| AdapterError::Decode("esummary result object missing".to_string()))?;

        // Articles that fail to parse are dropped individually rather than
        // poisoning the whole batch.
        let mut articles = Vec::new();
        for uid in ids {
            if let Some(raw) = result.get(uid) {
                if let Ok(summary) = serde_json::from_value::<ArticleSummary>(raw.clone()) {
                    if !summary.title.is_empty() {
                        articles.push(ScoredArticle {
                            uid: uid.clone(),
                            summary,
                        });
                    }
                }
            }
        }
        Ok(articles)
    }
}

#[async_trait]
impl SourceAdapter for PubMedAdapter {
    fn name(&self) -> &'static str {
        "pubmed"
    }

    async fn verify(&self, claim: &Claim) -> Result<Option<Verification>, AdapterError> {
        // The gate is checked by the aggregator too; keep it here so the
        // adapter is safe to call directly.
        if !is_health_claim(&claim.text) {
            return Ok(None);
        }

        let terms = {
            let significant = significant_words(&claim.text).join(" ");
            if significant.is_empty() {
                search_query(&claim.text, 8)
            } else {
                search_query(&significant, 8)
            }
        };
        if terms.is_empty() {
            return Ok(None);
        }

        let ids = self.search_ids(&terms).await?;
        if ids.is_empty() {
            debug!(claim_id = %claim.id, "no pubmed articles found");
            return Ok(None);
        }

        let articles = self.fetch_summaries(&ids).await?;
        let relevant: Vec<&ScoredArticle> = articles
            .iter()
            .filter(|a| {
                shared_token_count(&a.summary.title, &claim.text, 4) >= MIN_SHARED_TOKENS
            })
            .collect();

        if relevant.is_empty() {
            debug!(claim_id = %claim.id, "no relevant pubmed titles");
            return Ok(None);
        }

        let mut supporting = 0usize;
        let mut contradicting = 0usize;
        for article in &relevant {
            match classify_title(&article.summary.title) {
                Sentiment::Supporting => supporting += 1,
                Sentiment::Contradicting => contradicting += 1,
                Sentiment::Neutral => {}
            }
        }

        let (rating, confidence, summary) = verdict(relevant.len(), supporting, contradicting);

        let evidence: Vec<Evidence> = relevant
            .iter()
            .take(MAX_EVIDENCE_ITEMS)
            .map(|a| Evidence {
                url: format!("https://pubmed.ncbi.nlm.nih.gov/{}/", a.uid),
                source_name: "PubMed".to_string(),
                quote: Some(a.summary.title.clone()),
                date_published: if a.summary.pubdate.is_empty() {
                    None
                } else {
                    Some(a.summary.pubdate.clone())
                },
                peer_reviewed: Some(true),
            })
            .collect();

        Ok(Some(Verification {
            claim_id: claim.id.clone(),
            rating,
            confidence,
            summary,
            evidence,
            checked_at: Utc::now(),
            caveats: standing_caveats(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_health_gate() {
        assert!(is_health_claim("The new vaccine prevents measles"));
        assert!(is_health_claim("Vitamin D reduces cancer risk"));
        assert!(is_health_claim("COVID spreads through the air"));
        assert!(!is_health_claim("The Eiffel Tower is 330 meters tall"));
        assert!(!is_health_claim("The election was held in November"));
    }

    #[test]
    fn test_classify_title_mutually_exclusive() {
        assert!(matches!(
            classify_title("Vitamin D supplementation is effective against influenza"),
            Sentiment::Supporting
        ));
        assert!(matches!(
            classify_title("No association between vaccines and autism"),
            Sentiment::Contradicting
        ));
        // Carries both a support and a contradiction term.
        assert!(matches!(
            classify_title("Treatment is effective but shows no significant benefit at low doses"),
            Sentiment::Neutral
        ));
        assert!(matches!(
            classify_title("A cohort study of dietary patterns"),
            Sentiment::Neutral
        ));
    }

    #[test]
    fn test_verdict_requires_three_relevant() {
        let (rating, confidence, summary) = verdict(2, 2, 0);
        assert_eq!(rating, Rating::Unverified);
        assert_relative_eq!(confidence, 0.3);
        assert!(summary.contains("more research needed"));
    }

    #[test]
    fn test_verdict_mostly_true() {
        // 5 supporting vs 1 contradicting: 5 > 2.
        let (rating, confidence, _) = verdict(7, 5, 1);
        assert_eq!(rating, Rating::MostlyTrue);
        assert_relative_eq!(confidence, 0.65);
    }

    #[test]
    fn test_verdict_mostly_false() {
        let (rating, _, summary) = verdict(5, 1, 4);
        assert_eq!(rating, Rating::MostlyFalse);
        assert!(summary.contains("contradict"));
    }

    #[test]
    fn test_verdict_mixed_when_split() {
        // 3 vs 2: neither side doubles the other.
        let (rating, _, _) = verdict(6, 3, 2);
        assert_eq!(rating, Rating::Mixed);
    }

    #[test]
    fn test_verdict_confidence_cap() {
        let (_, confidence, _) = verdict(10, 9, 0);
        assert_relative_eq!(confidence, 0.7);
    }

    #[test]
    fn test_esummary_schema_drops_bad_articles() {
        let body = r#"{
            "result": {
                "uids": ["1", "2"],
                "1": {"title": "Vaccine efficacy in adults", "pubdate": "2021 Mar"},
                "2": ["not", "an", "object"]
            }
        }"#;
        let parsed: ESummaryResponse = serde_json::from_str(body).unwrap();
        let result = parsed.result.unwrap();
        let good: ArticleSummary =
            serde_json::from_value(result.get("1").unwrap().clone()).unwrap();
        assert_eq!(good.title, "Vaccine efficacy in adults");
        assert!(serde_json::from_value::<ArticleSummary>(result.get("2").unwrap().clone()).is_err());
    }
}
