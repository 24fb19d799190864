//! Core data model for claim verification.
//!
//! All wire-facing types serialize as camelCase JSON so the daemon API and
//! cached payloads stay compatible with the claim-extraction service that
//! feeds this engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discrete factual statement submitted for verification.
///
/// The id is caller-supplied and unique per request. Claims are immutable
/// once created; the engine never rewrites anything but the `claim_id` on
/// the resulting [`Verification`] (and only on cache hits).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Claim {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            context: None,
            source_url: None,
        }
    }
}

/// One piece of supporting material produced by a source adapter.
///
/// Never mutated after creation; the combiner dedups by `url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub url: String,
    pub source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_reviewed: Option<bool>,
}

/// Closed verdict vocabulary.
///
/// There is deliberately no ordering between ratings; sources are ranked
/// by confidence, never by how "strong" their verdict sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Verified,
    MostlyTrue,
    Mixed,
    MostlyFalse,
    False,
    Unverified,
    Opinion,
    Outdated,
}

impl Rating {
    /// Human-readable label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Verified => "verified",
            Rating::MostlyTrue => "mostly true",
            Rating::Mixed => "mixed",
            Rating::MostlyFalse => "mostly false",
            Rating::False => "false",
            Rating::Unverified => "unverified",
            Rating::Opinion => "opinion",
            Rating::Outdated => "outdated",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The verdict for one claim from one source, or the combined final verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub claim_id: String,
    pub rating: Rating,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub summary: String,
    /// At most [`MAX_EVIDENCE_ITEMS`] entries, deduped by URL.
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    pub checked_at: DateTime<Utc>,
    /// At most [`MAX_CAVEATS`] entries, insertion-ordered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caveats: Vec<String>,
}

/// Cap on merged evidence items per verification.
pub const MAX_EVIDENCE_ITEMS: usize = 10;

/// Cap on merged caveats per verification.
pub const MAX_CAVEATS: usize = 5;

/// Result of verifying a single claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    pub verification: Verification,
    /// True when the verification was served from the cache.
    pub cached: bool,
}

/// Result of verifying an ordered batch of claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Index-aligned with the input claims.
    pub verifications: Vec<Verification>,
    pub cached_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Rating::MostlyTrue).unwrap(), "\"mostly_true\"");
        assert_eq!(serde_json::to_string(&Rating::False).unwrap(), "\"false\"");
        let r: Rating = serde_json::from_str("\"outdated\"").unwrap();
        assert_eq!(r, Rating::Outdated);
    }

    #[test]
    fn test_claim_wire_format_is_camel_case() {
        let claim = Claim {
            id: "c1".into(),
            text: "water boils at 100C".into(),
            context: None,
            source_url: Some("https://example.com/article".into()),
        };
        let json = serde_json::to_string(&claim).unwrap();
        assert!(json.contains("\"sourceUrl\""));
        assert!(!json.contains("\"context\""));
    }

    #[test]
    fn test_verification_round_trip() {
        let v = Verification {
            claim_id: "c1".into(),
            rating: Rating::Mixed,
            confidence: 0.55,
            summary: "conflicting reviews".into(),
            evidence: vec![Evidence {
                url: "https://factcheck.example/1".into(),
                source_name: "Example Checker".into(),
                quote: None,
                date_published: Some("2024-03-01".into()),
                peer_reviewed: None,
            }],
            checked_at: Utc::now(),
            caveats: vec!["title-only analysis".into()],
        };
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"claimId\""));
        assert!(json.contains("\"checkedAt\""));
        let back: Verification = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rating, Rating::Mixed);
        assert_eq!(back.evidence.len(), 1);
    }
}
