//! Cross-source combination.
//!
//! Deterministic function from the per-source verdicts of one claim to the
//! final verdict. The top-confidence candidate wins outright on rating,
//! confidence, and summary; the remaining candidates only contribute
//! evidence and caveats. The sort is stable, so equal confidences resolve
//! to the earliest stage.

use std::collections::HashSet;

use chrono::Utc;

use crate::types::{Claim, Rating, Verification, MAX_CAVEATS, MAX_EVIDENCE_ITEMS};

/// The canonical verdict when no source found anything.
pub fn no_sources_verification(claim: &Claim) -> Verification {
    Verification {
        claim_id: claim.id.clone(),
        rating: Rating::Unverified,
        confidence: 0.1,
        summary: "No fact-checks found for this claim".to_string(),
        evidence: vec![],
        checked_at: Utc::now(),
        caveats: vec![
            "No matching fact-checks were found in any connected source".to_string(),
            "Absence of fact-checks does not imply the claim is true or false".to_string(),
        ],
    }
}

/// Merge per-source verifications (in call order) into one final verdict.
pub fn combine_verifications(claim: &Claim, mut candidates: Vec<Verification>) -> Verification {
    if candidates.is_empty() {
        return no_sources_verification(claim);
    }

    // Stable sort: equal confidences keep call order, so the earliest
    // stage wins ties.
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let source_count = candidates.len();
    let primary = &candidates[0];

    let mut evidence = Vec::new();
    let mut seen_urls = HashSet::new();
    'outer: for candidate in &candidates {
        for item in &candidate.evidence {
            if evidence.len() >= MAX_EVIDENCE_ITEMS {
                break 'outer;
            }
            if seen_urls.insert(item.url.clone()) {
                evidence.push(item.clone());
            }
        }
    }

    let mut caveats: Vec<String> = Vec::new();
    for candidate in &candidates {
        for caveat in &candidate.caveats {
            if !caveats.contains(caveat) {
                caveats.push(caveat.clone());
            }
        }
    }
    caveats.truncate(MAX_CAVEATS);

    let summary = if source_count > 1 {
        format!("{} (based on {} sources)", primary.summary, source_count)
    } else {
        primary.summary.clone()
    };

    Verification {
        claim_id: claim.id.clone(),
        rating: primary.rating,
        confidence: primary.confidence,
        summary,
        evidence,
        checked_at: Utc::now(),
        caveats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Evidence;
    use approx::assert_relative_eq;

    fn claim() -> Claim {
        Claim::new("c1", "test claim")
    }

    fn candidate(rating: Rating, confidence: f64, urls: &[&str]) -> Verification {
        Verification {
            claim_id: "c1".into(),
            rating,
            confidence,
            summary: format!("{} summary", rating.label()),
            evidence: urls
                .iter()
                .map(|u| Evidence {
                    url: u.to_string(),
                    source_name: "src".into(),
                    quote: None,
                    date_published: None,
                    peer_reviewed: None,
                })
                .collect(),
            checked_at: Utc::now(),
            caveats: vec![],
        }
    }

    #[test]
    fn test_empty_candidates_canonical_verdict() {
        let v = combine_verifications(&claim(), vec![]);
        assert_eq!(v.rating, Rating::Unverified);
        assert_relative_eq!(v.confidence, 0.1);
        assert!(v.evidence.is_empty());
        assert_eq!(v.caveats.len(), 2);
    }

    #[test]
    fn test_confidence_max_selection() {
        let v = combine_verifications(
            &claim(),
            vec![
                candidate(Rating::False, 0.9, &["https://a"]),
                candidate(Rating::Unverified, 0.4, &["https://b"]),
                candidate(Rating::MostlyTrue, 0.65, &["https://c"]),
            ],
        );
        assert_eq!(v.rating, Rating::False);
        assert_relative_eq!(v.confidence, 0.9);
    }

    #[test]
    fn test_tie_earliest_stage_wins() {
        let v = combine_verifications(
            &claim(),
            vec![
                candidate(Rating::Mixed, 0.5, &["https://first"]),
                candidate(Rating::Unverified, 0.5, &["https://second"]),
            ],
        );
        assert_eq!(v.rating, Rating::Mixed);
        assert_eq!(v.evidence[0].url, "https://first");
    }

    #[test]
    fn test_evidence_merge_dedups_and_caps() {
        let primary_urls: Vec<String> = (0..6).map(|i| format!("https://p/{i}")).collect();
        let secondary_urls: Vec<String> = (0..8).map(|i| {
            // Overlap on the first two.
            if i < 2 { format!("https://p/{i}") } else { format!("https://s/{i}") }
        }).collect();
        let p_refs: Vec<&str> = primary_urls.iter().map(|s| s.as_str()).collect();
        let s_refs: Vec<&str> = secondary_urls.iter().map(|s| s.as_str()).collect();

        let v = combine_verifications(
            &claim(),
            vec![
                candidate(Rating::Verified, 0.9, &p_refs),
                candidate(Rating::Unverified, 0.3, &s_refs),
            ],
        );

        assert_eq!(v.evidence.len(), MAX_EVIDENCE_ITEMS);
        let unique: HashSet<&str> = v.evidence.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(unique.len(), v.evidence.len());
        // Primary evidence comes first.
        assert_eq!(v.evidence[0].url, "https://p/0");
    }

    #[test]
    fn test_caveat_union_cap() {
        let mut a = candidate(Rating::Mixed, 0.8, &[]);
        a.caveats = (0..4).map(|i| format!("caveat-a-{i}")).collect();
        let mut b = candidate(Rating::Unverified, 0.4, &[]);
        b.caveats = vec!["caveat-a-0".to_string(), "caveat-b-0".to_string(), "caveat-b-1".to_string()];

        let v = combine_verifications(&claim(), vec![a, b]);
        assert_eq!(v.caveats.len(), MAX_CAVEATS);
        // Dedup kept the shared caveat once, in first-insertion position.
        assert_eq!(v.caveats[0], "caveat-a-0");
        assert_eq!(v.caveats[4], "caveat-b-0");
    }

    #[test]
    fn test_summary_suffix_only_for_multiple_sources() {
        let single = combine_verifications(&claim(), vec![candidate(Rating::Verified, 0.9, &[])]);
        assert_eq!(single.summary, "verified summary");

        let multi = combine_verifications(
            &claim(),
            vec![
                candidate(Rating::Verified, 0.9, &[]),
                candidate(Rating::Unverified, 0.3, &[]),
            ],
        );
        assert_eq!(multi.summary, "verified summary (based on 2 sources)");
    }

    #[test]
    fn test_claim_id_comes_from_claim() {
        let mut other = claim();
        other.id = "different".to_string();
        let v = combine_verifications(&other, vec![candidate(Rating::Verified, 0.9, &[])]);
        assert_eq!(v.claim_id, "different");
    }
}
