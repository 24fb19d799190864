//! Per-claim verification pipeline.
//!
//! Stages run one at a time in fixed precedence order: cache, fact-check
//! index, medical literature, encyclopedia reference, LLM fallback. A stage
//! failure is logged and contributes nothing; it never aborts the stages
//! after it. The combined verdict is written back to the cache before
//! returning.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::{
    is_health_claim, FactCheckAdapter, LlmAdapter, PubMedAdapter, SourceAdapter, WikipediaAdapter,
};
use crate::cache::{claim_fingerprint, VerificationCache};
use crate::combine::combine_verifications;
use crate::config::VerifierConfig;
use crate::types::{Claim, Rating, Verification, VerifyOutcome};

/// Sequences the adapter stages for one claim and merges their verdicts.
///
/// The cache is injected, never global: the owning binary constructs one
/// [`VerificationCache`] at startup and hands it to the aggregator (and to
/// anything else that needs stats or flushing).
pub struct Aggregator {
    cache: Arc<VerificationCache>,
    factcheck: Option<Box<dyn SourceAdapter>>,
    pubmed: Box<dyn SourceAdapter>,
    wikipedia: Box<dyn SourceAdapter>,
    llm: Option<Box<dyn SourceAdapter>>,
}

impl Aggregator {
    /// Build production adapters from config. Credential-gated stages
    /// (fact-check index, LLM fallback) are absent when unconfigured:
    /// skipped, not errored.
    pub fn from_config(config: &VerifierConfig, cache: Arc<VerificationCache>) -> anyhow::Result<Self> {
        let factcheck: Option<Box<dyn SourceAdapter>> = if config.factcheck.api_key.is_some() {
            Some(Box::new(FactCheckAdapter::new(config.factcheck.clone())?))
        } else {
            None
        };
        let llm: Option<Box<dyn SourceAdapter>> = if config.llm.credential_configured() {
            Some(Box::new(LlmAdapter::new(config.llm.clone())?))
        } else {
            None
        };

        Ok(Self {
            cache,
            factcheck,
            pubmed: Box::new(PubMedAdapter::new(config.pubmed.clone())?),
            wikipedia: Box::new(WikipediaAdapter::new(config.wikipedia.clone())?),
            llm,
        })
    }

    /// Assemble from explicit adapters. This is how tests inject fakes.
    pub fn with_adapters(
        cache: Arc<VerificationCache>,
        factcheck: Option<Box<dyn SourceAdapter>>,
        pubmed: Box<dyn SourceAdapter>,
        wikipedia: Box<dyn SourceAdapter>,
        llm: Option<Box<dyn SourceAdapter>>,
    ) -> Self {
        Self {
            cache,
            factcheck,
            pubmed,
            wikipedia,
            llm,
        }
    }

    pub fn cache(&self) -> &Arc<VerificationCache> {
        &self.cache
    }

    /// Run one adapter stage, downgrading any failure to absent.
    async fn run_stage(&self, adapter: &dyn SourceAdapter, claim: &Claim) -> Option<Verification> {
        match adapter.verify(claim).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    source = adapter.name(),
                    claim_id = %claim.id,
                    error = %err,
                    "source stage failed, continuing without it"
                );
                None
            }
        }
    }

    /// Verify a single claim through the full stage pipeline.
    pub async fn verify_one(&self, claim: &Claim) -> VerifyOutcome {
        let key = claim_fingerprint(&claim.text);

        if let Some(mut cached) = self.cache.get(&key) {
            cached.claim_id = claim.id.clone();
            return VerifyOutcome {
                verification: cached,
                cached: true,
            };
        }

        let mut candidates: Vec<Verification> = Vec::new();

        // Authoritative stage: the fact-check index. An unverified answer
        // here carries no signal, so it is not recorded as a candidate.
        if let Some(adapter) = &self.factcheck {
            if let Some(verification) = self.run_stage(adapter.as_ref(), claim).await {
                if verification.rating != Rating::Unverified {
                    candidates.push(verification);
                }
            }
        }

        // Domain stage: medical literature, hard-gated on claim text.
        if is_health_claim(&claim.text) {
            if let Some(verification) = self.run_stage(self.pubmed.as_ref(), claim).await {
                candidates.push(verification);
            }
        }

        // Reference stage: supplementary evidence only counts when the
        // encyclopedia actually produced pages.
        if let Some(verification) = self.run_stage(self.wikipedia.as_ref(), claim).await {
            if !verification.evidence.is_empty() {
                candidates.push(verification);
            }
        }

        // Fallback stage: last resort, only when nothing above produced a
        // usable verdict.
        let nothing_usable = candidates.is_empty()
            || candidates.iter().all(|c| c.rating == Rating::Unverified);
        if nothing_usable {
            if let Some(adapter) = &self.llm {
                if let Some(verification) = self.run_stage(adapter.as_ref(), claim).await {
                    candidates.push(verification);
                }
            }
        }

        debug!(
            claim_id = %claim.id,
            candidates = candidates.len(),
            "combining source verdicts"
        );
        let verification = combine_verifications(claim, candidates);
        self.cache.set(&key, verification.clone(), None);

        VerifyOutcome {
            verification,
            cached: false,
        }
    }
}
