//! Sequential batch scheduling.
//!
//! Claims run strictly one at a time; the pacing pause between cache
//! misses is a deliberate rate-limit control on the shared upstreams, not
//! an accidental limitation. Cache hits skip the pause because they cost
//! the upstreams nothing.

use std::time::Duration;

use tracing::{debug, info};

use crate::aggregator::Aggregator;
use crate::types::{BatchOutcome, Claim, Rating};

/// Runs an ordered batch of claims through the aggregator with inter-claim
/// pacing.
pub struct BatchScheduler<'a> {
    aggregator: &'a Aggregator,
    pacing: Duration,
}

impl<'a> BatchScheduler<'a> {
    pub fn new(aggregator: &'a Aggregator, pacing: Duration) -> Self {
        Self { aggregator, pacing }
    }

    /// Verify every claim in order. The output is index-aligned with the
    /// input; batch size limits are the caller's concern.
    pub async fn run(&self, claims: &[Claim]) -> BatchOutcome {
        let mut verifications = Vec::with_capacity(claims.len());
        let mut cached_count = 0usize;
        let mut verified_count = 0usize;

        for (index, claim) in claims.iter().enumerate() {
            let outcome = self.aggregator.verify_one(claim).await;

            if outcome.cached {
                cached_count += 1;
            }
            if outcome.verification.rating != Rating::Unverified {
                verified_count += 1;
            }

            let is_last = index + 1 == claims.len();
            if !outcome.cached && !is_last {
                debug!(claim_id = %claim.id, pacing_ms = self.pacing.as_millis() as u64, "pacing before next claim");
                tokio::time::sleep(self.pacing).await;
            }

            verifications.push(outcome.verification);
        }

        info!(
            total = claims.len(),
            cached = cached_count,
            verified = verified_count,
            unverified = claims.len() - verified_count,
            "batch complete"
        );

        BatchOutcome {
            verifications,
            cached_count,
        }
    }
}
