//! veracity_core: claim verification engine.
//!
//! Verifies natural-language factual claims by querying independent
//! evidence sources (fact-check index, medical literature, encyclopedia,
//! LLM fallback), reconciling their verdicts into one aggregate
//! [`Verification`], and caching results by normalized claim text.
//!
//! The two entry points most callers want:
//!
//! ```no_run
//! # async fn example() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use std::time::Duration;
//! use veracity_core::{Aggregator, BatchScheduler, Claim, VerificationCache, VerifierConfig};
//!
//! let config = VerifierConfig::load()?;
//! let cache = Arc::new(VerificationCache::new(Duration::from_secs(config.cache.ttl_secs)));
//! let aggregator = Aggregator::from_config(&config, cache)?;
//!
//! let outcome = aggregator.verify_one(&Claim::new("c1", "The Moon orbits the Earth")).await;
//! println!("{} ({:.2})", outcome.verification.rating, outcome.verification.confidence);
//!
//! let scheduler = BatchScheduler::new(&aggregator, Duration::from_millis(config.batch.pacing_ms));
//! let batch = scheduler.run(&[Claim::new("c2", "Water boils at 100C at sea level")]).await;
//! println!("{} cached", batch.cached_count);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod aggregator;
pub mod cache;
pub mod combine;
pub mod config;
pub mod error;
pub mod query;
pub mod retry;
pub mod scheduler;
pub mod types;

pub use adapters::SourceAdapter;
pub use aggregator::Aggregator;
pub use cache::{claim_fingerprint, CacheStats, VerificationCache};
pub use config::VerifierConfig;
pub use error::AdapterError;
pub use scheduler::BatchScheduler;
pub use types::{BatchOutcome, Claim, Evidence, Rating, Verification, VerifyOutcome};
