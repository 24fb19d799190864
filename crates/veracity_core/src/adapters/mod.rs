//! Source adapters.
//!
//! Each adapter queries one external evidence source and normalizes its
//! answer into a [`Verification`]. `Ok(None)` means "found nothing
//! relevant", never an error. Adapters are independent and share no state;
//! the aggregator owns sequencing and error downgrade.

mod factcheck;
mod llm;
mod pubmed;
mod wikipedia;

pub use factcheck::{map_textual_rating, FactCheckAdapter};
pub use llm::LlmAdapter;
pub use pubmed::{is_health_claim, PubMedAdapter};
pub use wikipedia::WikipediaAdapter;

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::types::{Claim, Verification};

/// One external evidence source.
///
/// Production adapters wrap an HTTP upstream; tests inject scripted fakes
/// through the same trait.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable source name, used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Query the source for a verdict on `claim`.
    async fn verify(&self, claim: &Claim) -> Result<Option<Verification>, AdapterError>;
}

// Shared handles delegate, so a caller can keep a reference to an adapter
// it hands to the aggregator (tests do this to observe call counts).
#[async_trait]
impl<T: SourceAdapter + ?Sized> SourceAdapter for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn verify(&self, claim: &Claim) -> Result<Option<Verification>, AdapterError> {
        (**self).verify(claim).await
    }
}

/// Fake adapter for deterministic tests.
///
/// Returns pre-configured responses in order (the last one repeats once the
/// script runs out) and counts how many times it was called.
pub struct FakeAdapter {
    name: &'static str,
    responses: std::sync::Mutex<Vec<Result<Option<Verification>, AdapterError>>>,
    call_count: std::sync::atomic::AtomicUsize,
}

impl FakeAdapter {
    pub fn new(
        name: &'static str,
        responses: Vec<Result<Option<Verification>, AdapterError>>,
    ) -> Self {
        Self {
            name,
            responses: std::sync::Mutex::new(responses),
            call_count: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A fake that always answers with the same verification.
    pub fn always(name: &'static str, verification: Verification) -> Self {
        Self::new(name, vec![Ok(Some(verification))])
    }

    /// A fake that always finds nothing.
    pub fn absent(name: &'static str) -> Self {
        Self::new(name, vec![Ok(None)])
    }

    /// A fake that always fails.
    pub fn failing(name: &'static str, error: AdapterError) -> Self {
        Self::new(name, vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for FakeAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn verify(&self, _claim: &Claim) -> Result<Option<Verification>, AdapterError> {
        self.call_count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        if responses.is_empty() {
            return Ok(None);
        }
        if responses.len() == 1 {
            responses[0].clone()
        } else {
            responses.remove(0)
        }
    }
}
