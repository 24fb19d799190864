//! Verification cache with TTL expiry.
//!
//! Keys are normalized-text fingerprints, not claim ids: two callers
//! submitting the same claim text share one entry. The cache is an explicit
//! instance owned by the binary and injected into the engine. Losing it
//! only costs latency, never correctness.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::types::Verification;

/// Namespace tag prefixed to every fingerprint.
const FINGERPRINT_NAMESPACE: &str = "claim:v1:";

/// Normalized characters kept from the claim text (everything else drops).
const FINGERPRINT_MAX_CHARS: usize = 200;

/// Derive the cache fingerprint for a claim text.
///
/// lowercase → strip non-word/non-space characters → collapse whitespace →
/// trim → truncate to 200 chars → namespace prefix. Pure function of the
/// text alone; punctuation, casing, and content past the truncation point
/// intentionally collide to raise the hit rate.
pub fn claim_fingerprint(text: &str) -> String {
    let lowered = text.to_lowercase();
    // Punctuation vanishes entirely ("don't" → "dont"); whitespace survives
    // so the collapse below can fold runs into single spaces.
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    let collapsed: String = stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let truncated: String = collapsed.chars().take(FINGERPRINT_MAX_CHARS).collect();
    format!("{}{}", FINGERPRINT_NAMESPACE, truncated)
}

/// Cache counters exposed over the daemon API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub key_count: usize,
    pub hits: u64,
    pub misses: u64,
}

struct CacheEntry {
    verification: Verification,
    expires_at: Instant,
}

/// In-memory TTL cache mapping claim fingerprints to verifications.
///
/// Safe for concurrent readers and writers: multiple batches may run at the
/// service boundary even though each batch is sequential internally.
pub struct VerificationCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl VerificationCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a fingerprint. Expired entries count as misses and are
    /// dropped on the spot.
    pub fn get(&self, key: &str) -> Option<Verification> {
        let expired = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key, "verification cache hit");
                    return Some(entry.verification.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            // Re-check under the write lock; another writer may have
            // refreshed the entry since the read.
            if let Some(entry) = entries.get(key) {
                if entry.expires_at <= Instant::now() {
                    entries.remove(key);
                    debug!(key, "verification cache entry expired");
                }
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a verification under `key`, with an optional TTL override.
    pub fn set(&self, key: &str, verification: Verification, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            verification,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), entry);
    }

    /// Drop every entry. Counters are preserved.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        CacheStats {
            key_count: entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;
    use chrono::Utc;

    fn verification(claim_id: &str) -> Verification {
        Verification {
            claim_id: claim_id.into(),
            rating: Rating::Verified,
            confidence: 0.9,
            summary: "checked".into(),
            evidence: vec![],
            checked_at: Utc::now(),
            caveats: vec![],
        }
    }

    #[test]
    fn test_fingerprint_idempotent() {
        let text = "The Earth orbits the Sun.";
        assert_eq!(claim_fingerprint(text), claim_fingerprint(text));
    }

    #[test]
    fn test_fingerprint_normalizes_case_and_punctuation() {
        let a = claim_fingerprint("Vaccines cause autism!!!");
        let b = claim_fingerprint("vaccines   cause autism");
        assert_eq!(a, b);
        assert!(a.starts_with("claim:v1:"));
        assert_eq!(a, "claim:v1:vaccines cause autism");
    }

    #[test]
    fn test_fingerprint_truncates_long_text() {
        let long_a = format!("{} tail-one", "word ".repeat(60));
        let long_b = format!("{} tail-two", "word ".repeat(60));
        // Both normalize past 200 chars, so the differing tails vanish.
        assert_eq!(claim_fingerprint(&long_a), claim_fingerprint(&long_b));
        let key = claim_fingerprint(&long_a);
        assert_eq!(key.chars().count(), "claim:v1:".len() + 200);
    }

    #[test]
    fn test_fingerprint_total_over_empty_input() {
        assert_eq!(claim_fingerprint(""), "claim:v1:");
        assert_eq!(claim_fingerprint("!!! ???"), "claim:v1:");
    }

    #[test]
    fn test_cache_get_set_and_stats() {
        let cache = VerificationCache::new(Duration::from_secs(60));
        let key = claim_fingerprint("some claim");

        assert!(cache.get(&key).is_none());
        cache.set(&key, verification("c1"), None);
        let hit = cache.get(&key).expect("entry should be live");
        assert_eq!(hit.claim_id, "c1");

        let stats = cache.stats();
        assert_eq!(stats.key_count, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_cache_ttl_expiry() {
        let cache = VerificationCache::new(Duration::from_secs(60));
        let key = claim_fingerprint("short lived");
        cache.set(&key, verification("c1"), Some(Duration::from_millis(0)));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&key).is_none());
        // The expired entry is pruned, not just hidden.
        assert_eq!(cache.stats().key_count, 0);
    }

    #[test]
    fn test_cache_clear_keeps_counters() {
        let cache = VerificationCache::new(Duration::from_secs(60));
        let key = claim_fingerprint("cleared claim");
        cache.set(&key, verification("c1"), None);
        assert!(cache.get(&key).is_some());
        cache.clear();
        assert!(cache.get(&key).is_none());
        let stats = cache.stats();
        assert_eq!(stats.key_count, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
