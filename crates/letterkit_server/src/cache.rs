//! TTL response cache keyed by a hash of the request.

use crate::config::CacheConfig;
use crate::error::ServerResult;
use crate::messages::GenerateRequest;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::trace;

/// SHA-256 of a request's canonical JSON encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Hashes arbitrary bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Derives the key for a request.
    ///
    /// The request is re-encoded first, so bodies that differ only in
    /// whitespace or key order map to the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be serialized.
    pub fn for_request(request: &GenerateRequest) -> ServerResult<Self> {
        let canonical = serde_json::to_vec(request)?;
        Ok(Self::from_bytes(&canonical))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 8 bytes are plenty to tell keys apart in logs.
        write!(f, "CacheKey(")?;
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "…)")
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Bounded cache whose entries expire after a fixed TTL.
#[derive(Debug)]
pub struct ResponseCache<V> {
    config: CacheConfig,
    entries: Mutex<HashMap<CacheKey, Entry<V>>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Creates an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a live entry.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Returns the entry if it is still live at `now`; expired entries are
    /// removed on access.
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<V> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.inserted_at) >= self.config.ttl,
            None => return None,
        };
        if expired {
            trace!(?key, "cache entry expired");
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores a value.
    pub fn insert(&self, key: CacheKey, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Stores a value as of `now`, evicting expired entries and then the
    /// oldest ones beyond `max_entries`.
    pub fn insert_at(&self, key: CacheKey, value: V, now: Instant) {
        if self.config.max_entries == 0 {
            return;
        }

        let mut entries = self.entries.lock();
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
            },
        );

        if entries.len() > self.config.max_entries {
            let ttl = self.config.ttl;
            entries.retain(|_, e| now.saturating_duration_since(e.inserted_at) < ttl);
        }
        while entries.len() > self.config.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| *k);
            match oldest {
                Some(oldest) => {
                    trace!(key = ?oldest, "evicting oldest cache entry");
                    entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Removes every expired entry. Returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        let ttl = self.config.ttl;
        entries.retain(|_, e| now.saturating_duration_since(e.inserted_at) < ttl);
        before - entries.len()
    }

    /// Number of stored entries (live or not yet purged).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterkit_core::Language;
    use std::time::Duration;

    fn cache(max_entries: usize) -> ResponseCache<String> {
        ResponseCache::new(CacheConfig::new(Duration::from_secs(10), max_entries))
    }

    fn key(n: u8) -> CacheKey {
        CacheKey::from_bytes(&[n])
    }

    #[test]
    fn equivalent_bodies_share_a_key() {
        let a: GenerateRequest =
            serde_json::from_str(r#"{"prompt":"Hi","language":"en","tone":"warm"}"#).unwrap();
        let b: GenerateRequest =
            serde_json::from_str(r#"{ "tone": "warm", "language": "en", "prompt": "Hi" }"#)
                .unwrap();
        assert_eq!(
            CacheKey::for_request(&a).unwrap(),
            CacheKey::for_request(&b).unwrap()
        );

        let c = GenerateRequest::new("Hi", Language::Arabic).with_tone("warm");
        assert_ne!(
            CacheKey::for_request(&a).unwrap(),
            CacheKey::for_request(&c).unwrap()
        );
    }

    #[test]
    fn key_display_is_hex() {
        let shown = key(1).to_string();
        assert_eq!(shown.len(), 64);
        assert!(shown.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn entries_expire() {
        let cache = cache(4);
        let now = Instant::now();
        cache.insert_at(key(1), "letter".into(), now);

        assert_eq!(
            cache.get_at(&key(1), now + Duration::from_secs(9)),
            Some("letter".into())
        );
        assert_eq!(cache.get_at(&key(1), now + Duration::from_secs(10)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_evicted_beyond_capacity() {
        let cache = cache(2);
        let now = Instant::now();
        cache.insert_at(key(1), "a".into(), now);
        cache.insert_at(key(2), "b".into(), now + Duration::from_millis(1));
        cache.insert_at(key(3), "c".into(), now + Duration::from_millis(2));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at(&key(1), now), None);
        assert_eq!(cache.get_at(&key(3), now), Some("c".into()));
    }

    #[test]
    fn purge_removes_only_expired() {
        let cache = cache(8);
        let now = Instant::now();
        cache.insert_at(key(1), "old".into(), now);
        cache.insert_at(key(2), "new".into(), now + Duration::from_secs(5));

        assert_eq!(cache.purge_expired(now + Duration::from_secs(12)), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = cache(0);
        cache.insert(key(1), "x".into());
        assert!(cache.is_empty());
    }
}
