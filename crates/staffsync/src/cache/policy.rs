//! Cache freshness policy.

use chrono::{DateTime, Duration, Utc};

use super::CacheEntry;

/// Staleness window for one cached collection.
///
/// An entry is served verbatim while `now - cachedAt < window`; an entry
/// exactly at the boundary is stale. Each screen carries its own window
/// (the registration index refreshes every couple of minutes, client
/// profiles once a day), configured through `CacheConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    window: Duration,
}

impl FreshnessPolicy {
    pub fn from_secs(secs: u64) -> Self {
        Self {
            window: Duration::seconds(secs as i64),
        }
    }

    pub fn minutes(minutes: i64) -> Self {
        Self {
            window: Duration::minutes(minutes),
        }
    }

    pub fn hours(hours: i64) -> Self {
        Self {
            window: Duration::hours(hours),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether the entry may be served without a refetch, as of `now`.
    pub fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.cached_at) < self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_at(cached_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry::captured_at(json!({"k": "v"}), cached_at)
    }

    #[test]
    fn test_fresh_entry_is_hit() {
        let now: DateTime<Utc> = "2026-03-01T12:00:00Z".parse().unwrap();
        let policy = FreshnessPolicy::minutes(2);
        assert!(policy.is_fresh(&entry_at(now), now));
        assert!(policy.is_fresh(&entry_at(now - Duration::seconds(119)), now));
    }

    #[test]
    fn test_stale_entry_is_miss() {
        let now: DateTime<Utc> = "2026-03-01T12:00:00Z".parse().unwrap();
        let policy = FreshnessPolicy::minutes(2);
        // Exactly at the window boundary counts as stale.
        assert!(!policy.is_fresh(&entry_at(now - Duration::seconds(120)), now));
        assert!(!policy.is_fresh(&entry_at(now - Duration::seconds(121)), now));
    }

    #[test]
    fn test_future_capture_is_fresh() {
        // Clock skew: an entry from the future is served, not refetched.
        let now: DateTime<Utc> = "2026-03-01T12:00:00Z".parse().unwrap();
        let policy = FreshnessPolicy::from_secs(60);
        assert!(policy.is_fresh(&entry_at(now + Duration::seconds(30)), now));
    }
}
