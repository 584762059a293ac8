//! Freshness-bounded cache of group member lists

use crate::config::DEFAULT_CACHE_TTL_SECS;
use crate::directory::clock::{Clock, SystemClock};
use crate::directory::fetcher::MemberFetcher;
use crate::directory::types::{GroupCacheEntry, GroupId, MemberListResponse, MemberRecord, UserId};
use crate::error::Result;
use crate::logging::log_error;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
    pub refresh_errors: u64,
    pub lookups: u64,
    pub resolved: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    refresh_errors: AtomicU64,
    lookups: AtomicU64,
    resolved: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refresh_errors: self.refresh_errors.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
        }
    }
}

/// Per-group member directory with a time-based expiration policy
///
/// Fetching is always caller-initiated through [`MemberDirectory::ensure_fresh`];
/// [`MemberDirectory::lookup`] only reads what is already cached. Entries are replaced
/// wholesale on refresh and never evicted otherwise.
pub struct MemberDirectory {
    /// Group rosters keyed by group id
    groups: DashMap<GroupId, GroupCacheEntry>,

    /// How long a roster stays fresh
    ttl: Duration,

    clock: Arc<dyn Clock>,

    stats: Counters,
}

impl Default for MemberDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberDirectory {
    /// Create a new directory with the default 3000s freshness window
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }

    /// Create a new directory with a custom freshness window
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a new directory with a custom freshness window and clock
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        tracing::info!(ttl_secs = ttl.as_secs(), "Creating member directory cache");

        Self {
            groups: DashMap::new(),
            ttl,
            clock,
            stats: Counters::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether a fresh roster is cached for `group_id`
    pub fn is_fresh(&self, group_id: &GroupId) -> bool {
        let now = self.clock.now();
        self.groups
            .get(group_id)
            .is_some_and(|entry| entry.is_fresh(now, self.ttl))
    }

    /// Make sure the roster for `group_id` is fresh, refetching when absent or stale
    ///
    /// Never fails: fetch faults and malformed responses are logged and the cache is left
    /// as it was (stale or absent).
    pub async fn ensure_fresh(&self, group_id: &GroupId, fetcher: &dyn MemberFetcher) {
        // The map guard must not be held across the fetch
        if let Some(entry) = self.groups.get(group_id) {
            let now = self.clock.now();
            if entry.is_fresh(now, self.ttl) {
                Counters::bump(&self.stats.hits);
                tracing::trace!(
                    group_id = %group_id,
                    members = entry.members.len(),
                    "Member cache hit"
                );
                return;
            }
            tracing::debug!(
                group_id = %group_id,
                age_secs = now.saturating_duration_since(entry.last_updated).as_secs(),
                "Member cache entry stale"
            );
        }

        Counters::bump(&self.stats.misses);
        tracing::debug!(group_id = %group_id, "Member cache miss, fetching member list");

        if let Err(e) = self.refresh(group_id, fetcher).await {
            Counters::bump(&self.stats.refresh_errors);
            log_error("ensure_fresh", group_id.as_str(), &e);
        }
    }

    /// Fetch and replace the roster for `group_id`
    async fn refresh(&self, group_id: &GroupId, fetcher: &dyn MemberFetcher) -> Result<()> {
        let fetched_at = self.clock.now();
        let raw = fetcher.fetch_group_members(group_id).await?;
        let members = MemberListResponse::decode(raw)?;

        Counters::bump(&self.stats.refreshes);
        tracing::info!(
            group_id = %group_id,
            members = members.len(),
            "Updated group member cache"
        );

        // Concurrent refreshes for the same group: last writer wins
        self.groups
            .insert(group_id.clone(), GroupCacheEntry::new(members, fetched_at));
        Ok(())
    }

    /// Resolve a mentioned name to a member id
    ///
    /// Matches the trimmed name exactly against each member's nickname or card, first
    /// match in fetch order wins. Does not fetch: returns `None` when nothing is cached.
    pub fn lookup(&self, group_id: &GroupId, name: &str) -> Option<UserId> {
        Counters::bump(&self.stats.lookups);

        let Some(entry) = self.groups.get(group_id) else {
            tracing::warn!(group_id = %group_id, "Member cache for group does not exist");
            return None;
        };

        let name = name.trim();
        tracing::debug!(
            group_id = %group_id,
            name = %name,
            members = entry.members.len(),
            "Looking up member by name"
        );

        if name.is_empty() {
            return None;
        }

        let user_id = entry.find(name).map(|m| m.user_id.clone());
        if let Some(user_id) = &user_id {
            Counters::bump(&self.stats.resolved);
            tracing::debug!(group_id = %group_id, name = %name, user_id = %user_id, "Member found");
        }
        user_id
    }

    /// Snapshot of the cached roster for `group_id`, regardless of freshness
    pub fn members(&self, group_id: &GroupId) -> Option<Vec<MemberRecord>> {
        self.groups.get(group_id).map(|entry| entry.members.clone())
    }

    /// Drop the cached roster so the next `ensure_fresh` refetches
    pub fn invalidate(&self, group_id: &GroupId) -> bool {
        let removed = self.groups.remove(group_id).is_some();
        if removed {
            tracing::debug!(group_id = %group_id, "Invalidated member cache entry");
        }
        removed
    }

    /// Number of groups with a cached roster
    pub fn cache_size(&self) -> usize {
        self.groups.len()
    }

    pub fn get_stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Log cache statistics (for periodic monitoring)
    pub fn log_stats(&self) {
        let stats = self.get_stats();

        let hit_rate = if stats.hits + stats.misses > 0 {
            (stats.hits as f32 / (stats.hits + stats.misses) as f32 * 100.0) as u32
        } else {
            0
        };

        let resolve_rate = if stats.lookups > 0 {
            (stats.resolved as f32 / stats.lookups as f32 * 100.0) as u32
        } else {
            0
        };

        tracing::info!(
            groups_cached = self.cache_size(),
            hit_rate = hit_rate,
            resolve_rate = resolve_rate,
            refreshes = stats.refreshes,
            refresh_errors = stats.refresh_errors,
            "Member cache statistics"
        );
    }
}
