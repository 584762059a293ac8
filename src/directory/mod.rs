//! Group member directory
//!
//! Resolves the names a reply mentions to member ids within a group.
//!
//! - Per-group rosters, fetched on demand and replaced wholesale
//! - Freshness window: 3000 seconds by default (configurable)
//! - Two response shapes accepted: a bare list or a `{data: [...]}` envelope
//! - Graceful degradation: fetch failures are logged and stale data keeps serving

mod cache;
mod clock;
mod fetcher;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheStats, MemberDirectory};
pub use clock::{Clock, SystemClock};
pub use fetcher::{MemberFetcher, OneBotClient};
pub use types::{GroupCacheEntry, GroupId, MemberListResponse, MemberRecord, UserId};
