//! Test doubles for the member directory

use crate::directory::{Clock, GroupId, MemberFetcher};
use crate::error::{AutoAtError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

/// Fetcher replaying a fixed reply and counting calls
pub struct FakeFetcher {
    reply: Mutex<Option<serde_json::Value>>,
    pub calls: AtomicUsize,
    /// Times to yield to the scheduler before answering
    yields: usize,
}

impl FakeFetcher {
    pub fn replying(reply: serde_json::Value) -> Self {
        Self {
            reply: Mutex::new(Some(reply)),
            calls: AtomicUsize::new(0),
            yields: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Mutex::new(None),
            calls: AtomicUsize::new(0),
            yields: 0,
        }
    }

    /// Answer only after yielding `yields` times, letting other tasks run first
    pub fn yielding(mut self, yields: usize) -> Self {
        self.yields = yields;
        self
    }

    pub fn set_reply(&self, reply: serde_json::Value) {
        *self.reply.lock().unwrap() = Some(reply);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MemberFetcher for FakeFetcher {
    async fn fetch_group_members(&self, _group_id: &GroupId) -> Result<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
        self.reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AutoAtError::Fetch("connection reset".to_string()))
    }
}
