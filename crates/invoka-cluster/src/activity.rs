// Copyright 2025 Invoka Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-flight call accounting.
//!
//! [`ActivityTracker`] keeps one set of counters per (endpoint identity,
//! method). The counters are only mutated by [`ActiveTrackingEndpoint`]
//! around a real invocation; load balancers read them through
//! [`ActivitySource`].
//!
//! # Thread Safety
//!
//! The registry follows a hybrid model:
//! - Lock-free atomics for the counters themselves (hot path)
//! - `RwLock` around the key → counters map, write-locked only on first use

use futures::future::BoxFuture;
use invoka_common::{CallContext, Endpoint, EndpointUrl, Response, Result, SharedEndpoint};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, RwLock as StdRwLock};
use std::time::Instant;

/// Read-only view of the number of in-flight calls.
pub trait ActivitySource: Send + Sync + Debug {
    fn active_count(&self, identity: &str, method: &str) -> u64;
}

#[derive(Debug, Default)]
struct ActivityStats {
    active: AtomicU64,
    total: AtomicU64,
    failed: AtomicU64,
    total_elapsed_ms: AtomicU64,
    max_elapsed_ms: AtomicU64,
}

/// Point-in-time copy of one key's counters.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ActivitySnapshot {
    pub active: u64,
    pub total: u64,
    pub failed: u64,
    pub total_elapsed_ms: u64,
    pub max_elapsed_ms: u64,
}

type ActivityKey = (String, String);

#[derive(Debug, Default)]
pub struct ActivityTracker {
    stats: StdRwLock<HashMap<ActivityKey, Arc<ActivityStats>>>,
}

static GLOBAL_TRACKER: OnceLock<Arc<ActivityTracker>> = OnceLock::new();

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide tracker.
    pub fn global() -> Arc<ActivityTracker> {
        GLOBAL_TRACKER
            .get_or_init(|| Arc::new(ActivityTracker::new()))
            .clone()
    }

    fn existing(&self, identity: &str, method: &str) -> Option<Arc<ActivityStats>> {
        let stats = self.stats.read().unwrap_or_else(|e| e.into_inner());
        stats
            .get(&(identity.to_string(), method.to_string()))
            .cloned()
    }

    fn stats_for(&self, identity: &str, method: &str) -> Arc<ActivityStats> {
        if let Some(stats) = self.existing(identity, method) {
            return stats;
        }
        let mut stats = self.stats.write().unwrap_or_else(|e| e.into_inner());
        stats
            .entry((identity.to_string(), method.to_string()))
            .or_default()
            .clone()
    }

    /// Marks one call as started.
    pub fn begin_call(&self, identity: &str, method: &str) {
        self.stats_for(identity, method)
            .active
            .fetch_add(1, Ordering::SeqCst);
    }

    /// Marks one call as finished.
    pub fn end_call(&self, identity: &str, method: &str, elapsed_ms: u64, succeeded: bool) {
        let stats = self.stats_for(identity, method);
        // saturating: never wrap below zero on an unmatched end
        let _ = stats
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)));
        stats.total.fetch_add(1, Ordering::Relaxed);
        stats.total_elapsed_ms.fetch_add(elapsed_ms, Ordering::Relaxed);
        stats.max_elapsed_ms.fetch_max(elapsed_ms, Ordering::Relaxed);
        if !succeeded {
            stats.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self, identity: &str, method: &str) -> ActivitySnapshot {
        match self.existing(identity, method) {
            Some(stats) => ActivitySnapshot {
                active: stats.active.load(Ordering::SeqCst),
                total: stats.total.load(Ordering::Relaxed),
                failed: stats.failed.load(Ordering::Relaxed),
                total_elapsed_ms: stats.total_elapsed_ms.load(Ordering::Relaxed),
                max_elapsed_ms: stats.max_elapsed_ms.load(Ordering::Relaxed),
            },
            None => ActivitySnapshot::default(),
        }
    }

    /// Drops every counter belonging to `identity`.
    pub fn remove(&self, identity: &str) {
        let mut stats = self.stats.write().unwrap_or_else(|e| e.into_inner());
        stats.retain(|(id, _), _| id != identity);
    }
}

impl ActivitySource for ActivityTracker {
    fn active_count(&self, identity: &str, method: &str) -> u64 {
        self.existing(identity, method)
            .map(|stats| stats.active.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

/// Ends the tracked call when dropped, including on cancellation.
struct ActiveCall<'a> {
    tracker: &'a ActivityTracker,
    identity: String,
    method: &'a str,
    started: Instant,
    succeeded: bool,
}

impl Drop for ActiveCall<'_> {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        self.tracker
            .end_call(&self.identity, self.method, elapsed_ms, self.succeeded);
    }
}

/// Wraps an endpoint so every invocation is counted in a tracker.
#[derive(Debug)]
pub struct ActiveTrackingEndpoint {
    inner: SharedEndpoint,
    tracker: Arc<ActivityTracker>,
}

impl ActiveTrackingEndpoint {
    pub fn new(inner: SharedEndpoint, tracker: Arc<ActivityTracker>) -> Self {
        Self { inner, tracker }
    }

    pub fn inner(&self) -> &SharedEndpoint {
        &self.inner
    }
}

impl Endpoint for ActiveTrackingEndpoint {
    fn url(&self) -> &EndpointUrl {
        self.inner.url()
    }

    fn interface(&self) -> &str {
        self.inner.interface()
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    fn destroy(&self) {
        self.tracker.remove(&self.inner.url().identity());
        self.inner.destroy();
    }

    fn invoke<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            let identity = self.inner.url().identity();
            self.tracker.begin_call(&identity, &ctx.method);
            let mut call = ActiveCall {
                tracker: &self.tracker,
                identity,
                method: &ctx.method,
                started: Instant::now(),
                succeeded: false,
            };
            let result = self.inner.invoke(ctx).await;
            call.succeeded = result.is_ok();
            result
        })
    }
}
