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

//! Endpoint selection strategies.
//!
//! Every strategy shares the entry contract of [`LoadBalance::select`]:
//!
//! - an empty pool yields `None`; the caller decides whether that is fatal
//! - a single-endpoint pool yields that endpoint without touching the random
//!   source
//! - larger pools are handed to the strategy's own [`LoadBalance::do_select`]
//!
//! Weighted draws map each endpoint's weight to a contiguous half-open
//! interval of `[0, total)`; see [`pick_weighted`].

mod least_active;
mod random;

pub use least_active::LeastActiveLoadBalance;
pub use random::RandomLoadBalance;

use crate::activity::ActivitySource;
use crate::random::RandomSource;
use invoka_common::{CallContext, InvokaError, SharedEndpoint};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;
use std::sync::Arc;

pub trait LoadBalance: Send + Sync + Debug {
    /// Short name of the strategy, as accepted by [`LoadBalanceKind::from_str`].
    fn name(&self) -> &'static str;

    /// Picks one endpoint out of `pool` for the call.
    fn select(&self, pool: &[SharedEndpoint], ctx: &CallContext) -> Option<SharedEndpoint> {
        match pool {
            [] => None,
            [only] => Some(only.clone()),
            _ => Some(self.do_select(pool, ctx)),
        }
    }

    /// Strategy-specific selection. `pool` holds at least two endpoints.
    fn do_select(&self, pool: &[SharedEndpoint], ctx: &CallContext) -> SharedEndpoint;
}

/// Locates the interval `offset` falls into.
///
/// Walks `weights` in order subtracting each weight from `offset` and returns
/// the first position where the remainder turns negative. `offset` must lie in
/// `[0, sum(weights))`; zero-weight entries are never picked.
///
/// # Example
///
/// ```
/// use invoka_cluster::load_balance::pick_weighted;
///
/// // intervals: [0,5) -> 0, [5,7) -> 1, [7,8) -> 2
/// assert_eq!(pick_weighted(&[5, 2, 1], 4), Some(0));
/// assert_eq!(pick_weighted(&[5, 2, 1], 5), Some(1));
/// assert_eq!(pick_weighted(&[5, 2, 1], 7), Some(2));
/// assert_eq!(pick_weighted(&[5, 2, 1], 8), None);
/// ```
pub fn pick_weighted(weights: &[u64], offset: u64) -> Option<usize> {
    let mut offset = offset;
    for (i, &weight) in weights.iter().enumerate() {
        // offset - weight < 0
        if offset < weight {
            return Some(i);
        }
        offset -= weight;
    }
    None
}

/// Name of a selection strategy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoadBalanceKind {
    #[default]
    Random,
    LeastActive,
}

impl LoadBalanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadBalanceKind::Random => RandomLoadBalance::NAME,
            LoadBalanceKind::LeastActive => LeastActiveLoadBalance::NAME,
        }
    }

    /// Builds the strategy.
    ///
    /// `activity` is only consulted by the least-active strategy.
    pub fn build(
        self,
        random: Arc<dyn RandomSource>,
        activity: Arc<dyn ActivitySource>,
    ) -> Arc<dyn LoadBalance> {
        match self {
            LoadBalanceKind::Random => Arc::new(RandomLoadBalance::with_random(random)),
            LoadBalanceKind::LeastActive => {
                Arc::new(LeastActiveLoadBalance::with_random(activity, random))
            }
        }
    }
}

impl fmt::Display for LoadBalanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadBalanceKind {
    type Err = InvokaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            RandomLoadBalance::NAME => Ok(LoadBalanceKind::Random),
            LeastActiveLoadBalance::NAME | "least-active" | "least_active" => {
                Ok(LoadBalanceKind::LeastActive)
            }
            other => Err(InvokaError::InvalidConfig(format!(
                "Unknown load balance strategy '{}'",
                other
            ))),
        }
    }
}
