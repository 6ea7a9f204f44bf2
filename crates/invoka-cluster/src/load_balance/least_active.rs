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

use super::{pick_weighted, LoadBalance};
use crate::activity::ActivitySource;
use crate::random::{RandomSource, ThreadLocalRandom};
use crate::weight::{effective_weight, system_clock, Clock};
use invoka_common::{CallContext, SharedEndpoint};
use std::sync::Arc;

/// Least-active selection with weighted random tie-breaking.
///
/// Endpoints with the fewest in-flight calls for the method form the
/// candidate group. A group of one is returned directly. Larger groups are
/// resolved like [`RandomLoadBalance`](super::RandomLoadBalance), restricted
/// to the group.
///
/// Each endpoint's effective weight is computed once per selection and that
/// same value is used for the group total and for the interval walk.
#[derive(Debug)]
pub struct LeastActiveLoadBalance {
    activity: Arc<dyn ActivitySource>,
    random: Arc<dyn RandomSource>,
    clock: Clock,
}

/// Running state of the single pass over the pool.
struct LeastGroup {
    least_active: Option<u64>,
    positions: Vec<usize>,
    weights: Vec<u64>,
    total_weight: u64,
    first_weight: u64,
    same_weight: bool,
}

impl LeastGroup {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            least_active: None,
            positions: Vec::with_capacity(capacity),
            weights: Vec::with_capacity(capacity),
            total_weight: 0,
            first_weight: 0,
            same_weight: true,
        }
    }

    fn observe(&mut self, position: usize, active: u64, weight: u64) {
        match self.least_active {
            Some(least) if active > least => {}
            Some(least) if active == least => {
                self.positions.push(position);
                self.weights.push(weight);
                self.total_weight += weight;
                if self.same_weight && weight != self.first_weight {
                    self.same_weight = false;
                }
            }
            _ => {
                self.least_active = Some(active);
                self.positions.clear();
                self.weights.clear();
                self.positions.push(position);
                self.weights.push(weight);
                self.total_weight = weight;
                self.first_weight = weight;
                self.same_weight = true;
            }
        }
    }
}

impl LeastActiveLoadBalance {
    pub const NAME: &'static str = "leastactive";

    pub fn new(activity: Arc<dyn ActivitySource>) -> Self {
        Self::with_random(activity, Arc::new(ThreadLocalRandom))
    }

    pub fn with_random(activity: Arc<dyn ActivitySource>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            activity,
            random,
            clock: system_clock,
        }
    }

    /// Replaces the wall clock used for warmup calculations.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl LoadBalance for LeastActiveLoadBalance {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn do_select(&self, pool: &[SharedEndpoint], ctx: &CallContext) -> SharedEndpoint {
        let now = (self.clock)();
        let mut group = LeastGroup::with_capacity(pool.len());

        for (position, endpoint) in pool.iter().enumerate() {
            let url = endpoint.url();
            let active = self.activity.active_count(&url.identity(), &ctx.method);
            let weight = effective_weight(url, ctx, now);
            group.observe(position, active, weight);
        }

        if let [only] = group.positions[..] {
            return pool[only].clone();
        }

        if group.total_weight > 0 && !group.same_weight {
            let offset = self.random.next_below(group.total_weight);
            if let Some(i) = pick_weighted(&group.weights, offset) {
                return pool[group.positions[i]].clone();
            }
        }

        let i = self.random.next_below(group.positions.len() as u64) as usize;
        pool[group.positions[i]].clone()
    }
}
