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
use crate::random::{RandomSource, ThreadLocalRandom};
use crate::weight::{effective_weight, system_clock, Clock};
use invoka_common::{CallContext, SharedEndpoint};
use std::sync::Arc;

/// Weighted random selection.
///
/// When every endpoint carries the same effective weight (or all weights are
/// zero) the pick is uniform over the pool. Otherwise each endpoint is chosen
/// with probability `weight / total`.
#[derive(Debug)]
pub struct RandomLoadBalance {
    random: Arc<dyn RandomSource>,
    clock: Clock,
}

impl RandomLoadBalance {
    pub const NAME: &'static str = "random";

    pub fn new() -> Self {
        Self::with_random(Arc::new(ThreadLocalRandom))
    }

    pub fn with_random(random: Arc<dyn RandomSource>) -> Self {
        Self {
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

impl Default for RandomLoadBalance {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalance for RandomLoadBalance {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn do_select(&self, pool: &[SharedEndpoint], ctx: &CallContext) -> SharedEndpoint {
        let now = (self.clock)();
        let weights: Vec<u64> = pool
            .iter()
            .map(|endpoint| effective_weight(endpoint.url(), ctx, now))
            .collect();

        let total: u64 = weights.iter().sum();
        let same_weight = weights.iter().all(|&w| w == weights[0]);

        if total > 0 && !same_weight {
            let offset = self.random.next_below(total);
            if let Some(index) = pick_weighted(&weights, offset) {
                return pool[index].clone();
            }
        }

        let index = self.random.next_below(pool.len() as u64) as usize;
        pool[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    fn scripted(script: impl IntoIterator<Item = u64>) -> (Arc<ScriptedRandom>, RandomLoadBalance) {
        let random = Arc::new(ScriptedRandom::new(script));
        let lb = RandomLoadBalance::with_random(random.clone());
        (random, lb)
    }

    #[test]
    fn test_every_boundary_draw_maps_to_one_endpoint() {
        let pool = pool(&[5, 2, 1]);
        let expected = [0, 0, 0, 0, 0, 1, 1, 2];
        for (draw, &want) in expected.iter().enumerate() {
            let (random, lb) = scripted([draw as u64]);
            let chosen = lb.select(&pool, &ctx()).unwrap();
            assert_eq!(position(&pool, &chosen), want, "draw {draw}");
            assert_eq!(random.draws(), 1);
        }
    }

    #[test]
    fn test_top_draw_reaches_last_endpoint() {
        let pool = pool(&[5, 2, 1]);
        let (_, lb) = scripted([7]);
        let chosen = lb.select(&pool, &ctx()).unwrap();
        assert_eq!(position(&pool, &chosen), 2);
    }

    #[test]
    fn test_same_weight_uses_index_draw() {
        let pool = pool(&[10, 10, 10]);
        let (random, lb) = scripted([2]);
        let chosen = lb.select(&pool, &ctx()).unwrap();
        assert_eq!(position(&pool, &chosen), 2);
        assert_eq!(random.draws(), 1);
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_uniform() {
        let pool = pool(&[0, 0, 0, 0]);
        for draw in 0..4 {
            let (_, lb) = scripted([draw]);
            let chosen = lb.select(&pool, &ctx()).unwrap();
            assert_eq!(position(&pool, &chosen), draw as usize);
        }
    }

    #[test]
    fn test_zero_weight_endpoint_never_chosen_when_others_weighted() {
        let pool = pool(&[0, 3, 1]);
        let lb = RandomLoadBalance::with_random(Arc::new(SeededRandom::new(11)));
        for _ in 0..2_000 {
            let chosen = lb.select(&pool, &ctx()).unwrap();
            assert_ne!(position(&pool, &chosen), 0);
        }
    }

    #[test]
    fn test_warmup_weights_drive_selection() {
        fn fixed_now() -> i64 {
            1_000_000
        }
        // node0 just registered (weight 1), node1 fully warm (weight 100)
        let cold: SharedEndpoint = Arc::new(NamedEndpoint {
            url: invoka_common::EndpointUrl::new("tri", "cold", Some(1), "S")
                .with_parameter("weight", "100")
                .with_parameter("warmup", "10000")
                .with_parameter("timestamp", "999999"),
        });
        let warm = endpoint("warm", 100);
        let pool = vec![cold, warm];

        let random = Arc::new(ScriptedRandom::new([0, 1, 100]));
        let lb = RandomLoadBalance::with_random(random.clone()).with_clock(fixed_now);
        // total = 101: draw 0 -> cold, draw 1 -> warm, draw 100 -> warm
        assert_eq!(position(&pool, &lb.select(&pool, &ctx()).unwrap()), 0);
        assert_eq!(position(&pool, &lb.select(&pool, &ctx()).unwrap()), 1);
        assert_eq!(position(&pool, &lb.select(&pool, &ctx()).unwrap()), 1);
    }

    #[test]
    fn test_huge_configured_weights_are_capped() {
        use crate::weight::MAX_WEIGHT;
        let max = MAX_WEIGHT as u64;
        let pool = pool(&[i64::MAX as u64, i64::MAX as u64, 1]);
        // capped weights [max, max, 1]: total 2 * max + 1
        let (_, lb) = scripted([max - 1, max, 2 * max]);
        assert_eq!(position(&pool, &lb.select(&pool, &ctx()).unwrap()), 0);
        assert_eq!(position(&pool, &lb.select(&pool, &ctx()).unwrap()), 1);
        assert_eq!(position(&pool, &lb.select(&pool, &ctx()).unwrap()), 2);

        let same = super::super::testing::pool(&[i64::MAX as u64; 3]);
        let (random, lb) = scripted([2]);
        assert_eq!(position(&same, &lb.select(&same, &ctx()).unwrap()), 2);
        assert_eq!(random.draws(), 1);
    }

    #[test]
    fn test_weighted_frequencies_converge() {
        let weights = [5u64, 2, 1];
        let pool = pool(&weights);
        let lb = RandomLoadBalance::with_random(Arc::new(SeededRandom::new(42)));
        let trials = 80_000;
        let mut counts = [0u64; 3];
        for _ in 0..trials {
            counts[position(&pool, &lb.select(&pool, &ctx()).unwrap())] += 1;
        }
        for (i, &w) in weights.iter().enumerate() {
            let expected = w as f64 / 8.0;
            let observed = counts[i] as f64 / trials as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "endpoint {i}: expected {expected:.3}, observed {observed:.3}"
            );
        }
    }
}
