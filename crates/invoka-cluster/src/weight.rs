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

//! Effective weight with cold-start smoothing.
//!
//! A freshly registered endpoint does not get its full configured weight at
//! once. During its warmup window the weight ramps linearly from 1 up to the
//! configured value, so a new instance is not flooded the moment it joins.

use invoka_common::{CallContext, EndpointUrl};
use std::time::SystemTime;

/// Per-method configured weight.
pub const WEIGHT_KEY: &str = "weight";
/// Warmup window length in milliseconds.
pub const WARMUP_KEY: &str = "warmup";
/// Registration time of the endpoint, in milliseconds since the Unix epoch.
pub const TIMESTAMP_KEY: &str = "timestamp";

pub const DEFAULT_WEIGHT: i64 = 100;
/// Ceiling for a configured weight. Keeps the sum over any realistic pool
/// inside `u64`.
pub const MAX_WEIGHT: i64 = i32::MAX as i64;
/// Ten minutes.
pub const DEFAULT_WARMUP_MS: i64 = 10 * 60 * 1000;

/// Wall-clock source in milliseconds since the Unix epoch.
pub type Clock = fn() -> i64;

/// The system clock.
pub fn system_clock() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Weight during warmup: `uptime / (warmup / weight)`, clamped to `[1, weight]`.
///
/// `weight` must be at least 1.
///
/// # Example
///
/// ```
/// use invoka_cluster::weight::warmup_weight;
///
/// assert_eq!(warmup_weight(1, 10_000, 100), 1);
/// assert_eq!(warmup_weight(5_000, 10_000, 100), 50);
/// assert_eq!(warmup_weight(9_999, 10_000, 100), 99);
/// ```
pub fn warmup_weight(uptime: i64, warmup: i64, weight: i64) -> i64 {
    let ww = (uptime as f64 / (warmup as f64 / weight as f64)) as i64;
    ww.clamp(1, weight)
}

/// Effective weight of an endpoint for one call at time `now_ms`.
///
/// - configured weight `<= 0` gives `0`; larger than [`MAX_WEIGHT`] is capped
/// - no registration timestamp gives the configured weight
/// - clock skew (`uptime <= 0`) or a finished warmup gives the configured weight
/// - otherwise the warmup ramp applies
pub fn effective_weight(url: &EndpointUrl, ctx: &CallContext, now_ms: i64) -> u64 {
    let weight = url.method_parameter_i64(&ctx.method, WEIGHT_KEY, DEFAULT_WEIGHT);
    if weight <= 0 {
        return 0;
    }
    let weight = weight.min(MAX_WEIGHT);

    let timestamp = url.parameter_i64(TIMESTAMP_KEY, 0);
    if timestamp == 0 {
        return weight as u64;
    }

    let uptime = now_ms.saturating_sub(timestamp);
    let warmup = url.parameter_i64(WARMUP_KEY, DEFAULT_WARMUP_MS);
    if uptime <= 0 || uptime >= warmup {
        return weight as u64;
    }

    warmup_weight(uptime, warmup, weight) as u64
}
