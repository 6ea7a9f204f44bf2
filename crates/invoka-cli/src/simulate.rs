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

//! Offline selection simulation.
//!
//! Endpoints are described by URLs only; nothing is invoked. The report
//! shows how often each endpoint was picked next to its effective weight.

use anyhow::{bail, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use invoka_cluster::weight::{
    effective_weight, system_clock, DEFAULT_WARMUP_MS, DEFAULT_WEIGHT, TIMESTAMP_KEY, WARMUP_KEY,
    WEIGHT_KEY,
};
use invoka_cluster::{
    ActivityTracker, LoadBalanceKind, RandomSource, SeededRandom, ThreadLocalRandom,
};
use invoka_common::{CallContext, Endpoint, EndpointUrl, InvokaError, Response, SharedEndpoint};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Inputs of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub endpoints: Vec<EndpointUrl>,
    pub strategy: LoadBalanceKind,
    pub method: String,
    pub calls: u64,
    /// Seed for reproducible runs; thread-local randomness when `None`.
    pub seed: Option<u64>,
    /// In-flight calls to pretend per endpoint, by position. Missing
    /// entries count as zero.
    pub active: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EndpointShare {
    pub endpoint: String,
    pub weight: u64,
    pub active: u64,
    pub selected: u64,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimulationReport {
    pub strategy: String,
    pub method: String,
    pub calls: u64,
    pub endpoints: Vec<EndpointShare>,
}

/// Endpoint known only by its URL.
#[derive(Debug)]
struct DescribedEndpoint {
    url: EndpointUrl,
}

impl Endpoint for DescribedEndpoint {
    fn url(&self) -> &EndpointUrl {
        &self.url
    }

    fn invoke<'a>(&'a self, _ctx: &'a CallContext) -> BoxFuture<'a, invoka_common::Result<Response>> {
        futures::future::ready(Err(InvokaError::EndpointUnavailable(format!(
            "{} is a simulated endpoint",
            self.url.identity()
        ))))
        .boxed()
    }
}

pub fn run_simulation(options: &SimulateOptions) -> Result<SimulationReport> {
    if options.endpoints.is_empty() {
        bail!("At least one endpoint is required");
    }

    let pool: Vec<SharedEndpoint> = options
        .endpoints
        .iter()
        .map(|url| Arc::new(DescribedEndpoint { url: url.clone() }) as SharedEndpoint)
        .collect();

    let tracker = Arc::new(ActivityTracker::new());
    let active: Vec<u64> = (0..pool.len())
        .map(|i| options.active.get(i).copied().unwrap_or(0))
        .collect();
    for (endpoint, &count) in pool.iter().zip(&active) {
        for _ in 0..count {
            tracker.begin_call(&endpoint.url().identity(), &options.method);
        }
    }

    let random: Arc<dyn RandomSource> = match options.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadLocalRandom),
    };
    let lb = options.strategy.build(random, tracker);

    let ctx = CallContext::new(options.method.clone(), Value::Null);
    let mut selected = vec![0u64; pool.len()];
    for _ in 0..options.calls {
        if let Some(chosen) = lb.select(&pool, &ctx) {
            if let Some(i) = pool.iter().position(|e| Arc::ptr_eq(e, &chosen)) {
                selected[i] += 1;
            }
        }
    }

    let now = system_clock();
    let endpoints = pool
        .iter()
        .zip(active)
        .zip(selected)
        .map(|((endpoint, active), selected)| EndpointShare {
            endpoint: endpoint.url().identity(),
            weight: effective_weight(endpoint.url(), &ctx, now),
            active,
            selected,
            share: if options.calls == 0 {
                0.0
            } else {
                selected as f64 / options.calls as f64
            },
        })
        .collect();

    Ok(SimulationReport {
        strategy: options.strategy.to_string(),
        method: options.method.clone(),
        calls: options.calls,
        endpoints,
    })
}

/// Effective weight of one endpoint, optionally at a given uptime.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WeightReport {
    pub endpoint: String,
    pub method: String,
    pub configured: i64,
    pub warmup_ms: i64,
    pub uptime_ms: Option<i64>,
    pub effective: u64,
}

/// Computes the weight `url` would get for `method`.
///
/// With `uptime_ms` the endpoint is treated as registered that long ago,
/// overriding any `timestamp` parameter. Without it the URL's own timestamp
/// and the wall clock are used.
pub fn weight_report(url: &EndpointUrl, method: &str, uptime_ms: Option<i64>) -> WeightReport {
    let ctx = CallContext::new(method, Value::Null);
    let effective = match uptime_ms {
        Some(uptime) => {
            // registered at t=1 so the timestamp is always set
            let registered = url.clone().with_parameter(TIMESTAMP_KEY, "1");
            effective_weight(&registered, &ctx, uptime.saturating_add(1))
        }
        None => effective_weight(url, &ctx, system_clock()),
    };

    WeightReport {
        endpoint: url.identity(),
        method: method.to_string(),
        configured: url.method_parameter_i64(method, WEIGHT_KEY, DEFAULT_WEIGHT),
        warmup_ms: url.parameter_i64(WARMUP_KEY, DEFAULT_WARMUP_MS),
        uptime_ms,
        effective,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(specs: &[&str]) -> Vec<EndpointUrl> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_simulation_is_reproducible_with_seed() {
        let options = SimulateOptions {
            endpoints: urls(&[
                "tri://10.0.0.1:20880/UserService?weight=5",
                "tri://10.0.0.2:20880/UserService?weight=2",
                "tri://10.0.0.3:20880/UserService?weight=1",
            ]),
            strategy: LoadBalanceKind::Random,
            method: "getUser".to_string(),
            calls: 8_000,
            seed: Some(7),
            active: Vec::new(),
        };
        let first = run_simulation(&options).unwrap();
        let second = run_simulation(&options).unwrap();
        assert_eq!(first, second);

        let total: u64 = first.endpoints.iter().map(|e| e.selected).sum();
        assert_eq!(total, 8_000);
        assert_eq!(first.endpoints[0].weight, 5);
        assert!((first.endpoints[0].share - 0.625).abs() < 0.03);
    }

    #[test]
    fn test_least_active_simulation_skips_busy() {
        let options = SimulateOptions {
            endpoints: urls(&[
                "tri://a:1/S",
                "tri://b:1/S",
                "tri://c:1/S",
                "tri://d:1/S",
            ]),
            strategy: LoadBalanceKind::LeastActive,
            method: "getUser".to_string(),
            calls: 1_000,
            seed: Some(1),
            active: vec![3, 1, 1, 5],
        };
        let report = run_simulation(&options).unwrap();
        assert_eq!(report.strategy, "leastactive");
        assert_eq!(report.endpoints[0].selected, 0);
        assert_eq!(report.endpoints[3].selected, 0);
        assert_eq!(report.endpoints[3].active, 5);
    }

    #[test]
    fn test_simulation_requires_endpoints() {
        let options = SimulateOptions {
            endpoints: Vec::new(),
            strategy: LoadBalanceKind::Random,
            method: "getUser".to_string(),
            calls: 10,
            seed: None,
            active: Vec::new(),
        };
        assert!(run_simulation(&options).is_err());
    }

    #[test]
    fn test_weight_report_during_warmup() {
        let url: EndpointUrl = "tri://10.0.0.1:20880/UserService?weight=100&warmup=10000"
            .parse()
            .unwrap();
        assert_eq!(weight_report(&url, "getUser", Some(1)).effective, 1);
        assert_eq!(weight_report(&url, "getUser", Some(5_000)).effective, 50);
        assert_eq!(weight_report(&url, "getUser", Some(10_000)).effective, 100);

        let report = weight_report(&url, "getUser", None);
        assert_eq!(report.effective, 100);
        assert_eq!(report.configured, 100);
        assert_eq!(report.warmup_ms, 10_000);
    }

    #[test]
    fn test_weight_report_with_maximal_uptime() {
        let url: EndpointUrl = "tri://10.0.0.1:20880/UserService?weight=100&warmup=10000"
            .parse()
            .unwrap();
        let report = weight_report(&url, "getUser", Some(i64::MAX));
        assert_eq!(report.effective, 100);
        assert_eq!(report.uptime_ms, Some(i64::MAX));
    }

    #[test]
    fn test_weight_report_method_scope() {
        let url: EndpointUrl = "tri://10.0.0.1:20880/UserService?weight=10&getUser.weight=40"
            .parse()
            .unwrap();
        assert_eq!(weight_report(&url, "getUser", None).configured, 40);
        assert_eq!(weight_report(&url, "listUsers", None).configured, 10);
    }
}
