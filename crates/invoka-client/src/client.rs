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

use invoka_cluster::{
    ActiveTrackingEndpoint, ActivityTracker, ClusterConfig, ClusterEndpoint, Directory,
    MockClusterEndpoint, RandomSource, StaticDirectory, ThreadLocalRandom,
};
use invoka_common::protocol::error::Result;
use invoka_common::{CallContext, Endpoint, EndpointUrl, Response, SharedEndpoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Configuration for [`InvokaClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub cluster: ClusterConfig,
    /// Count in-flight calls per endpoint (needed by `leastactive`).
    pub track_activity: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            track_activity: true,
        }
    }
}

/// Invoka client for one service.
///
/// Assembles a [`StaticDirectory`], a [`ClusterEndpoint`] using the
/// configured load balancer, and a [`MockClusterEndpoint`] applying the
/// service URL's mock directive. Every call goes through all three.
#[derive(Debug)]
pub struct InvokaClient {
    config: ClientConfig,
    directory: Arc<StaticDirectory>,
    tracker: Arc<ActivityTracker>,
    endpoint: MockClusterEndpoint,
}

impl InvokaClient {
    /// Create a client for `service_url` over `endpoints` with the default
    /// configuration.
    pub fn new(service_url: EndpointUrl, endpoints: Vec<SharedEndpoint>) -> Self {
        Self::with_config(service_url, endpoints, ClientConfig::default())
    }

    pub fn with_config(
        service_url: EndpointUrl,
        endpoints: Vec<SharedEndpoint>,
        config: ClientConfig,
    ) -> Self {
        Self::build(
            service_url,
            endpoints,
            config,
            Arc::new(ThreadLocalRandom),
            ActivityTracker::global(),
        )
    }

    /// Create a client with an explicit random source and activity tracker.
    ///
    /// Deterministic runs pass a `SeededRandom` and a private tracker.
    pub fn build(
        service_url: EndpointUrl,
        endpoints: Vec<SharedEndpoint>,
        config: ClientConfig,
        random: Arc<dyn RandomSource>,
        tracker: Arc<ActivityTracker>,
    ) -> Self {
        let directory = Arc::new(StaticDirectory::new(service_url, Vec::new()));
        let load_balance = config.cluster.load_balance.build(random, tracker.clone());
        let cluster = ClusterEndpoint::new(directory.clone(), load_balance)
            .with_timeout(config.cluster.timeout_ms);
        let endpoint = MockClusterEndpoint::new(directory.clone(), Arc::new(cluster));

        info!(
            service = %directory.url(),
            load_balance = %config.cluster.load_balance,
            endpoints = endpoints.len(),
            "Invoka client created"
        );

        let client = Self {
            config,
            directory,
            tracker,
            endpoint,
        };
        client.refresh(endpoints);
        client
    }

    /// Replaces the endpoint list.
    pub fn refresh(&self, endpoints: Vec<SharedEndpoint>) {
        let endpoints = if self.config.track_activity {
            endpoints
                .into_iter()
                .map(|e| {
                    Arc::new(ActiveTrackingEndpoint::new(e, self.tracker.clone())) as SharedEndpoint
                })
                .collect()
        } else {
            endpoints
        };
        self.directory.refresh(endpoints);
    }

    /// Replaces the endpoints consulted when a call falls back to its mock.
    pub fn set_mocks(&self, mocks: Vec<SharedEndpoint>) {
        self.directory.set_mocks(mocks);
    }

    /// Call a method and return its result.
    ///
    /// An error response (for example a stubbed `throw` mock) is reported as
    /// `InvokaError::Business`.
    pub async fn call(&self, method: impl Into<String>, args: Value) -> Result<Value> {
        let ctx = CallContext::new(method, args);
        self.invoke(&ctx).await?.into_result()
    }

    /// Dispatch a prepared call and return the raw response.
    pub async fn invoke(&self, ctx: &CallContext) -> Result<Response> {
        self.endpoint.invoke(ctx).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn directory(&self) -> &Arc<StaticDirectory> {
        &self.directory
    }

    pub fn activity(&self) -> &Arc<ActivityTracker> {
        &self.tracker
    }

    pub fn is_available(&self) -> bool {
        self.endpoint.is_available()
    }

    /// Destroys every endpoint; later calls fail.
    pub fn destroy(&self) {
        self.endpoint.destroy();
    }
}
