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

//! Directory-backed endpoint that selects one member per call.

use crate::directory::Directory;
use crate::load_balance::{LoadBalance, LoadBalanceKind};
use futures::future::BoxFuture;
use futures::FutureExt;
use invoka_common::{CallContext, Endpoint, EndpointUrl, InvokaError, Response, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for cluster dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Selection strategy.
    pub load_balance: LoadBalanceKind,
    /// Per-call deadline for the selected endpoint, if any.
    pub timeout_ms: Option<u64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            load_balance: LoadBalanceKind::Random,
            timeout_ms: None,
        }
    }
}

/// Lists the directory, picks one endpoint with the load balancer and
/// invokes it.
///
/// An empty selection is reported as [`InvokaError::NoAvailableEndpoint`].
#[derive(Debug)]
pub struct ClusterEndpoint {
    directory: Arc<dyn Directory>,
    load_balance: Arc<dyn LoadBalance>,
    timeout: Option<Duration>,
}

impl ClusterEndpoint {
    pub fn new(directory: Arc<dyn Directory>, load_balance: Arc<dyn LoadBalance>) -> Self {
        Self {
            directory,
            load_balance,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout = timeout_ms.map(Duration::from_millis);
        self
    }

    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.directory
    }

    pub fn load_balance(&self) -> &Arc<dyn LoadBalance> {
        &self.load_balance
    }

    async fn dispatch(&self, ctx: &CallContext) -> Result<Response> {
        let pool = self.directory.list(ctx)?;
        let endpoint = self.load_balance.select(&pool, ctx).ok_or_else(|| {
            InvokaError::NoAvailableEndpoint {
                service: self.directory.interface().to_string(),
                method: ctx.method.clone(),
            }
        })?;

        debug!(
            method = %ctx.method,
            endpoint = %endpoint.url().identity(),
            strategy = self.load_balance.name(),
            pool = pool.len(),
            "Selected endpoint"
        );

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, endpoint.invoke(ctx))
                .await
                .map_err(|_| InvokaError::Timeout(timeout.as_millis() as u64))?,
            None => endpoint.invoke(ctx).await,
        }
    }
}

impl Endpoint for ClusterEndpoint {
    fn url(&self) -> &EndpointUrl {
        self.directory.url()
    }

    fn interface(&self) -> &str {
        self.directory.interface()
    }

    fn is_available(&self) -> bool {
        self.directory.is_available()
    }

    fn destroy(&self) {
        self.directory.destroy();
    }

    fn invoke<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Response>> {
        self.dispatch(ctx).boxed()
    }
}
