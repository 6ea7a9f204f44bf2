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

//! Sources of endpoints for one service.

use invoka_common::{CallContext, EndpointUrl, InvokaError, Result, SharedEndpoint};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock as StdRwLock};
use tracing::debug;

/// The set of endpoints currently serving a service.
///
/// `list` must honour [`CallContext::mock_lookup`]: a `NeedsMock` context asks
/// for stand-in endpoints instead of real ones. Returning an empty list in
/// that mode is fine.
pub trait Directory: Send + Sync + Debug {
    /// URL of the consumer side of the service; carries `mock` and other
    /// consumer parameters.
    fn url(&self) -> &EndpointUrl;

    fn interface(&self) -> &str {
        self.url().service_interface()
    }

    fn is_available(&self) -> bool;

    fn destroy(&self);

    fn list(&self, ctx: &CallContext) -> Result<Vec<SharedEndpoint>>;
}

/// In-process directory over fixed lists of endpoints.
///
/// Both lists are replaced wholesale; readers always see either the old or
/// the new list, never a mix.
#[derive(Debug)]
pub struct StaticDirectory {
    url: EndpointUrl,
    endpoints: StdRwLock<Arc<Vec<SharedEndpoint>>>,
    mocks: StdRwLock<Arc<Vec<SharedEndpoint>>>,
    destroyed: AtomicBool,
}

impl StaticDirectory {
    pub fn new(url: EndpointUrl, endpoints: Vec<SharedEndpoint>) -> Self {
        Self {
            url,
            endpoints: StdRwLock::new(Arc::new(endpoints)),
            mocks: StdRwLock::new(Arc::new(Vec::new())),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn with_mocks(self, mocks: Vec<SharedEndpoint>) -> Self {
        self.set_mocks(mocks);
        self
    }

    /// Publishes a new endpoint list.
    pub fn refresh(&self, endpoints: Vec<SharedEndpoint>) {
        debug!(
            service = %self.url.service_interface(),
            count = endpoints.len(),
            "Refreshing endpoint list"
        );
        let mut current = self.endpoints.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::new(endpoints);
    }

    pub fn set_mocks(&self, mocks: Vec<SharedEndpoint>) {
        let mut current = self.mocks.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::new(mocks);
    }

    /// Every published endpoint, available or not.
    pub fn endpoints(&self) -> Arc<Vec<SharedEndpoint>> {
        self.endpoints
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn mocks(&self) -> Arc<Vec<SharedEndpoint>> {
        self.mocks.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Directory for StaticDirectory {
    fn url(&self) -> &EndpointUrl {
        &self.url
    }

    fn is_available(&self) -> bool {
        !self.destroyed.load(Ordering::SeqCst)
            && self.endpoints().iter().any(|e| e.is_available())
    }

    fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        for endpoint in self.endpoints().iter() {
            endpoint.destroy();
        }
        self.refresh(Vec::new());
    }

    fn list(&self, ctx: &CallContext) -> Result<Vec<SharedEndpoint>> {
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(InvokaError::EndpointUnavailable(format!(
                "directory for {} is destroyed",
                self.url.service_interface()
            )));
        }

        if ctx.needs_mock() {
            return Ok(self.mocks().iter().cloned().collect());
        }

        Ok(self
            .endpoints()
            .iter()
            .filter(|e| e.is_available())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balance::testing::{ctx, endpoint, pool};
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use invoka_common::{Endpoint, Response};
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug)]
    struct Flaky {
        url: EndpointUrl,
        available: bool,
        destroyed: Arc<AtomicUsize>,
    }

    impl Endpoint for Flaky {
        fn url(&self) -> &EndpointUrl {
            &self.url
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn destroy(&self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }

        fn invoke<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Response>> {
            async move { Ok(Response::success(ctx.id, serde_json::Value::Null)) }.boxed()
        }
    }

    fn service_url() -> EndpointUrl {
        EndpointUrl::new("consumer", "10.0.0.1", None, "UserService")
    }

    #[test]
    fn test_list_returns_available_endpoints_in_order() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let down: SharedEndpoint = Arc::new(Flaky {
            url: EndpointUrl::new("tri", "down", Some(1), "UserService"),
            available: false,
            destroyed,
        });
        let mut endpoints = pool(&[1, 2]);
        endpoints.insert(1, down);

        let dir = StaticDirectory::new(service_url(), endpoints.clone());
        let listed = dir.list(&ctx()).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(Arc::ptr_eq(&listed[0], &endpoints[0]));
        assert!(Arc::ptr_eq(&listed[1], &endpoints[2]));
        assert_eq!(dir.endpoints().len(), 3);
    }

    #[test]
    fn test_mock_lookup_returns_mock_list() {
        let mock = endpoint("mock", 1);
        let dir = StaticDirectory::new(service_url(), pool(&[1, 1])).with_mocks(vec![mock.clone()]);

        let listed = dir.list(&ctx().for_mock_lookup()).unwrap();
        assert_eq!(listed.len(), 1);
        assert!(Arc::ptr_eq(&listed[0], &mock));

        let empty = StaticDirectory::new(service_url(), pool(&[1]));
        assert!(empty.list(&ctx().for_mock_lookup()).unwrap().is_empty());
    }

    #[test]
    fn test_refresh_replaces_list() {
        let dir = StaticDirectory::new(service_url(), pool(&[1, 1, 1]));
        assert_eq!(dir.list(&ctx()).unwrap().len(), 3);
        dir.refresh(pool(&[5]));
        assert_eq!(dir.list(&ctx()).unwrap().len(), 1);
        assert_eq!(dir.interface(), "UserService");
    }

    #[test]
    fn test_destroy_releases_endpoints_and_fails_listing() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let endpoints: Vec<SharedEndpoint> = (0..2)
            .map(|i| {
                Arc::new(Flaky {
                    url: EndpointUrl::new("tri", format!("n{i}"), Some(1), "UserService"),
                    available: true,
                    destroyed: destroyed.clone(),
                }) as SharedEndpoint
            })
            .collect();
        let dir = StaticDirectory::new(service_url(), endpoints);
        assert!(dir.is_available());

        dir.destroy();
        dir.destroy();
        assert_eq!(destroyed.load(Ordering::SeqCst), 2);
        assert!(!dir.is_available());
        assert!(matches!(
            dir.list(&ctx()),
            Err(InvokaError::EndpointUnavailable(_))
        ));
    }
}
