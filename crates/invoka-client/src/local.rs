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

use futures::future::BoxFuture;
use futures::FutureExt;
use invoka_common::{CallContext, Endpoint, EndpointUrl, InvokaError, Response, Result};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handler run by a [`LocalEndpoint`] for every call.
pub type LocalHandler = Arc<dyn Fn(&CallContext) -> Result<Value> + Send + Sync>;

/// Endpoint served by an in-process handler.
///
/// Useful for embedding a service in the same process and for exercising
/// selection and mock fallback without a network. Marking the endpoint
/// unavailable makes every call fail with
/// [`InvokaError::EndpointUnavailable`].
pub struct LocalEndpoint {
    url: EndpointUrl,
    handler: LocalHandler,
    available: AtomicBool,
}

impl LocalEndpoint {
    pub fn new<F>(url: EndpointUrl, handler: F) -> Self
    where
        F: Fn(&CallContext) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            url,
            handler: Arc::new(handler),
            available: AtomicBool::new(true),
        }
    }

    /// Endpoint that answers every call with its own address.
    pub fn echo(url: EndpointUrl) -> Self {
        let address = url.address();
        Self::new(url, move |_| Ok(Value::String(address.clone())))
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl fmt::Debug for LocalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalEndpoint")
            .field("url", &self.url)
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}

impl Endpoint for LocalEndpoint {
    fn url(&self) -> &EndpointUrl {
        &self.url
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn destroy(&self) {
        self.set_available(false);
    }

    fn invoke<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Response>> {
        let outcome = if self.is_available() {
            (self.handler)(ctx).map(|value| Response::success(ctx.id, value))
        } else {
            Err(InvokaError::EndpointUnavailable(self.url.identity()))
        };
        futures::future::ready(outcome).boxed()
    }
}
