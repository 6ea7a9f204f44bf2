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

use super::directive::MockDirective;
use super::endpoint::MockEndpoint;
use crate::directory::Directory;
use futures::future::BoxFuture;
use futures::FutureExt;
use invoka_common::{
    CallContext, Endpoint, EndpointUrl, InvokaError, Response, Result, SharedEndpoint,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Wraps an endpoint with the consumer's mock directive.
///
/// Per call the directive (`<method>.mock`, then `mock`, on the directory
/// URL) decides between:
///
/// - **disabled**: the real endpoint's result or error is returned as is
/// - **force**: the real endpoint is never invoked, the mock answers
/// - **fail-over**: the real endpoint is invoked; an infrastructure failure
///   is replaced by the mock's answer, a business failure is returned as is
///
/// Selection failures (no endpoint available) are never replaced.
#[derive(Debug)]
pub struct MockClusterEndpoint {
    directory: Arc<dyn Directory>,
    inner: SharedEndpoint,
}

impl MockClusterEndpoint {
    pub fn new(directory: Arc<dyn Directory>, inner: SharedEndpoint) -> Self {
        Self { directory, inner }
    }

    pub fn inner(&self) -> &SharedEndpoint {
        &self.inner
    }

    async fn dispatch(&self, ctx: &CallContext) -> Result<Response> {
        let directive = MockDirective::for_call(self.directory.url(), &ctx.method);

        match &directive {
            MockDirective::Disabled => self.inner.invoke(ctx).await,
            MockDirective::Force(body) => {
                warn!(
                    method = %ctx.method,
                    service = %self.directory.url(),
                    mock = %body,
                    "Force-mock enabled"
                );
                self.invoke_mock(ctx, &directive, None).await
            }
            MockDirective::Fail(body) => match self.inner.invoke(ctx).await {
                Err(e) if e.is_infrastructure() => {
                    warn!(
                        method = %ctx.method,
                        service = %self.directory.url(),
                        mock = %body,
                        error = %e,
                        "Invocation failed, falling back to mock"
                    );
                    self.invoke_mock(ctx, &directive, Some(e)).await
                }
                outcome => outcome,
            },
        }
    }

    async fn invoke_mock(
        &self,
        ctx: &CallContext,
        directive: &MockDirective,
        cause: Option<InvokaError>,
    ) -> Result<Response> {
        let mock = match self.select_mock(ctx) {
            Some(mock) => mock,
            None => match MockEndpoint::from_directive(self.directory.url().clone(), directive) {
                Ok(mock) => Arc::new(mock) as SharedEndpoint,
                Err(e) => return Err(mock_failure(&e, cause.as_ref())),
            },
        };

        match mock.invoke(ctx).await {
            Ok(response) => Ok(response),
            // a stubbed business failure is an answer, not an error
            Err(InvokaError::Business(message)) => Ok(Response::error(ctx.id, message)),
            Err(e) => Err(mock_failure(&e, cause.as_ref())),
        }
    }

    /// First mock endpoint the directory offers, if any.
    fn select_mock(&self, ctx: &CallContext) -> Option<SharedEndpoint> {
        match self.directory.list(&ctx.for_mock_lookup()) {
            Ok(mocks) => mocks.into_iter().next(),
            Err(e) => {
                info!(
                    method = %ctx.method,
                    error = %e,
                    "Mock endpoint lookup failed, using the directive"
                );
                None
            }
        }
    }
}

fn mock_failure(mock_error: &InvokaError, cause: Option<&InvokaError>) -> InvokaError {
    let message = match cause {
        Some(cause) => format!("mock error : {}, invoke error is : {}", mock_error, cause),
        None => format!("mock error : {}", mock_error),
    };
    InvokaError::Mock { message }
}

impl Endpoint for MockClusterEndpoint {
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
        self.inner.destroy();
    }

    fn invoke<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Response>> {
        self.dispatch(ctx).boxed()
    }
}
