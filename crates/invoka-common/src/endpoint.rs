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

use crate::protocol::{CallContext, EndpointUrl, Response, Result};
use futures::future::BoxFuture;
use std::fmt::Debug;
use std::sync::Arc;

/// Shared handle to an endpoint, as held in pools and directories.
pub type SharedEndpoint = Arc<dyn Endpoint>;

/// A handle to one service instance, remote or local.
///
/// Endpoints are immutable once published. When an instance's metadata
/// changes, the directory replaces the whole endpoint rather than mutating it.
///
/// `invoke` is the only suspension point of a dispatch: selection and the
/// mock decision are plain computation around it.
pub trait Endpoint: Send + Sync + Debug {
    /// URL describing this endpoint (identity plus metadata parameters).
    fn url(&self) -> &EndpointUrl;

    /// Service interface this endpoint serves.
    fn interface(&self) -> &str {
        self.url().service_interface()
    }

    fn is_available(&self) -> bool {
        true
    }

    /// Releases resources held by the endpoint.
    fn destroy(&self) {}

    /// Performs the call.
    ///
    /// Returns `Err` for business failures (`InvokaError::Business`) as well
    /// as infrastructure failures; callers classify with
    /// [`InvokaError::is_business`](crate::InvokaError::is_business).
    fn invoke<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Response>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;

    #[derive(Debug)]
    struct Fixed(EndpointUrl);

    impl Endpoint for Fixed {
        fn url(&self) -> &EndpointUrl {
            &self.0
        }

        fn invoke<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Response>> {
            async move { Ok(Response::success(ctx.id, json!(ctx.method))) }.boxed()
        }
    }

    #[tokio::test]
    async fn test_defaults_and_invoke_through_trait_object() {
        let endpoint: SharedEndpoint = Arc::new(Fixed(
            EndpointUrl::new("tri", "10.0.0.1", Some(20880), "UserService")
                .with_parameter("interface", "com.example.UserService"),
        ));
        assert!(endpoint.is_available());
        assert_eq!(endpoint.interface(), "com.example.UserService");
        endpoint.destroy();

        let ctx = CallContext::new("getUser", json!([1]));
        let response = endpoint.invoke(&ctx).await.unwrap();
        assert_eq!(response.result, Some(json!("getUser")));
    }
}
