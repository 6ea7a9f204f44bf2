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


//! Invoka Client
//!
//! One-call facade over endpoint selection and mock fallback:
//!
//! ```
//! use invoka_client::{InvokaClient, LocalEndpoint};
//! use invoka_common::EndpointUrl;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service: EndpointUrl = "consumer://10.0.0.1/UserService?mock=fail:return null"
//!     .parse()
//!     .unwrap();
//! let endpoint = LocalEndpoint::new(
//!     EndpointUrl::new("local", "127.0.0.1", Some(20880), "UserService"),
//!     |ctx| Ok(json!({"method": ctx.method})),
//! );
//! let client = InvokaClient::new(service, vec![Arc::new(endpoint)]);
//! let user = client.call("getUser", json!([7])).await.unwrap();
//! assert_eq!(user, json!({"method": "getUser"}));
//! # }
//! ```

pub mod client;
pub mod local;

pub use client::{ClientConfig, InvokaClient};
pub use local::{LocalEndpoint, LocalHandler};
