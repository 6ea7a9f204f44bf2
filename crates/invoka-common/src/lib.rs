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

//! Invoka Common Types
//!
//! This crate provides the protocol definitions shared by every Invoka crate.
//!
//! # Overview
//!
//! Invoka is the client-side dispatch core of a distributed RPC client: it
//! picks one endpoint out of a pool for each call and wraps the call with a
//! mock/fallback policy. This crate holds the vocabulary the other crates
//! speak:
//!
//! - [`protocol`] - Call contexts, responses, endpoint URLs and the error type
//! - [`Endpoint`] - The trait every selectable service instance implements
//!
//! # Failure classification
//!
//! [`InvokaError`] separates *business* failures (the callee ran and said
//! no) from *infrastructure* failures (network, timeout, serialization,
//! unavailability). Only the latter may be replaced by a mock result.
//!
//! # Example
//!
//! ```
//! use invoka_common::{CallContext, EndpointUrl, Response};
//! use serde_json::json;
//!
//! let url: EndpointUrl = "tri://10.0.0.1:20880/UserService?weight=20".parse().unwrap();
//! let ctx = CallContext::new("getUser", json!({"id": 7}));
//!
//! assert_eq!(url.method_parameter_i64(&ctx.method, "weight", 100), 20);
//! let response = Response::success(ctx.id, json!({"name": "ada"}));
//! assert!(response.success);
//! ```

pub mod endpoint;
pub mod protocol;

pub use endpoint::{Endpoint, SharedEndpoint};
pub use protocol::*;
