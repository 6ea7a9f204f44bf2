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

//! Invoka Response Types
//!
//! This module defines the result of one endpoint invocation.

use super::error::{InvokaError, Result};
use super::RequestId;
use serde::{Deserialize, Serialize};

/// RPC method result (JSON value)
pub type RpcResult = serde_json::Value;

/// The outcome of an endpoint invocation that completed.
///
/// A `Response` is what an endpoint hands back when the call itself went
/// through. Failures of the call are reported as `Err(InvokaError)` instead;
/// the one exception is a business failure raised by a mock, which is
/// delivered as an error response so the caller sees a stubbed outcome.
///
/// # Fields
///
/// - `id`: The request ID this response corresponds to
/// - `result`: The result value (present on success)
/// - `error`: Error message (present on failure)
/// - `success`: Whether the request succeeded
///
/// # Example
///
/// ```
/// use invoka_common::protocol::responses::Response;
/// use serde_json::json;
///
/// let success = Response::success(123, json!({"name": "ada"}));
/// assert!(success.success);
///
/// let error = Response::error(123, "user not found");
/// assert!(!error.success);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    /// Request identifier this response corresponds to
    pub id: RequestId,
    /// Result value (present on success)
    pub result: Option<RpcResult>,
    /// Error message (present on failure)
    pub error: Option<String>,
    /// Whether the request succeeded
    pub success: bool,
}

impl Response {
    /// Creates a successful response.
    pub fn success(id: RequestId, result: RpcResult) -> Self {
        Response {
            id,
            result: Some(result),
            error: None,
            success: true,
        }
    }

    /// Creates an error response.
    ///
    /// # Example
    ///
    /// ```
    /// use invoka_common::protocol::responses::Response;
    ///
    /// let response = Response::error(7, "stubbed failure");
    /// assert_eq!(response.error, Some("stubbed failure".to_string()));
    /// assert!(response.result.is_none());
    /// ```
    pub fn error(id: RequestId, error: impl Into<String>) -> Self {
        Response {
            id,
            result: None,
            error: Some(error.into()),
            success: false,
        }
    }

    /// Converts the response into the caller-facing value.
    ///
    /// An error payload becomes `InvokaError::Business`; a success without a
    /// result is reported as `null`.
    pub fn into_result(self) -> Result<RpcResult> {
        if self.success {
            Ok(self.result.unwrap_or(RpcResult::Null))
        } else {
            Err(InvokaError::Business(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}
