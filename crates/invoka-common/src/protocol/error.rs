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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvokaError {
    #[error("No available endpoint for {service}.{method}")]
    NoAvailableEndpoint { service: String, method: String },

    /// The callee ran and returned an application-level error.
    #[error("Business error: {0}")]
    Business(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Endpoint unavailable: {0}")]
    EndpointUnavailable(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid mock directive: {0}")]
    InvalidMock(String),

    /// Mock fallback failed; carries the mock error and the original call error.
    #[error("{message}")]
    Mock { message: String },

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl InvokaError {
    /// Returns `true` when the failure was raised by the callee's own logic.
    ///
    /// Business failures are never replaced by a mock result.
    pub fn is_business(&self) -> bool {
        matches!(self, InvokaError::Business(_))
    }

    /// Returns `true` for network, timeout, serialization and availability
    /// failures, the ones a fail-over mock is allowed to absorb.
    ///
    /// Selection-phase errors (`NoAvailableEndpoint`) are neither business
    /// nor infrastructure failures of an endpoint call.
    pub fn is_infrastructure(&self) -> bool {
        !self.is_business() && !self.is_selection()
    }

    /// Returns `true` when no endpoint could be selected at all.
    pub fn is_selection(&self) -> bool {
        matches!(self, InvokaError::NoAvailableEndpoint { .. })
    }
}

pub type Result<T> = std::result::Result<T, InvokaError>;
