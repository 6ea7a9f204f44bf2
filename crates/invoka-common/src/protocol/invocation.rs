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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

pub type RequestId = u64;
pub type MethodName = String;
pub type RpcArgs = serde_json::Value;

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Which endpoint list a directory lookup should return.
///
/// The mock guard flips this to `NeedsMock` before asking the directory for
/// stand-in endpoints; directories must honour it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum MockLookup {
    #[default]
    Real,
    NeedsMock,
}

/// One call travelling through the cluster layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallContext {
    pub id: RequestId,
    pub method: MethodName,
    pub args: RpcArgs,
    /// Free-form key/value pairs propagated with the call.
    pub attachments: HashMap<String, String>,
    pub mock_lookup: MockLookup,
}

impl CallContext {
    pub fn new(method: impl Into<String>, args: RpcArgs) -> Self {
        CallContext {
            id: generate_request_id(),
            method: method.into(),
            args,
            attachments: HashMap::new(),
            mock_lookup: MockLookup::Real,
        }
    }

    pub fn with_attachment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attachments.insert(key.into(), value.into());
        self
    }

    pub fn attachment(&self, key: &str) -> Option<&str> {
        self.attachments.get(key).map(String::as_str)
    }

    /// Copy of this call flagged for a mock-endpoint lookup.
    ///
    /// The request id is kept so the mock response still matches the call.
    pub fn for_mock_lookup(&self) -> Self {
        let mut ctx = self.clone();
        ctx.mock_lookup = MockLookup::NeedsMock;
        ctx
    }

    pub fn needs_mock(&self) -> bool {
        self.mock_lookup == MockLookup::NeedsMock
    }
}

fn generate_request_id() -> RequestId {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    // upper 32 bits from the clock, lower 32 from the counter
    let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    (timestamp & 0xFFFFFFFF00000000) | (counter & 0xFFFFFFFF)
}
