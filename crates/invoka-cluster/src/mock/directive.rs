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

use invoka_common::EndpointUrl;

/// URL parameter holding the mock directive, optionally method-scoped.
pub const MOCK_KEY: &str = "mock";

const FORCE_PREFIX: &str = "force";
const FAIL_PREFIX: &str = "fail";

/// How a call treats its mock.
///
/// The `Force` and `Fail` payloads hold the directive body with the
/// `force:` / `fail:` prefix removed, e.g. `return null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockDirective {
    /// Call the real endpoint only.
    Disabled,
    /// Skip the real endpoint and answer from the mock.
    Force(String),
    /// Call the real endpoint, fall back to the mock on infrastructure failure.
    Fail(String),
}

impl MockDirective {
    /// Classifies a raw directive value.
    ///
    /// Blank and `false` (any case) disable mocking. Values starting with
    /// `force` force the mock. Everything else means fail-over.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("false") {
            return MockDirective::Disabled;
        }
        if let Some(rest) = raw.strip_prefix(FORCE_PREFIX) {
            return MockDirective::Force(strip_separator(rest));
        }
        match raw.strip_prefix(FAIL_PREFIX) {
            Some(rest) if rest.is_empty() || rest.starts_with(':') => {
                MockDirective::Fail(strip_separator(rest))
            }
            _ => MockDirective::Fail(raw.to_string()),
        }
    }

    /// Reads the directive for `method` from a consumer URL.
    pub fn for_call(url: &EndpointUrl, method: &str) -> Self {
        Self::parse(url.method_parameter_or(method, MOCK_KEY, "false"))
    }

    /// Directive body, empty when mocking is disabled.
    pub fn body(&self) -> &str {
        match self {
            MockDirective::Disabled => "",
            MockDirective::Force(body) | MockDirective::Fail(body) => body,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, MockDirective::Disabled)
    }
}

fn strip_separator(rest: &str) -> String {
    rest.strip_prefix(':').unwrap_or(rest).trim().to_string()
}
