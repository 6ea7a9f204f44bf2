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
use futures::future::BoxFuture;
use futures::FutureExt;
use invoka_common::{CallContext, Endpoint, EndpointUrl, InvokaError, Response, Result};
use serde_json::{Map, Value};

const RETURN_PREFIX: &str = "return";
const THROW_PREFIX: &str = "throw";
const DEFAULT_THROW_MESSAGE: &str = "mocked exception for service degradation";

/// What a built-in mock answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    Return(Value),
    /// Business failure, with an optional message.
    Throw(Option<String>),
}

impl MockBehavior {
    /// Interprets a directive body such as `return {"id": 1}` or `throw`.
    pub fn parse(body: &str) -> Result<Self> {
        let body = body.trim();
        if body.is_empty() || body == "true" || body == "default" {
            return Ok(MockBehavior::Return(Value::Null));
        }

        if let Some(rest) = keyword_rest(body, RETURN_PREFIX) {
            return Ok(MockBehavior::Return(parse_value(rest)));
        }

        if let Some(rest) = keyword_rest(body, THROW_PREFIX) {
            let message = (!rest.is_empty()).then(|| rest.to_string());
            return Ok(MockBehavior::Throw(message));
        }

        Err(InvokaError::InvalidMock(body.to_string()))
    }
}

/// `keyword` alone or followed by whitespace; returns the trimmed remainder.
fn keyword_rest<'a>(body: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = body.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn parse_value(raw: &str) -> Value {
    match raw {
        "" | "null" => Value::Null,
        "empty" => Value::Object(Map::new()),
        _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

/// Stand-in endpoint built from a mock directive.
///
/// Used when the directory offers no mock endpoint of its own.
#[derive(Debug, Clone)]
pub struct MockEndpoint {
    url: EndpointUrl,
    behavior: MockBehavior,
}

impl MockEndpoint {
    pub fn new(url: EndpointUrl, behavior: MockBehavior) -> Self {
        Self { url, behavior }
    }

    /// Builds the mock for `directive`, failing with
    /// [`InvokaError::InvalidMock`] on a body it cannot interpret.
    pub fn from_directive(url: EndpointUrl, directive: &MockDirective) -> Result<Self> {
        let behavior = MockBehavior::parse(directive.body())?;
        Ok(Self::new(url, behavior))
    }

    pub fn behavior(&self) -> &MockBehavior {
        &self.behavior
    }
}

impl Endpoint for MockEndpoint {
    fn url(&self) -> &EndpointUrl {
        &self.url
    }

    fn invoke<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Response>> {
        let outcome = match &self.behavior {
            MockBehavior::Return(value) => Ok(Response::success(ctx.id, value.clone())),
            MockBehavior::Throw(message) => Err(InvokaError::Business(
                message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_THROW_MESSAGE.to_string()),
            )),
        };
        futures::future::ready(outcome).boxed()
    }
}
