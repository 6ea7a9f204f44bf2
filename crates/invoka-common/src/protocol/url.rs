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

//! Endpoint URLs
//!
//! Every endpoint is described by a URL-like value:
//!
//! ```text
//! protocol://host:port/path?key=value&method.key=value
//! ```
//!
//! The query parameters carry the endpoint's metadata (weight, warmup,
//! registration timestamp, mock directive). A parameter may be scoped to a
//! single method by prefixing the key with `<method>.`; method-scoped values
//! take precedence over the plain key.

use super::error::{InvokaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parameter key holding the service interface name.
pub const INTERFACE_KEY: &str = "interface";

/// An immutable description of one endpoint: identity plus parameters.
///
/// # Example
///
/// ```
/// use invoka_common::EndpointUrl;
///
/// let url: EndpointUrl = "tri://10.0.0.7:20880/UserService?weight=50&getUser.weight=80"
///     .parse()
///     .unwrap();
/// assert_eq!(url.identity(), "tri://10.0.0.7:20880/UserService");
/// assert_eq!(url.method_parameter("getUser", "weight"), Some("80"));
/// assert_eq!(url.method_parameter("listUsers", "weight"), Some("50"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EndpointUrl {
    pub protocol: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub parameters: BTreeMap<String, String>,
}

impl EndpointUrl {
    pub fn new(
        protocol: impl Into<String>,
        host: impl Into<String>,
        port: Option<u16>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            port,
            path: path.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Returns a copy of this URL with one more parameter set.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// `host:port`, or just `host` when no port is set.
    pub fn address(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    /// Identity of the endpoint, stable across parameter changes.
    ///
    /// Activity counters are keyed by this value.
    pub fn identity(&self) -> String {
        format!("{}://{}/{}", self.protocol, self.address(), self.path)
    }

    /// The service interface this endpoint serves.
    ///
    /// Uses the `interface` parameter if present, otherwise the path.
    pub fn service_interface(&self) -> &str {
        self.parameter(INTERFACE_KEY).unwrap_or(&self.path)
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn parameter_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.parameter(key).unwrap_or(default)
    }

    /// Looks up `<method>.<key>` first, then `<key>`.
    pub fn method_parameter(&self, method: &str, key: &str) -> Option<&str> {
        self.parameters
            .get(&format!("{}.{}", method, key))
            .or_else(|| self.parameters.get(key))
            .map(String::as_str)
    }

    pub fn method_parameter_or<'a>(&'a self, method: &str, key: &str, default: &'a str) -> &'a str {
        self.method_parameter(method, key).unwrap_or(default)
    }

    /// Numeric parameter lookup; malformed values fall back to `default`.
    pub fn parameter_i64(&self, key: &str, default: i64) -> i64 {
        parse_or_default(key, self.parameter(key), default)
    }

    /// Numeric method-scoped lookup; malformed values fall back to `default`.
    pub fn method_parameter_i64(&self, method: &str, key: &str, default: i64) -> i64 {
        parse_or_default(key, self.method_parameter(method, key), default)
    }
}

fn parse_or_default(key: &str, value: Option<&str>, default: i64) -> i64 {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::debug!(key, value = raw, default, "Ignoring non-numeric endpoint parameter");
            default
        }),
    }
}

impl FromStr for EndpointUrl {
    type Err = InvokaError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (protocol, rest) = s
            .split_once("://")
            .ok_or_else(|| InvokaError::InvalidUrl(format!("'{}' is missing a protocol", s)))?;
        if protocol.is_empty() {
            return Err(InvokaError::InvalidUrl(format!("'{}' has an empty protocol", s)));
        }

        let (location, query) = match rest.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (rest, None),
        };
        let (authority, path) = match location.split_once('/') {
            Some((authority, path)) => (authority, path),
            None => (location, ""),
        };
        if authority.is_empty() {
            return Err(InvokaError::InvalidUrl(format!("'{}' has no host", s)));
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    InvokaError::InvalidUrl(format!("'{}' has an invalid port '{}'", s, port))
                })?;
                (host, Some(port))
            }
            None => (authority, None),
        };

        let mut url = EndpointUrl::new(protocol, host, port, path);
        if let Some(query) = query {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                url.parameters.insert(key.to_string(), value.to_string());
            }
        }
        Ok(url)
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity())?;
        let mut separator = '?';
        for (key, value) in &self.parameters {
            write!(f, "{}{}={}", separator, key, value)?;
            separator = '&';
        }
        Ok(())
    }
}
