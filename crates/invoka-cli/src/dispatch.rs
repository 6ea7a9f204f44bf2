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

//! One call through the full client stack against local stub endpoints.

use anyhow::{anyhow, Result};
use invoka_client::{ClientConfig, InvokaClient, LocalEndpoint};
use invoka_cluster::ClusterConfig;
use invoka_cluster::LoadBalanceKind;
use invoka_common::{EndpointUrl, InvokaError, SharedEndpoint};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How the stub endpoints answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Echo the method, arguments and serving address.
    #[default]
    None,
    /// Fail as if the connection dropped.
    Transport,
    /// Fail with an application error.
    Business,
}

impl FromStr for FailureMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(FailureMode::None),
            "transport" => Ok(FailureMode::Transport),
            "business" => Ok(FailureMode::Business),
            other => Err(anyhow!(
                "Unknown failure mode '{}' (expected none, transport or business)",
                other
            )),
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureMode::None => "none",
            FailureMode::Transport => "transport",
            FailureMode::Business => "business",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Consumer URL; its `mock` parameters drive the fallback.
    pub service: EndpointUrl,
    pub endpoints: Vec<EndpointUrl>,
    pub method: String,
    pub args: Value,
    pub fail: FailureMode,
    pub strategy: LoadBalanceKind,
    pub timeout_ms: Option<u64>,
}

fn stub(url: EndpointUrl, fail: FailureMode) -> SharedEndpoint {
    let address = url.address();
    Arc::new(LocalEndpoint::new(url, move |ctx| match fail {
        FailureMode::None => Ok(json!({
            "method": ctx.method,
            "args": ctx.args,
            "served_by": address,
        })),
        FailureMode::Transport => Err(InvokaError::Transport(format!(
            "connection to {} refused",
            address
        ))),
        FailureMode::Business => Err(InvokaError::Business(format!(
            "{} rejected {}",
            address, ctx.method
        ))),
    }))
}

/// Sends one call and returns the caller-facing value.
pub async fn run_call(options: CallOptions) -> Result<Value> {
    let endpoints = options
        .endpoints
        .into_iter()
        .map(|url| stub(url, options.fail))
        .collect();

    let config = ClientConfig {
        cluster: ClusterConfig {
            load_balance: options.strategy,
            timeout_ms: options.timeout_ms,
        },
        ..ClientConfig::default()
    };
    let client = InvokaClient::with_config(options.service, endpoints, config);
    let value = client.call(options.method, options.args).await?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(mock: Option<&str>, fail: FailureMode) -> CallOptions {
        let mut service: EndpointUrl = "consumer://127.0.0.1/UserService".parse().unwrap();
        if let Some(mock) = mock {
            service = service.with_parameter("mock", mock);
        }
        CallOptions {
            service,
            endpoints: vec!["local://127.0.0.1:20880/UserService".parse().unwrap()],
            method: "getUser".to_string(),
            args: json!([7]),
            fail,
            strategy: LoadBalanceKind::Random,
            timeout_ms: None,
        }
    }

    #[test]
    fn test_failure_mode_parse() {
        assert_eq!("none".parse::<FailureMode>().unwrap(), FailureMode::None);
        assert_eq!(" Transport ".parse::<FailureMode>().unwrap(), FailureMode::Transport);
        assert_eq!("business".parse::<FailureMode>().unwrap(), FailureMode::Business);
        assert!("timeout".parse::<FailureMode>().is_err());
        assert_eq!(FailureMode::Business.to_string(), "business");
    }

    #[tokio::test]
    async fn test_real_call() {
        let value = run_call(options(None, FailureMode::None)).await.unwrap();
        assert_eq!(value["served_by"], json!("127.0.0.1:20880"));
        assert_eq!(value["args"], json!([7]));
    }

    #[tokio::test]
    async fn test_fail_mock_on_transport_failure() {
        let value = run_call(options(Some("fail:return \"cached\""), FailureMode::Transport))
            .await
            .unwrap();
        assert_eq!(value, json!("cached"));
    }

    #[tokio::test]
    async fn test_business_failure_is_not_mocked() {
        let err = run_call(options(Some("fail:return null"), FailureMode::Business))
            .await
            .unwrap_err();
        let err = err.downcast::<InvokaError>().unwrap();
        assert!(err.is_business());
    }

    #[tokio::test]
    async fn test_force_mock() {
        let value = run_call(options(Some("force:return empty"), FailureMode::Transport))
            .await
            .unwrap();
        assert_eq!(value, json!({}));
    }
}
