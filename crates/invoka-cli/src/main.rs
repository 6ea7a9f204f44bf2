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

//! # Invoka CLI Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # How would 10k calls spread over three weighted endpoints?
//! invoka simulate -e 'tri://10.0.0.1:20880/UserService?weight=5' \
//!                 -e 'tri://10.0.0.2:20880/UserService?weight=2' \
//!                 -e 'tri://10.0.0.3:20880/UserService?weight=1' --seed 42
//!
//! # Least active with pretended in-flight calls
//! invoka simulate --strategy leastactive -e tri://a:1/S -e tri://b:1/S --active 3 --active 0
//!
//! # Effective weight 30s after registration
//! invoka weight 'tri://10.0.0.1:20880/UserService?weight=100&warmup=60000' --uptime-ms 30000
//!
//! # One call with a fail-over mock against endpoints that drop connections
//! invoka call 'consumer://127.0.0.1/UserService?mock=fail:return null' getUser \
//!             -e local://127.0.0.1:20880/UserService --fail transport
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::Result;
use argh::FromArgs;
use invoka_cli::dispatch::{run_call, CallOptions, FailureMode};
use invoka_cli::simulate::{run_simulation, weight_report, SimulateOptions};
use invoka_cluster::LoadBalanceKind;
use invoka_common::EndpointUrl;

#[derive(FromArgs)]
/// Invoka - client-side endpoint selection and mock-aware dispatch
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Simulate(SimulateArgs),
    Weight(WeightArgs),
    Call(CallArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "simulate")]
/// run selections over endpoint URLs and print the distribution
struct SimulateArgs {
    /// endpoint URL; repeat for each endpoint
    #[argh(option, short = 'e', long = "endpoint")]
    endpoints: Vec<EndpointUrl>,

    /// selection strategy: random or leastactive
    #[argh(option, default = "LoadBalanceKind::Random")]
    strategy: LoadBalanceKind,

    /// method name used for method-scoped parameters
    #[argh(option, short = 'm', default = "\"getUser\".into()")]
    method: String,

    /// number of selections to run
    #[argh(option, short = 'n', default = "10000")]
    calls: u64,

    /// seed for a reproducible run
    #[argh(option)]
    seed: Option<u64>,

    /// in-flight calls per endpoint, in endpoint order
    #[argh(option)]
    active: Vec<u64>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "weight")]
/// print the effective weight of an endpoint
struct WeightArgs {
    /// endpoint URL
    #[argh(positional)]
    endpoint: EndpointUrl,

    /// method name used for method-scoped parameters
    #[argh(option, short = 'm', default = "\"getUser\".into()")]
    method: String,

    /// time since registration; defaults to the URL's timestamp parameter
    #[argh(option, long = "uptime-ms")]
    uptime_ms: Option<i64>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// dispatch one call through the mock guard against local stub endpoints
struct CallArgs {
    /// consumer URL carrying the mock directive
    #[argh(positional)]
    service: EndpointUrl,

    /// method to call
    #[argh(positional)]
    method: String,

    /// stub endpoint URL; repeat for each endpoint
    #[argh(option, short = 'e', long = "endpoint")]
    endpoints: Vec<EndpointUrl>,

    /// JSON arguments
    #[argh(option, short = 'a', long = "args", default = "\"null\".into()")]
    args: String,

    /// how the stubs answer: none, transport or business
    #[argh(option, default = "FailureMode::None")]
    fail: FailureMode,

    /// selection strategy: random or leastactive
    #[argh(option, default = "LoadBalanceKind::Random")]
    strategy: LoadBalanceKind,

    /// per-call timeout in milliseconds
    #[argh(option, long = "timeout-ms")]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Default to INFO, RUST_LOG overrides; stdout is reserved for JSON output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate(args) => {
            if args.endpoints.is_empty() {
                tracing::warn!("No endpoints specified! Use -e <url> to add endpoints.");
            }
            let report = run_simulation(&SimulateOptions {
                endpoints: args.endpoints,
                strategy: args.strategy,
                method: args.method,
                calls: args.calls,
                seed: args.seed,
                active: args.active,
            })?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Weight(args) => {
            let report = weight_report(&args.endpoint, &args.method, args.uptime_ms);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Call(args) => {
            let call_args: serde_json::Value = serde_json::from_str(&args.args)
                .map_err(|e| anyhow::anyhow!("Invalid JSON in args: {}", e))?;
            tracing::info!(
                service = %args.service,
                method = %args.method,
                endpoints = args.endpoints.len(),
                fail = %args.fail,
                "Dispatching call"
            );
            let value = run_call(CallOptions {
                service: args.service,
                endpoints: args.endpoints,
                method: args.method,
                args: call_args,
                fail: args.fail,
                strategy: args.strategy,
                timeout_ms: args.timeout_ms,
            })
            .await?;
            println!("{}", serde_json::to_string(&value)?);
            Ok(())
        }
    }
}

/// CLI argument parsing tests.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_simulate() {
        let args: Cli = Cli::from_args(
            &["invoka"],
            &[
                "simulate",
                "-e", "tri://10.0.0.1:20880/UserService?weight=5",
                "-e", "tri://10.0.0.2:20880/UserService",
                "--strategy", "leastactive",
                "--seed", "42",
                "--active", "3",
                "--active", "1",
            ],
        )
        .unwrap();
        match args.command {
            Commands::Simulate(SimulateArgs { endpoints, strategy, method, calls, seed, active }) => {
                assert_eq!(endpoints.len(), 2);
                assert_eq!(endpoints[0].parameter("weight"), Some("5"));
                assert_eq!(strategy, LoadBalanceKind::LeastActive);
                assert_eq!(method, "getUser"); // default
                assert_eq!(calls, 10000); // default
                assert_eq!(seed, Some(42));
                assert_eq!(active, vec![3, 1]);
            }
            _ => panic!("Expected Simulate command"),
        }
    }

    #[test]
    fn test_cli_parse_simulate_rejects_unknown_strategy() {
        let result = Cli::from_args(&["invoka"], &["simulate", "-e", "tri://a:1/S", "--strategy", "roundrobin"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_weight() {
        let args: Cli = Cli::from_args(
            &["invoka"],
            &["weight", "tri://10.0.0.1:20880/UserService?warmup=60000", "--uptime-ms", "30000"],
        )
        .unwrap();
        match args.command {
            Commands::Weight(WeightArgs { endpoint, method, uptime_ms }) => {
                assert_eq!(endpoint.host, "10.0.0.1");
                assert_eq!(method, "getUser");
                assert_eq!(uptime_ms, Some(30000));
            }
            _ => panic!("Expected Weight command"),
        }
    }

    #[test]
    fn test_cli_parse_weight_rejects_bad_url() {
        assert!(Cli::from_args(&["invoka"], &["weight", "10.0.0.1:20880"]).is_err());
    }

    #[test]
    fn test_cli_parse_call() {
        let args: Cli = Cli::from_args(
            &["invoka"],
            &[
                "call",
                "consumer://127.0.0.1/UserService?mock=force:return null",
                "getUser",
                "-e", "local://127.0.0.1:20880/UserService",
                "-a", "[7]",
                "--fail", "transport",
            ],
        )
        .unwrap();
        match args.command {
            Commands::Call(CallArgs { service, method, endpoints, args, fail, strategy, timeout_ms }) => {
                assert_eq!(service.parameter("mock"), Some("force:return null"));
                assert_eq!(method, "getUser");
                assert_eq!(endpoints.len(), 1);
                assert_eq!(args, "[7]");
                assert_eq!(fail, FailureMode::Transport);
                assert_eq!(strategy, LoadBalanceKind::Random);
                assert!(timeout_ms.is_none());
            }
            _ => panic!("Expected Call command"),
        }
    }

    #[test]
    fn test_cli_parse_call_defaults() {
        let args: Cli = Cli::from_args(
            &["invoka"],
            &["call", "consumer://127.0.0.1/UserService", "getUser"],
        )
        .unwrap();
        match args.command {
            Commands::Call(CallArgs { endpoints, args, fail, .. }) => {
                assert!(endpoints.is_empty());
                assert_eq!(args, "null");
                assert_eq!(fail, FailureMode::None);
            }
            _ => panic!("Expected Call command"),
        }
    }
}
