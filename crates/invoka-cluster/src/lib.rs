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


//! Invoka Cluster
//!
//! Client-side endpoint selection and fault-tolerant dispatch.
//!
//! # Architecture
//!
//! A call flows through three layers:
//!
//! ```text
//! MockClusterEndpoint  (mock directive: disabled / force / fail-over)
//!   -> ClusterEndpoint (directory listing + LoadBalance::select, timeout)
//!     -> Endpoint      (the selected instance)
//! ```
//!
//! Selection strategies read effective weights from endpoint URL parameters
//! (`weight`, `warmup`, `timestamp`) so that freshly started instances ramp
//! up gradually, and the least-active strategy additionally reads in-flight
//! counts from an [`ActivitySource`].

pub mod activity;
pub mod cluster;
pub mod directory;
pub mod load_balance;
pub mod mock;
pub mod random;
pub mod weight;

pub use activity::{ActiveTrackingEndpoint, ActivitySnapshot, ActivitySource, ActivityTracker};
pub use cluster::{ClusterConfig, ClusterEndpoint};
pub use directory::{Directory, StaticDirectory};
pub use load_balance::{
    pick_weighted, LeastActiveLoadBalance, LoadBalance, LoadBalanceKind, RandomLoadBalance,
};
pub use mock::{MockBehavior, MockClusterEndpoint, MockDirective, MockEndpoint};
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadLocalRandom};
pub use weight::{
    effective_weight, warmup_weight, Clock, DEFAULT_WARMUP_MS, DEFAULT_WEIGHT, MAX_WEIGHT,
};
