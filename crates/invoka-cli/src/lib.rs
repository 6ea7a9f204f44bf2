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


//! # Invoka CLI
//!
//! Library side of the `invoka` binary. Each subcommand's logic lives in
//! its own module so it can be tested without spawning the process:
//!
//! - [`simulate`]: run many selections over URL-described endpoints and
//!   report the distribution, or the effective weight of one endpoint
//! - [`dispatch`]: send one call through the mock guard against in-process
//!   endpoints that can be told to fail

pub mod dispatch;
pub mod simulate;
