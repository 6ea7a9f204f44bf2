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

//! Mock directives and the dispatch guard that applies them.
//!
//! A consumer opts in through the `mock` URL parameter (or `<method>.mock`
//! for one method):
//!
//! ```text
//! consumer://10.0.0.1/UserService?getUser.mock=force:return {"name":"guest"}
//! consumer://10.0.0.1/UserService?mock=fail:throw user service degraded
//! ```

mod directive;
mod endpoint;
mod guard;

pub use directive::{MockDirective, MOCK_KEY};
pub use endpoint::{MockBehavior, MockEndpoint};
pub use guard::MockClusterEndpoint;
