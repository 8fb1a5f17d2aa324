// Copyright (c) Facebook, Inc. and its affiliates.
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

pub mod bandwidth;
pub mod delta;
pub mod filter;
pub mod report;
pub mod status;
pub mod traffic;

#[cfg(test)]
mod test;

pub use bandwidth::resolve_bandwidth;
pub use delta::*;
pub use filter::*;
pub use report::Report;
pub use status::*;
pub use traffic::InterfaceTraffic;
