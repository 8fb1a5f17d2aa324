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

use std::fmt;

/// Outcome of a check, in the terms a Nagios compatible monitor expects.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Most severe first. UNKNOWN ranks below WARNING.
    const PRIORITY: [Status; 4] = [
        Status::Critical,
        Status::Warning,
        Status::Unknown,
        Status::Ok,
    ];

    /// The more severe of the two.
    pub fn worst(self, other: Status) -> Status {
        Self::PRIORITY
            .iter()
            .copied()
            .find(|s| *s == self || *s == other)
            .unwrap_or(self)
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Warning and critical levels, in percent of the interface bandwidth.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Thresholds {
    pub warning_pct: u32,
    pub critical_pct: u32,
}

impl Thresholds {
    /// Absolute warning level in bytes/s for a link of `capacity` bytes/s.
    pub fn warning_level(&self, capacity: u64) -> f64 {
        level(self.warning_pct, capacity)
    }

    pub fn critical_level(&self, capacity: u64) -> f64 {
        level(self.critical_pct, capacity)
    }

    pub fn classify(&self, rate: f64, capacity: u64) -> Status {
        classify(rate, capacity, self.critical_pct, self.warning_pct)
    }
}

fn level(pct: u32, capacity: u64) -> f64 {
    pct as f64 / 100.0 * capacity as f64
}

/// Compare a bytes/s rate against the percentage thresholds of a link of
/// `capacity` bytes/s. Both comparisons are strict.
pub fn classify(rate: f64, capacity: u64, critical_pct: u32, warning_pct: u32) -> Status {
    if rate > level(critical_pct, capacity) {
        Status::Critical
    } else if rate > level(warning_pct, capacity) {
        Status::Warning
    } else {
        Status::Ok
    }
}
