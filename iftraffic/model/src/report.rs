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

use crate::status::Status;
use crate::traffic::InterfaceTraffic;

/// Accumulated outcome of one run, rendered as a single plugin line.
#[derive(Clone, PartialEq, Debug)]
pub struct Report {
    status: Status,
    problems: Vec<String>,
    perfdata: Vec<String>,
}

impl Default for Report {
    fn default() -> Self {
        Report::new()
    }
}

impl Report {
    pub fn new() -> Report {
        Report {
            status: Status::Ok,
            problems: Vec::new(),
            perfdata: Vec::new(),
        }
    }

    pub fn raise(&mut self, status: Status) {
        self.status = self.status.worst(status);
    }

    pub fn add_problem<S: Into<String>>(&mut self, status: Status, problem: S) {
        self.raise(status);
        self.problems.push(problem.into());
    }

    pub fn add_interface(&mut self, traffic: &InterfaceTraffic) {
        self.raise(traffic.status());
        self.problems.extend(traffic.problems());
        self.perfdata.extend(traffic.perfdata());
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn perfdata(&self) -> &[String] {
        &self.perfdata
    }

    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut problems = self.problems.clone();
        problems.sort();
        let mut perfdata = self.perfdata.clone();
        perfdata.sort();
        write!(
            f,
            "TRAFFIC {}: {} | {}",
            self.status,
            problems.join(" "),
            perfdata.join(" ")
        )
    }
}
