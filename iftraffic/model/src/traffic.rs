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

use common::util::bytes_to_mbit;

use crate::delta::RateSet;
use crate::status::Status;
use crate::status::Thresholds;

/// Rates of one interface classified against its bandwidth.
#[derive(Clone, PartialEq, Debug)]
pub struct InterfaceTraffic {
    pub interface: String,
    pub rates: RateSet,
    /// Capacity in bytes/s.
    pub bandwidth: u64,
    pub thresholds: Thresholds,
    pub tx_status: Status,
    pub rx_status: Status,
}

impl InterfaceTraffic {
    pub fn new(
        interface: &str,
        rates: RateSet,
        bandwidth: u64,
        thresholds: Thresholds,
    ) -> InterfaceTraffic {
        InterfaceTraffic {
            interface: interface.to_string(),
            tx_status: thresholds.classify(rates.tx_bytes_per_sec, bandwidth),
            rx_status: thresholds.classify(rates.rx_bytes_per_sec, bandwidth),
            rates,
            bandwidth,
            thresholds,
        }
    }

    pub fn status(&self) -> Status {
        self.tx_status.worst(self.rx_status)
    }

    fn problem(&self, rate: f64) -> String {
        format!(
            "{}: {:.2}Mbit/{:.2}Mbit",
            self.interface,
            bytes_to_mbit(rate),
            bytes_to_mbit(self.bandwidth as f64)
        )
    }

    /// One entry per direction over threshold, tx first.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.tx_status != Status::Ok {
            problems.push(self.problem(self.rates.tx_bytes_per_sec));
        }
        if self.rx_status != Status::Ok {
            problems.push(self.problem(self.rates.rx_bytes_per_sec));
        }
        problems
    }

    fn byte_perfdata(&self, label: &str, rate: f64) -> String {
        format!(
            "{}-{}={:.2};{};{};0;{}",
            label,
            self.interface,
            rate,
            self.thresholds.warning_level(self.bandwidth) as u64,
            self.thresholds.critical_level(self.bandwidth) as u64,
            self.bandwidth
        )
    }

    fn counter_perfdata(&self, label: &str, rate: f64) -> String {
        format!("{}-{}={:.1}", label, self.interface, rate)
    }

    pub fn perfdata(&self) -> Vec<String> {
        let r = &self.rates;
        vec![
            self.byte_perfdata("out", r.tx_bytes_per_sec),
            self.byte_perfdata("in", r.rx_bytes_per_sec),
            self.counter_perfdata("pktout", r.tx_packets_per_sec),
            self.counter_perfdata("pktin", r.rx_packets_per_sec),
            self.counter_perfdata("errout", r.tx_errors_per_sec),
            self.counter_perfdata("errin", r.rx_errors_per_sec),
            self.counter_perfdata("dropout", r.tx_drops_per_sec),
            self.counter_perfdata("dropin", r.rx_drops_per_sec),
        ]
    }
}
