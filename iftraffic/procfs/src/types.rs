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

use std::collections::BTreeMap;

/// Number of counters tracked per interface.
pub const COUNTER_FIELDS: usize = 8;

/// Counters of a single interface, as read at one instant.
///
/// Error and drop counters aggregate several kernel columns, see
/// `from_net_dev_columns`.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct CounterSet {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_drops: u64,
    pub tx_drops: u64,
}

impl CounterSet {
    /// Build a CounterSet from the 16 value columns of a /proc/net/dev line.
    ///
    /// Receive: bytes packets errs drop fifo frame compressed multicast
    /// Transmit: bytes packets errs drop fifo colls carrier compressed
    pub fn from_net_dev_columns(columns: &[u64; 16]) -> CounterSet {
        // The kernel counters wrap, so their sums do too.
        CounterSet {
            rx_bytes: columns[0],
            rx_packets: columns[1],
            rx_errors: columns[2].wrapping_add(columns[4]).wrapping_add(columns[5]),
            rx_drops: columns[3],
            tx_bytes: columns[8],
            tx_packets: columns[9],
            tx_errors: columns[10]
                .wrapping_add(columns[12])
                .wrapping_add(columns[13]),
            tx_drops: columns[11],
        }
    }

    /// Values in persisted column order.
    pub fn to_array(&self) -> [u64; COUNTER_FIELDS] {
        [
            self.rx_bytes,
            self.tx_bytes,
            self.rx_packets,
            self.tx_packets,
            self.rx_errors,
            self.tx_errors,
            self.rx_drops,
            self.tx_drops,
        ]
    }

    /// Inverse of `to_array`.
    pub fn from_array(values: [u64; COUNTER_FIELDS]) -> CounterSet {
        let [
            rx_bytes,
            tx_bytes,
            rx_packets,
            tx_packets,
            rx_errors,
            tx_errors,
            rx_drops,
            tx_drops,
        ] = values;
        CounterSet {
            rx_bytes,
            tx_bytes,
            rx_packets,
            tx_packets,
            rx_errors,
            tx_errors,
            rx_drops,
            tx_drops,
        }
    }
}

pub type NetDevMap = BTreeMap<String, CounterSet>;

/// All interface counters plus the uptime (seconds since boot) they were
/// captured at.
#[derive(Default, Clone, PartialEq, Debug)]
pub struct Snapshot {
    pub uptime: f64,
    pub interfaces: NetDevMap,
}
