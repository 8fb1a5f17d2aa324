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

//! Per-counter deltas and rates between two snapshots.

use procfs::CounterSet;
use thiserror::Error;

/// Width of the kernel's counters, which decides where they wrap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CounterWidth {
    Bits32,
    Bits64,
}

impl CounterWidth {
    /// Counters are as wide as the platform's native word.
    pub fn native() -> CounterWidth {
        if usize::BITS >= 64 {
            CounterWidth::Bits64
        } else {
            CounterWidth::Bits32
        }
    }

    pub fn max(&self) -> u64 {
        match self {
            CounterWidth::Bits32 => u32::MAX as u64,
            CounterWidth::Bits64 => u64::MAX,
        }
    }
}

/// Growth of a counter between two readings.
///
/// A lower current uptime means the machine rebooted in between, so the
/// counter restarted from zero and its current value is the delta. A lower
/// current value without a reboot means the counter wrapped at the width
/// maximum.
pub fn calc_diff(
    prior: u64,
    prior_uptime: f64,
    current: u64,
    current_uptime: f64,
    width: CounterWidth,
) -> u64 {
    if current_uptime < prior_uptime {
        current
    } else if prior > current {
        // current < prior keeps this below the maximum
        width.max().saturating_sub(prior) + current
    } else {
        current - prior
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum IntervalError {
    #[error("Elapsed time {0}s is not positive")]
    NotPositive(f64),
}

/// Everything needed to turn two counter readings into a rate.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Interval {
    pub last_uptime: f64,
    pub sample_uptime: f64,
    pub elapsed_secs: f64,
    pub width: CounterWidth,
}

impl Interval {
    /// `elapsed_secs` is wall clock time between the two captures. It must
    /// be a finite positive number, otherwise no rate can be derived.
    pub fn new(
        last_uptime: f64,
        sample_uptime: f64,
        elapsed_secs: f64,
        width: CounterWidth,
    ) -> Result<Interval, IntervalError> {
        if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
            return Err(IntervalError::NotPositive(elapsed_secs));
        }
        Ok(Interval {
            last_uptime,
            sample_uptime,
            elapsed_secs,
            width,
        })
    }
}

macro_rules! count_per_sec {
    ($last:expr, $sample:expr, $interval:expr, $field:ident) => {
        calc_diff(
            $last.$field,
            $interval.last_uptime,
            $sample.$field,
            $interval.sample_uptime,
            $interval.width,
        ) as f64
            / $interval.elapsed_secs
    };
}

/// Per second rates of every tracked counter of one interface.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct RateSet {
    pub rx_bytes_per_sec: f64,
    pub tx_bytes_per_sec: f64,
    pub rx_packets_per_sec: f64,
    pub tx_packets_per_sec: f64,
    pub rx_errors_per_sec: f64,
    pub tx_errors_per_sec: f64,
    pub rx_drops_per_sec: f64,
    pub tx_drops_per_sec: f64,
}

impl RateSet {
    pub fn new(last: &CounterSet, sample: &CounterSet, interval: &Interval) -> RateSet {
        RateSet {
            rx_bytes_per_sec: count_per_sec!(last, sample, interval, rx_bytes),
            tx_bytes_per_sec: count_per_sec!(last, sample, interval, tx_bytes),
            rx_packets_per_sec: count_per_sec!(last, sample, interval, rx_packets),
            tx_packets_per_sec: count_per_sec!(last, sample, interval, tx_packets),
            rx_errors_per_sec: count_per_sec!(last, sample, interval, rx_errors),
            tx_errors_per_sec: count_per_sec!(last, sample, interval, tx_errors),
            rx_drops_per_sec: count_per_sec!(last, sample, interval, rx_drops),
            tx_drops_per_sec: count_per_sec!(last, sample, interval, tx_drops),
        }
    }
}
