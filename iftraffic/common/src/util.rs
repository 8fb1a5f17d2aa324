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

//! Unit helpers shared by the reporter and the bandwidth resolver.

/// Convert a byte count (or bytes/s rate) into Mbit using binary megabits,
/// which is what the plugin has always reported.
pub fn bytes_to_mbit(bytes: f64) -> f64 {
    bytes * 8.0 / 1024.0 / 1024.0
}

/// Convert a link speed in Mbit/s as reported by ethtool into bytes/s.
pub fn mbit_to_bytes(mbit: u64) -> u64 {
    mbit * 1024 * 1024 / 8
}

fn convert(val: f64, base: f64, units: &[&'static str]) -> String {
    if val < 1_f64 {
        return format!("{:.1} {}", val, units[0]);
    }
    let exponent = std::cmp::min(
        (val.ln() / base.ln()).floor() as i32,
        (units.len() - 1) as i32,
    );
    let pretty_val = (val / base.powi(exponent) * 10.0).round() / 10.0;
    format!("{} {}", pretty_val, units[exponent as usize])
}

/// Convert a bytes/s rate into a human friendly string for log messages.
pub fn convert_rate(val: f64) -> String {
    const UNITS: &[&str] = &["B/s", "KB/s", "MB/s", "GB/s", "TB/s", "PB/s"];
    convert(val, 1024_f64, UNITS)
}
