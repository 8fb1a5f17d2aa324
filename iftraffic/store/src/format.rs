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

use std::fmt::Write;

use procfs::COUNTER_FIELDS;
use procfs::CounterSet;
use procfs::NetDevMap;
use procfs::Snapshot;

/// First line of every state file. Bump the version whenever the layout of
/// the following lines changes; files with another header are discarded.
pub const STATE_FORMAT_HEADER: &str = "#iftraffic-state v1";

/// Serialize a snapshot:
///
/// ```text
/// #iftraffic-state v1
/// <uptime>
/// <name>\t<rx_bytes>\t<tx_bytes>\t<rx_packets>\t<tx_packets>\t<rx_errors>\t<tx_errors>\t<rx_drops>\t<tx_drops>
/// ```
pub fn encode(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "{}", STATE_FORMAT_HEADER);
    let _ = writeln!(out, "{}", snapshot.uptime);
    for (name, counters) in &snapshot.interfaces {
        out.push_str(name);
        for value in counters.to_array() {
            let _ = write!(out, "\t{}", value);
        }
        out.push('\n');
    }
    out
}

/// Parse the output of `encode`. The error is a short reason suitable for
/// logging.
pub fn decode(content: &str) -> Result<Snapshot, String> {
    let mut lines = content.lines();

    match lines.next() {
        Some(STATE_FORMAT_HEADER) => {}
        Some(other) => return Err(format!("unexpected header {:?}", other)),
        None => return Err("file is empty".into()),
    }

    let uptime = match lines.next() {
        Some(line) => line
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid uptime {:?}", line))?,
        None => return Err("file truncated before uptime".into()),
    };

    let mut interfaces = NetDevMap::new();
    for (idx, line) in lines.enumerate() {
        // Header and uptime come first
        let lineno = idx + 3;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != COUNTER_FIELDS + 1 {
            return Err(format!(
                "line {} has {} fields, expected {}",
                lineno,
                fields.len(),
                COUNTER_FIELDS + 1
            ));
        }
        let name = fields[0];
        if name.is_empty() {
            return Err(format!("line {} has no interface name", lineno));
        }
        let mut values = [0u64; COUNTER_FIELDS];
        for (value, field) in values.iter_mut().zip(&fields[1..]) {
            *value = field
                .parse::<u64>()
                .map_err(|_| format!("line {}: invalid counter {:?}", lineno, field))?;
        }
        if interfaces
            .insert(name.to_string(), CounterSet::from_array(values))
            .is_some()
        {
            return Err(format!("line {}: duplicate interface {}", lineno, name));
        }
    }

    Ok(Snapshot { uptime, interfaces })
}
