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

use common::util::mbit_to_bytes;
use ethtool::EthtoolError;
use ethtool::LinkQueryable;
use ethtool::LinkType;
use slog::debug;

/// The tap driver reports a bogus 10 Mbit link.
pub const TUN_DRIVER: &str = "tun";

/// Capacity in bytes/s to compare the rates of `if_name` against.
///
/// An explicit `bandwidth` wins. Ethernet devices report their negotiated
/// speed, except tap devices and virtual devices that have no speed to
/// report, which fall back to `default` like every other link type.
pub fn resolve_bandwidth<L: LinkQueryable + ?Sized>(
    logger: &slog::Logger,
    links: &L,
    if_name: &str,
    bandwidth: Option<u64>,
    default: u64,
) -> Result<u64, EthtoolError> {
    if let Some(bandwidth) = bandwidth {
        return Ok(bandwidth);
    }

    let link_type = links.link_type(if_name)?;
    if link_type != LinkType::Ethernet {
        debug!(logger, "{}: {} link, using default bandwidth", if_name, link_type);
        return Ok(default);
    }

    let driver = match links.driver(if_name) {
        Ok(driver) => driver,
        Err(e) => {
            debug!(logger, "{}: {}", if_name, e);
            "unknown".to_string()
        }
    };
    if driver == TUN_DRIVER {
        debug!(logger, "{}: tun driver, using default bandwidth", if_name);
        return Ok(default);
    }

    match links.link_speed(if_name) {
        Ok(mbit) => Ok(mbit_to_bytes(mbit as u64)),
        Err(e) if e.is_unsupported() => {
            debug!(logger, "{}: {}, using default bandwidth", if_name, e);
            Ok(default)
        }
        Err(e) => Err(e),
    }
}
