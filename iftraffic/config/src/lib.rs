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

#![deny(clippy::all)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use anyhow::bail;
use serde::Deserialize;
use serde::Serialize;


pub const IFTRAFFIC_DEFAULT_CONF: &str = "/etc/iftraffic/iftraffic.conf";
const IFTRAFFIC_DEFAULT_DATA_FILE: &str = "/var/tmp/traffic_stats.dat";

pub const DEFAULT_WARNING_PCT: u32 = 85;
pub const DEFAULT_CRITICAL_PCT: u32 = 98;
/// 1000 Mbit/s in bytes/s
pub const DEFAULT_BANDWIDTH: u64 = 131_072_000;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
// If value is missing during deserialization, use the Default::default()
#[serde(default)]
pub struct IftrafficConfig {
    /// Percentage of the bandwidth above which an interface is WARNING
    pub warning: u32,
    /// Percentage of the bandwidth above which an interface is CRITICAL
    pub critical: u32,
    /// Where the previous sample is kept between runs
    pub data_file: PathBuf,
    /// Bandwidth in bytes/s for interfaces whose link speed is unknown
    pub default_bandwidth: u64,
}

impl Default for IftrafficConfig {
    fn default() -> Self {
        IftrafficConfig {
            warning: DEFAULT_WARNING_PCT,
            critical: DEFAULT_CRITICAL_PCT,
            data_file: IFTRAFFIC_DEFAULT_DATA_FILE.into(),
            default_bandwidth: DEFAULT_BANDWIDTH,
        }
    }
}

impl IftrafficConfig {
    pub fn load(path: &Path) -> Result<Self> {
        match path.exists() {
            true if !path.is_file() => bail!("{} exists and is not a file", path.to_string_lossy()),
            true => IftrafficConfig::load_exists(path),
            false if path.to_string_lossy() == IFTRAFFIC_DEFAULT_CONF => Ok(Default::default()),
            false => bail!("No such file or directory: {}", path.to_string_lossy()),
        }
    }

    fn load_exists(path: &Path) -> Result<Self> {
        let string_config = match fs::read_to_string(path) {
            Ok(sc) => sc,
            Err(e) => {
                bail!(
                    "Failed to read from config file {}: {}",
                    path.to_string_lossy(),
                    e
                );
            }
        };

        let config: IftrafficConfig = match toml::from_str(string_config.as_str()) {
            Ok(ic) => ic,
            Err(e) => {
                bail!(
                    "Failed to parse config file {}: {}\n{}",
                    path.to_string_lossy(),
                    e,
                    string_config
                );
            }
        };

        if config.default_bandwidth == 0 {
            bail!(
                "default_bandwidth in {} must be greater than 0",
                path.to_string_lossy()
            );
        }
        Ok(config)
    }
}
