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

//! Selection of the interfaces a run reports on.

use std::str::FromStr;

use ethtool::EthtoolError;
use ethtool::LinkQueryable;
use ethtool::LinkType;
use procfs::NetDevMap;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Device {0} not found.")]
    DeviceNotFound(String),
    #[error("Failed to query link type of {interface}")]
    LinkQuery {
        interface: String,
        #[source]
        source: EthtoolError,
    },
}

/// An inclusive range of VLAN ids, written `a-b` or `a`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VlanRange {
    pub start: u32,
    pub end: u32,
}

impl VlanRange {
    pub fn contains(&self, vlan: u32) -> bool {
        self.start <= vlan && vlan <= self.end
    }
}

impl FromStr for VlanRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid VLAN id {:?}: {}", v, e))
        };
        match s.split_once('-') {
            Some((start, end)) => Ok(VlanRange {
                start: parse(start)?,
                end: parse(end)?,
            }),
            None => {
                let vlan = parse(s)?;
                Ok(VlanRange {
                    start: vlan,
                    end: vlan,
                })
            }
        }
    }
}

/// Compile a device name pattern so that it only matches at the start of
/// the name.
pub fn anchored_regex(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})", pattern))
}

pub fn exclude_devices(exclude: &[String], interfaces: &mut NetDevMap) {
    for name in exclude {
        interfaces.remove(name);
    }
}

pub fn exclude_devices_regex(exclude: &[Regex], interfaces: &mut NetDevMap) {
    interfaces.retain(|name, _| !exclude.iter().any(|re| re.is_match(name)));
}

/// VLAN id of a `base.vlan` device name.
fn vlan_id(name: &str) -> Option<u32> {
    name.split_once('.')
        .and_then(|(_, vlan)| vlan.parse::<u32>().ok())
}

pub fn exclude_vlans(ranges: &[VlanRange], interfaces: &mut NetDevMap) {
    interfaces.retain(|name, _| match vlan_id(name) {
        Some(vlan) => !ranges.iter().any(|r| r.contains(vlan)),
        None => true,
    });
}

pub fn filter_link_types<L: LinkQueryable + ?Sized>(
    link_types: &[LinkType],
    links: &L,
    interfaces: &mut NetDevMap,
) -> Result<(), FilterError> {
    let mut rejected = Vec::new();
    for name in interfaces.keys() {
        let link_type = links
            .link_type(name)
            .map_err(|source| FilterError::LinkQuery {
                interface: name.clone(),
                source,
            })?;
        if !link_types.contains(&link_type) {
            rejected.push(name.clone());
        }
    }
    for name in rejected {
        interfaces.remove(&name);
    }
    Ok(())
}

/// Keep only the listed devices. Every one of them must exist, otherwise
/// nothing is kept.
pub fn include_devices(include: &[String], interfaces: &mut NetDevMap) -> Result<(), FilterError> {
    if let Some(missing) = include.iter().find(|name| !interfaces.contains_key(*name)) {
        interfaces.clear();
        return Err(FilterError::DeviceNotFound(missing.clone()));
    }
    interfaces.retain(|name, _| include.contains(name));
    Ok(())
}

/// The full selection pipeline. Empty lists are no-ops.
#[derive(Clone, Debug, Default)]
pub struct DeviceFilter {
    pub exclude: Vec<String>,
    pub exclude_regex: Vec<Regex>,
    pub vlan_exclude: Vec<VlanRange>,
    pub link_types: Vec<LinkType>,
    pub include: Vec<String>,
}

impl DeviceFilter {
    pub fn apply<L: LinkQueryable + ?Sized>(
        &self,
        links: &L,
        interfaces: &mut NetDevMap,
    ) -> Result<(), FilterError> {
        exclude_devices(&self.exclude, interfaces);
        exclude_devices_regex(&self.exclude_regex, interfaces);
        exclude_vlans(&self.vlan_exclude, interfaces);
        if !self.link_types.is_empty() {
            filter_link_types(&self.link_types, links, interfaces)?;
        }
        if !self.include.is_empty() {
            include_devices(&self.include, interfaces)?;
        }
        Ok(())
    }
}
