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

use std::path::PathBuf;
use std::process::exit;
use std::time::SystemTime;

use anyhow::Context;
use anyhow::Result;
use clap::ArgGroup;
use clap::Parser;
use regex::Regex;
use slog::error;

mod check;
#[cfg(test)]
mod test;

use check::CheckOptions;
use common::logutil;
use config::IftrafficConfig;
use ethtool::Ethtool;
use ethtool::LinkType;
use model::CounterWidth;
use model::DeviceFilter;
use model::Report;
use model::Thresholds;
use model::VlanRange;
use procfs::ProcReader;
use store::FileStore;

/// Exit code when no verdict could be reached at all.
const EXIT_FATAL: i32 = 4;

/// Report network interface traffic against link bandwidth.
#[derive(Debug, Parser)]
#[command(version, about)]
#[command(group(
    ArgGroup::new("selection").args(["interfaces", "exclude", "excludere", "vlanexclude"])
))]
struct Opt {
    /// Percentage of the bandwidth above which an interface is CRITICAL
    #[arg(short, long)]
    critical: Option<u32>,
    /// Percentage of the bandwidth above which an interface is WARNING
    #[arg(short, long)]
    warning: Option<u32>,
    /// Only check interfaces of these link types
    #[arg(short = 'l', long, num_args = 1..)]
    linktype: Vec<LinkType>,
    /// Bandwidth in bytes/s, disables link speed detection
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    bandwidth: Option<u64>,
    /// Where the previous sample is kept between runs
    #[arg(short = 'f', long)]
    data_file: Option<PathBuf>,
    /// Only check these interfaces
    #[arg(short, long, num_args = 1..)]
    interfaces: Vec<String>,
    /// Skip these interfaces
    #[arg(short = 'x', long, num_args = 1..)]
    exclude: Vec<String>,
    /// Skip interfaces whose name starts with a match of these regexes
    #[arg(short = 'X', long, num_args = 1.., value_parser = model::anchored_regex)]
    excludere: Vec<Regex>,
    /// Skip these VLANs, e.g. 10-20,42
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    vlanexclude: Vec<VlanRange>,
    #[arg(long, default_value = config::IFTRAFFIC_DEFAULT_CONF)]
    config: PathBuf,
    #[arg(short, long)]
    debug: bool,
}

impl Opt {
    fn check_options(&self, config: &IftrafficConfig) -> CheckOptions {
        CheckOptions {
            thresholds: Thresholds {
                warning_pct: self.warning.unwrap_or(config.warning),
                critical_pct: self.critical.unwrap_or(config.critical),
            },
            bandwidth: self.bandwidth,
            default_bandwidth: config.default_bandwidth,
            filter: DeviceFilter {
                exclude: self.exclude.clone(),
                exclude_regex: self.excludere.clone(),
                vlan_exclude: self.vlanexclude.clone(),
                link_types: self.linktype.clone(),
                include: self.interfaces.clone(),
            },
            width: CounterWidth::native(),
        }
    }

    fn data_file(&self, config: &IftrafficConfig) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| config.data_file.clone())
    }
}

fn run(logger: &slog::Logger, opts: &Opt) -> Result<Report> {
    let config = IftrafficConfig::load(&opts.config)?;
    let options = opts.check_options(&config);

    let current = ProcReader::new()
        .read_snapshot()
        .context("Failed to read interface counters")?;
    let store = FileStore::new(logger.clone(), opts.data_file(&config));
    let links = Ethtool::new().context("Failed to open a socket for link queries")?;

    check::run_check(
        logger,
        &options,
        current,
        &store,
        &links,
        SystemTime::now(),
    )
}

fn main() {
    let opts = Opt::parse();
    let logger = logutil::get_logger(opts.debug);

    let rc = match run(&logger, &opts) {
        Ok(report) => {
            println!("{}", report);
            report.exit_code()
        }
        Err(e) => {
            error!(logger, "{:#}", e);
            println!("TRAFFIC UNKNOWN: {:#}", e);
            EXIT_FATAL
        }
    };
    exit(rc);
}
