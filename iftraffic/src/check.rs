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

use std::time::SystemTime;

use anyhow::Context;
use anyhow::Result;
use common::util::convert_rate;
use ethtool::LinkQueryable;
use model::CounterWidth;
use model::DeviceFilter;
use model::FilterError;
use model::InterfaceTraffic;
use model::Interval;
use model::RateSet;
use model::Report;
use model::Status;
use model::Thresholds;
use model::resolve_bandwidth;
use procfs::Snapshot;
use slog::debug;
use slog::error;
use slog::warn;
use store::LoadError;
use store::StateStore;
use store::StoredSnapshot;

pub const FIRST_RUN: &str = "First run.";
pub const FORMAT_UPGRADE: &str = "Data file upgrade, skipping this run.";
pub const SAMPLED_TOO_RECENTLY: &str = "Sampled too recently, skipping this run.";

#[derive(Clone, Debug)]
pub struct CheckOptions {
    pub thresholds: Thresholds,
    /// Capacity in bytes/s for every interface, skips link speed detection
    pub bandwidth: Option<u64>,
    pub default_bandwidth: u64,
    pub filter: DeviceFilter,
    pub width: CounterWidth,
}

/// Seconds from `saved_at` to `now`, negative if the clock went backwards.
fn elapsed_secs(saved_at: SystemTime, now: SystemTime) -> f64 {
    match now.duration_since(saved_at) {
        Ok(elapsed) => elapsed.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

fn load_previous<S: StateStore + ?Sized>(
    logger: &slog::Logger,
    store: &S,
    report: &mut Report,
) -> Result<Option<StoredSnapshot>> {
    match store.load() {
        Ok(stored) => Ok(Some(stored)),
        Err(LoadError::NotFound(path)) => {
            debug!(logger, "No previous sample at {}", path.display());
            report.add_problem(Status::Unknown, FIRST_RUN);
            Ok(None)
        }
        Err(e @ LoadError::Incompatible { .. }) => {
            warn!(logger, "{}", e);
            if let Err(e) = store.discard() {
                warn!(logger, "{:#}", e);
            }
            report.add_problem(Status::Unknown, FORMAT_UPGRADE);
            Ok(None)
        }
        Err(e) => Err(e).context("Failed to load the previous sample"),
    }
}

/// One check: compare `current` against the sample kept in `store`, then
/// keep `current` for the next run.
///
/// Recoverable conditions end up in the report. Only failures that leave
/// no verdict at all are returned as errors.
pub fn run_check<S: StateStore + ?Sized, L: LinkQueryable + ?Sized>(
    logger: &slog::Logger,
    options: &CheckOptions,
    current: Snapshot,
    store: &S,
    links: &L,
    now: SystemTime,
) -> Result<Report> {
    let mut report = Report::new();
    let previous = load_previous(logger, store, &mut report)?;

    if let Err(e) = store.save(&current) {
        error!(logger, "{:#}", e);
        report.add_problem(
            Status::Critical,
            format!("Cannot write in {}.", store.location()),
        );
    }

    let Snapshot { uptime, mut interfaces } = current;
    match options.filter.apply(links, &mut interfaces) {
        Ok(()) => {}
        Err(e @ FilterError::DeviceNotFound(_)) => {
            report.add_problem(Status::Critical, e.to_string());
        }
        Err(e) => return Err(e).context("Failed to select interfaces"),
    }

    let previous = match previous {
        Some(previous) => previous,
        None => return Ok(report),
    };
    if previous.snapshot.interfaces.is_empty() {
        debug!(logger, "Previous sample has no interfaces");
        report.add_problem(Status::Unknown, FIRST_RUN);
        return Ok(report);
    }

    let elapsed = elapsed_secs(previous.saved_at, now);
    let interval = match Interval::new(previous.snapshot.uptime, uptime, elapsed, options.width) {
        Ok(interval) => interval,
        Err(e) => {
            warn!(logger, "{}", e);
            report.add_problem(Status::Unknown, SAMPLED_TOO_RECENTLY);
            return Ok(report);
        }
    };

    for (name, counters) in &interfaces {
        let last = match previous.snapshot.interfaces.get(name) {
            Some(last) => last,
            None => {
                debug!(logger, "{} appeared since the previous sample", name);
                continue;
            }
        };
        let rates = RateSet::new(last, counters, &interval);
        let bandwidth = resolve_bandwidth(
            logger,
            links,
            name,
            options.bandwidth,
            options.default_bandwidth,
        )
        .with_context(|| format!("Failed to find the bandwidth of {}", name))?;
        debug!(
            logger,
            "{}: out {} in {} of {}",
            name,
            convert_rate(rates.tx_bytes_per_sec),
            convert_rate(rates.rx_bytes_per_sec),
            convert_rate(bandwidth as f64)
        );
        report.add_interface(&InterfaceTraffic::new(
            name,
            rates,
            bandwidth,
            options.thresholds,
        ));
    }
    Ok(report)
}
