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

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

use ethtool::Errno;
use ethtool::EthtoolError;
use ethtool::LinkQueryable;
use ethtool::LinkType;
use procfs::CounterSet;
use procfs::Snapshot;
use store::LoadError;
use store::SaveError;
use store::StateStore;
use store::StoredSnapshot;


const FAKE_LOCATION: &str = "/fake/traffic_stats.dat";

enum FakeState {
    Missing,
    Incompatible,
    Broken,
    Stored(StoredSnapshot),
}

/// In memory stand-in for the state file.
struct FakeStore {
    state: FakeState,
    read_only: bool,
    saved: RefCell<Vec<Snapshot>>,
    discarded: Cell<bool>,
}

impl FakeStore {
    fn new(state: FakeState) -> FakeStore {
        FakeStore {
            state,
            read_only: false,
            saved: RefCell::new(Vec::new()),
            discarded: Cell::new(false),
        }
    }

    fn with_previous(snapshot: Snapshot, saved_at: SystemTime) -> FakeStore {
        FakeStore::new(FakeState::Stored(StoredSnapshot { snapshot, saved_at }))
    }
}

impl StateStore for FakeStore {
    fn location(&self) -> String {
        FAKE_LOCATION.to_string()
    }

    fn load(&self) -> Result<StoredSnapshot, LoadError> {
        let path = PathBuf::from(FAKE_LOCATION);
        match &self.state {
            FakeState::Missing => Err(LoadError::NotFound(path)),
            FakeState::Incompatible => Err(LoadError::Incompatible {
                path,
                reason: "Missing header".into(),
            }),
            FakeState::Broken => Err(LoadError::IoError(
                path,
                io::Error::from(io::ErrorKind::PermissionDenied),
            )),
            FakeState::Stored(stored) => Ok(stored.clone()),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), SaveError> {
        if self.read_only {
            return Err(SaveError::IoError(
                PathBuf::from(FAKE_LOCATION),
                io::Error::from(io::ErrorKind::PermissionDenied),
            ));
        }
        self.saved.borrow_mut().push(snapshot.clone());
        Ok(())
    }

    fn discard(&self) -> Result<(), SaveError> {
        self.discarded.set(true);
        Ok(())
    }
}

/// Every known interface is ethernet with the given speed in Mbit/s.
struct FakeLinks {
    speeds: BTreeMap<String, u32>,
}

impl FakeLinks {
    fn new(speeds: &[(&str, u32)]) -> FakeLinks {
        FakeLinks {
            speeds: speeds
                .iter()
                .map(|(name, speed)| (name.to_string(), *speed))
                .collect(),
        }
    }

    fn speed(&self, if_name: &str) -> Result<u32, EthtoolError> {
        self.speeds
            .get(if_name)
            .copied()
            .ok_or(EthtoolError::HwAddrReadError(Errno::ENODEV))
    }
}

impl LinkQueryable for FakeLinks {
    fn link_type(&self, if_name: &str) -> Result<LinkType, EthtoolError> {
        self.speed(if_name).map(|_| LinkType::Ethernet)
    }

    fn driver(&self, if_name: &str) -> Result<String, EthtoolError> {
        self.speed(if_name).map(|_| "e1000e".to_string())
    }

    fn link_speed(&self, if_name: &str) -> Result<u32, EthtoolError> {
        self.speed(if_name)
    }
}

fn counters(rx_bytes: u64, tx_bytes: u64) -> CounterSet {
    CounterSet {
        rx_bytes,
        tx_bytes,
        ..Default::default()
    }
}

fn snapshot(uptime: f64, interfaces: BTreeMap<&str, CounterSet>) -> Snapshot {
    Snapshot {
        uptime,
        interfaces: interfaces
            .into_iter()
            .map(|(name, counters)| (name.to_string(), counters))
            .collect(),
    }
}

fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}
