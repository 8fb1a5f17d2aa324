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
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

mod types;
pub use types::*;


pub const PROCFS_ROOT: &str = "/proc";

/// Number of value columns per interface in /proc/net/dev
const NET_DEV_COLUMNS: usize = 16;

/// Header lines at the top of /proc/net/dev
const NET_DEV_HEADER_LINES: usize = 2;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid file format: {0:?}")]
    InvalidFileFormat(PathBuf),
    #[error("{1:?}: {0:?}")]
    IoError(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse {item} as {type_name} in line: {line} from {path:?}")]
    ParseError {
        line: String,
        item: String,
        type_name: String,
        path: PathBuf,
    },
    #[error("Unexpected line ({1}) in file: {0:?}")]
    UnexpectedLine(PathBuf, String),
}

pub type Result<T> = std::result::Result<T, Error>;

macro_rules! parse_item {
    // Parse rhs (an option, usually from an iterator) into type $t or
    // report a parse error on $line otherwise
    // Returns a Result<Option<$t>>
    ($path:expr, $rhs:expr, $t:tt, $line:ident) => {
        if let Some(s) = $rhs {
            s.parse::<$t>()
                .map_err(|_| Error::ParseError {
                    line: $line.to_string(),
                    item: s.to_string(),
                    type_name: stringify!($t).to_string(),
                    path: $path.to_path_buf(),
                })
                .map(|v| Some(v))
        } else {
            Ok(None)
        }
    };
}

pub struct ProcReader {
    path: PathBuf,
}

impl Default for ProcReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcReader {
    pub fn new() -> ProcReader {
        ProcReader {
            path: Path::new(PROCFS_ROOT).to_path_buf(),
        }
    }

    pub fn new_with_custom_procfs(path: PathBuf) -> ProcReader {
        ProcReader { path }
    }

    /// Seconds since boot, with the sub-second part kept.
    pub fn read_uptime(&self) -> Result<f64> {
        let path = self.path.join("uptime");
        let file = File::open(&path).map_err(|e| Error::IoError(path.clone(), e))?;
        let mut buf_reader = BufReader::new(file);
        let mut line = String::new();
        buf_reader
            .read_line(&mut line)
            .map_err(|e| Error::IoError(path.clone(), e))?;

        let mut items = line.split_whitespace();

        match parse_item!(path, items.next(), f64, line) {
            Ok(Some(uptime)) => Ok(uptime),
            Ok(None) => Err(Error::InvalidFileFormat(path)),
            Err(e) => Err(e),
        }
    }

    fn process_net_dev_line(path: &Path, line: &str) -> Result<(String, CounterSet)> {
        // Format is like
        // "  eth0: 1000 10 0 0 0 0 0 0 500 5 0 0 0 0 0 0"
        let (name, values) = line
            .split_once(':')
            .ok_or_else(|| Error::UnexpectedLine(path.to_path_buf(), line.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::UnexpectedLine(path.to_path_buf(), line.to_string()));
        }

        let mut items = values.split_whitespace();
        let mut columns = [0u64; NET_DEV_COLUMNS];
        for column in columns.iter_mut() {
            *column = parse_item!(path, items.next(), u64, line)?
                .ok_or_else(|| Error::UnexpectedLine(path.to_path_buf(), line.to_string()))?;
        }

        Ok((name.to_string(), CounterSet::from_net_dev_columns(&columns)))
    }

    pub fn read_net_dev(&self) -> Result<NetDevMap> {
        let path = self.path.join("net/dev");
        let file = File::open(&path).map_err(|e| Error::IoError(path.clone(), e))?;
        let buf_reader = BufReader::new(file);
        let mut net_dev: NetDevMap = Default::default();

        for line in buf_reader.lines().skip(NET_DEV_HEADER_LINES) {
            let line = line.map_err(|e| Error::IoError(path.clone(), e))?;
            if line.trim().is_empty() {
                continue;
            }
            let (name, counters) = Self::process_net_dev_line(&path, &line)?;
            if net_dev.insert(name, counters).is_some() {
                return Err(Error::UnexpectedLine(path, line));
            }
        }

        if net_dev.is_empty() {
            Err(Error::InvalidFileFormat(path))
        } else {
            Ok(net_dev)
        }
    }

    /// Capture the current counters together with the uptime they were
    /// read at.
    pub fn read_snapshot(&self) -> Result<Snapshot> {
        let uptime = self.read_uptime()?;
        let interfaces = self.read_net_dev()?;
        Ok(Snapshot { uptime, interfaces })
    }
}
