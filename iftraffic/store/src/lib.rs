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

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use slog::debug;
use slog::warn;
use thiserror::Error;

use procfs::Snapshot;

mod format;
pub use format::decode;
pub use format::encode;
pub use format::STATE_FORMAT_HEADER;


// The state store holds exactly one snapshot: the one taken by the
// previous run. Every run reads it, then replaces it with its own sample.
//
// There is no locking. Two overlapping runs both read the same previous
// snapshot and the last writer wins.

/// A snapshot read back from the store, with the wall clock time it was
/// written at.
#[derive(Clone, PartialEq, Debug)]
pub struct StoredSnapshot {
    pub snapshot: Snapshot,
    pub saved_at: SystemTime,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No previous state at {0:?}")]
    NotFound(PathBuf),
    #[error("Incompatible state file {path:?}: {reason}")]
    Incompatible { path: PathBuf, reason: String },
    #[error("{1:?}: {0:?}")]
    IoError(PathBuf, #[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to write {0:?}: {1}")]
    IoError(PathBuf, #[source] std::io::Error),
}

pub trait StateStore {
    /// Human readable location of the state, used in problem reports.
    fn location(&self) -> String;

    fn load(&self) -> Result<StoredSnapshot, LoadError>;

    fn save(&self, snapshot: &Snapshot) -> Result<(), SaveError>;

    /// Remove the stored state. Removing state that does not exist is not
    /// an error.
    fn discard(&self) -> Result<(), SaveError>;
}

/// StateStore backed by a single text file.
#[derive(Debug)]
pub struct FileStore {
    logger: slog::Logger,
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(logger: slog::Logger, path: P) -> FileStore {
        FileStore {
            logger,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp: OsString = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn write_tmp(&self, tmp: &Path, content: &str) -> std::io::Result<()> {
        let mut file = fs::File::create(tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()
    }
}

impl StateStore for FileStore {
    fn location(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    fn load(&self) -> Result<StoredSnapshot, LoadError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoadError::NotFound(self.path.clone()));
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(LoadError::Incompatible {
                    path: self.path.clone(),
                    reason: "not valid UTF-8".into(),
                });
            }
            Err(e) => return Err(LoadError::IoError(self.path.clone(), e)),
        };
        let saved_at = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| LoadError::IoError(self.path.clone(), e))?;
        let snapshot = decode(&content).map_err(|reason| LoadError::Incompatible {
            path: self.path.clone(),
            reason,
        })?;

        debug!(
            self.logger,
            "Loaded {} interfaces at uptime {} from {}",
            snapshot.interfaces.len(),
            snapshot.uptime,
            self.path.display()
        );
        Ok(StoredSnapshot { snapshot, saved_at })
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), SaveError> {
        // Write aside and rename so a reader never sees a half written file
        let tmp = self.tmp_path();
        if let Err(e) = self.write_tmp(&tmp, &encode(snapshot)) {
            let _ = fs::remove_file(&tmp);
            return Err(SaveError::IoError(self.path.clone(), e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(SaveError::IoError(self.path.clone(), e));
        }

        debug!(
            self.logger,
            "Saved {} interfaces to {}",
            snapshot.interfaces.len(),
            self.path.display()
        );
        Ok(())
    }

    fn discard(&self) -> Result<(), SaveError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                warn!(self.logger, "Discarded state file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SaveError::IoError(self.path.clone(), e)),
        }
    }
}
