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

use slog::Drain;
use slog::Level;

/// Level used when the plugin is not started with `--debug`.
pub const DEFAULT_LEVEL: Level = Level::Warning;

pub fn level_for(debug: bool) -> Level {
    if debug { Level::Debug } else { DEFAULT_LEVEL }
}

/// Build the root logger. Everything goes to stderr; stdout carries the
/// plugin line only.
pub fn get_logger(debug: bool) -> slog::Logger {
    let plain = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let drain = slog_term::FullFormat::new(plain).build().fuse();
    let drain = slog::LevelFilter::new(drain, level_for(debug)).fuse();
    slog::Logger::root(drain, slog::o!())
}

/// Logger that drops every record. Used by tests and library callers that
/// do not care about diagnostics.
pub fn get_discard_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}
