//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of maildir-mbox.
//
// maildir-mbox is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// maildir-mbox is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along with
// maildir-mbox. If not, see <http://www.gnu.org/licenses/>.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::Error;
use crate::progress::ProgressMode;

pub const DEFAULT_TICK: usize = 200;
pub const DEFAULT_FLUSH_INTERVAL: usize = 200;

/// Settings for one conversion run.
///
/// Populated once at startup from the optional configuration file, then
/// overridden by anything given on the command line.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// The root of the Maildir tree to convert.
    pub source: Option<PathBuf>,
    /// The directory which receives the `.mbox` files. Created if it does
    /// not exist.
    pub destination: Option<PathBuf>,
    /// How progress is reported on standard output.
    pub progress: ProgressConfig,
    /// Options for the archives being written.
    pub archive: ArchiveConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// If true, print one line for every message processed.
    pub per_message: bool,
    /// When not in per-message mode, print a progress line every this many
    /// messages within a folder. 0 disables periodic lines.
    pub tick: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        ProgressConfig {
            per_message: false,
            tick: DEFAULT_TICK,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Flush the archive to stable storage after this many messages.
    pub flush_interval: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        ArchiveConfig {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl ConvertConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = fs::read(path)?;
        Ok(toml::from_slice(&data)?)
    }

    pub fn progress_mode(&self) -> ProgressMode {
        if self.progress.per_message {
            ProgressMode::PerMessage
        } else {
            ProgressMode::Periodic(self.progress.tick)
        }
    }

    pub fn flush_interval(&self) -> usize {
        self.archive.flush_interval.max(1)
    }
}
