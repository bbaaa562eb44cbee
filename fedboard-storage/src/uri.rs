// Copyright 2025 Fedboard Contributors
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

//! Store location URIs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::log::check_header;
use crate::{StoreError, StoreResult};

pub const ROUNDS_LOG_FILE: &str = "training_rounds.log";
pub const PERFORMANCE_LOG_FILE: &str = "performance.log";

pub(crate) const ROUNDS_MAGIC: [u8; 4] = *b"FBRD";
pub(crate) const PERFORMANCE_MAGIC: [u8; 4] = *b"FBPS";

/// Where a store lives.
///
/// `memory://` keeps everything in process; `file://<dir>` keeps one log per
/// collection inside `<dir>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUri {
    Memory,
    File(PathBuf),
}

impl StoreUri {
    /// Check that the location is usable without opening or creating anything.
    ///
    /// A file store must point at an existing directory, and any log already
    /// present must carry a valid header.
    pub fn probe(&self) -> StoreResult<()> {
        let dir = match self {
            StoreUri::Memory => return Ok(()),
            StoreUri::File(dir) => dir,
        };

        if !dir.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        for (file, magic) in [
            (ROUNDS_LOG_FILE, ROUNDS_MAGIC),
            (PERFORMANCE_LOG_FILE, PERFORMANCE_MAGIC),
        ] {
            let path = dir.join(file);
            if path.exists() {
                check_header(&path, magic)?;
            }
        }
        Ok(())
    }
}

impl FromStr for StoreUri {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("memory://") {
            if !rest.is_empty() {
                return Err(StoreError::InvalidUri(format!(
                    "memory:// takes no path: {}",
                    s
                )));
            }
            return Ok(StoreUri::Memory);
        }
        if let Some(path) = s.strip_prefix("file://") {
            if path.is_empty() {
                return Err(StoreError::InvalidUri("file:// requires a path".into()));
            }
            return Ok(StoreUri::File(PathBuf::from(path)));
        }

        match s.split_once("://") {
            Some((scheme, _)) => Err(StoreError::InvalidUri(format!(
                "unsupported scheme: {}",
                scheme
            ))),
            None => Err(StoreError::InvalidUri(format!("missing scheme: {}", s))),
        }
    }
}

impl fmt::Display for StoreUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreUri::Memory => write!(f, "memory://"),
            StoreUri::File(dir) => write!(f, "file://{}", dir.display()),
        }
    }
}
