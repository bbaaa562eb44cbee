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

//! Append-only record log
//!
//! One JSON document per frame, each frame checksummed with CRC32. A frame
//! left half-written by a crash is cut off on the next replay; frames with a
//! bad checksum are skipped.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::{StoreError, StoreResult};

const LOG_VERSION: u32 = 1;
const HEADER_LEN: u64 = 8;
const ENTRY_TYPE_DOCUMENT: u8 = 1;
/// type + len + crc
const FRAME_OVERHEAD: u64 = 1 + 4 + 4;

pub struct RecordLog {
    path: PathBuf,
    magic: [u8; 4],
}

impl RecordLog {
    /// Open an existing log or create an empty one
    pub fn open(path: impl AsRef<Path>, magic: [u8; 4]) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        if path.exists() {
            check_header(&path, magic)?;
        } else {
            write_header(&path, magic)?;
        }

        Ok(Self { path, magic })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every intact document in append order
    pub fn replay<T: DeserializeOwned>(&self) -> StoreResult<Vec<T>> {
        let file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        read_header(&mut reader, self.magic, &self.path)?;

        let mut records = Vec::new();
        let mut valid_len = HEADER_LEN;

        loop {
            let mut entry_type = [0u8; 1];
            if reader.read_exact(&mut entry_type).is_err() {
                break;
            }

            let mut len_bytes = [0u8; 4];
            if reader.read_exact(&mut len_bytes).is_err() {
                break;
            }
            let len = u32::from_le_bytes(len_bytes) as u64;
            if valid_len + FRAME_OVERHEAD + len > file_len {
                break;
            }

            let mut data = vec![0u8; len as usize];
            if reader.read_exact(&mut data).is_err() {
                break;
            }

            let mut crc_bytes = [0u8; 4];
            if reader.read_exact(&mut crc_bytes).is_err() {
                break;
            }
            valid_len += FRAME_OVERHEAD + len;

            if u32::from_le_bytes(crc_bytes) != crc32fast::hash(&data) {
                tracing::warn!(path = ?self.path, "CRC mismatch in record log, skipping entry");
                continue;
            }
            if entry_type[0] != ENTRY_TYPE_DOCUMENT {
                tracing::warn!(path = ?self.path, "Unknown entry type {} in record log", entry_type[0]);
                continue;
            }

            match serde_json::from_slice::<T>(&data) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(path = ?self.path, "Undecodable record skipped: {}", e),
            }
        }

        if valid_len < file_len {
            tracing::warn!(
                path = ?self.path,
                "Truncating {} bytes of incomplete frame",
                file_len - valid_len
            );
            OpenOptions::new()
                .write(true)
                .open(&self.path)?
                .set_len(valid_len)?;
        }

        Ok(records)
    }

    /// Append one document and sync it to disk.
    ///
    /// On failure the log is cut back to its previous length.
    pub fn append<T: Serialize>(&self, record: &T) -> StoreResult<()> {
        let data = serde_json::to_vec(record)?;
        let frame = encode_frame(&data);

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let start = file.metadata()?.len();

        if let Err(e) = file.write_all(&frame).and_then(|_| file.sync_data()) {
            if let Err(truncate_err) = file.set_len(start) {
                tracing::error!(
                    path = ?self.path,
                    "Failed to roll back partial append: {}",
                    truncate_err
                );
            }
            return Err(e.into());
        }

        Ok(())
    }

    /// Replace the log with an empty one in a single rename
    pub fn reset(&self) -> StoreResult<()> {
        let new_path = self.path.with_extension("log.new");
        write_header(&new_path, self.magic)?;
        std::fs::rename(&new_path, &self.path)?;
        Ok(())
    }
}

fn encode_frame(data: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(data.len() + FRAME_OVERHEAD as usize);
    frame.push(ENTRY_TYPE_DOCUMENT);
    frame.extend_from_slice(&(data.len() as u32).to_le_bytes());
    frame.extend_from_slice(data);
    frame.extend_from_slice(&crc32fast::hash(data).to_le_bytes());
    frame
}

fn write_header(path: &Path, magic: [u8; 4]) -> StoreResult<()> {
    let mut file = File::create(path)?;
    file.write_all(&magic)?;
    file.write_all(&LOG_VERSION.to_le_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Verify that `path` starts with a header this crate wrote
pub fn check_header(path: &Path, magic: [u8; 4]) -> StoreResult<()> {
    let mut reader = BufReader::new(File::open(path)?);
    read_header(&mut reader, magic, path)
}

fn read_header<R: Read>(reader: &mut R, magic: [u8; 4], path: &Path) -> StoreResult<()> {
    let mut found = [0u8; 4];
    reader
        .read_exact(&mut found)
        .map_err(|_| StoreError::Corrupt(format!("{}: missing header", path.display())))?;
    if found != magic {
        return Err(StoreError::Corrupt(format!(
            "{}: unexpected magic",
            path.display()
        )));
    }

    let mut version_bytes = [0u8; 4];
    reader
        .read_exact(&mut version_bytes)
        .map_err(|_| StoreError::Corrupt(format!("{}: missing version", path.display())))?;
    let version = u32::from_le_bytes(version_bytes);
    if version != LOG_VERSION {
        return Err(StoreError::Corrupt(format!(
            "{}: version {} (expected {})",
            path.display(),
            version,
            LOG_VERSION
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    const MAGIC: [u8; 4] = *b"TEST";

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        id: u32,
        name: String,
    }

    fn doc(id: u32) -> Doc {
        Doc {
            id,
            name: format!("doc-{}", id),
        }
    }

    #[test]
    fn test_append_and_replay() {
        let dir = TempDir::new().unwrap();
        let log = RecordLog::open(dir.path().join("docs.log"), MAGIC).unwrap();
        log.append(&doc(1)).unwrap();
        log.append(&doc(2)).unwrap();

        let reopened = RecordLog::open(dir.path().join("docs.log"), MAGIC).unwrap();
        let docs: Vec<Doc> = reopened.replay().unwrap();
        assert_eq!(docs, vec![doc(1), doc(2)]);
    }

    #[test]
    fn test_torn_tail_is_truncated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.log");
        let log = RecordLog::open(&path, MAGIC).unwrap();
        log.append(&doc(1)).unwrap();
        let intact_len = std::fs::metadata(&path).unwrap().len();

        // Half a frame, as left by a crash mid-write
        let frame = encode_frame(&serde_json::to_vec(&doc(2)).unwrap());
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&frame[..frame.len() / 2]).unwrap();
        drop(file);

        let docs: Vec<Doc> = log.replay().unwrap();
        assert_eq!(docs, vec![doc(1)]);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), intact_len);

        log.append(&doc(3)).unwrap();
        let docs: Vec<Doc> = log.replay().unwrap();
        assert_eq!(docs, vec![doc(1), doc(3)]);
    }

    #[test]
    fn test_crc_mismatch_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.log");
        let log = RecordLog::open(&path, MAGIC).unwrap();
        log.append(&doc(1)).unwrap();
        log.append(&doc(2)).unwrap();

        // Flip a payload byte inside the first frame
        let mut bytes = std::fs::read(&path).unwrap();
        let first_payload = (HEADER_LEN + 1 + 4) as usize;
        bytes[first_payload + 2] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();

        let docs: Vec<Doc> = log.replay().unwrap();
        assert_eq!(docs, vec![doc(2)]);
    }

    #[test]
    fn test_reset_empties_log() {
        let dir = TempDir::new().unwrap();
        let log = RecordLog::open(dir.path().join("docs.log"), MAGIC).unwrap();
        log.append(&doc(1)).unwrap();
        log.reset().unwrap();

        let docs: Vec<Doc> = log.replay().unwrap();
        assert!(docs.is_empty());
        assert!(!dir.path().join("docs.log.new").exists());
    }

    #[test]
    fn test_foreign_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.log");
        std::fs::write(&path, b"not a log at all").unwrap();

        assert!(matches!(
            RecordLog::open(&path, MAGIC),
            Err(StoreError::Corrupt(_))
        ));
    }
}
