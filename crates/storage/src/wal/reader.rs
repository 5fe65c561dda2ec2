// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL reader for iterating and validating entries
//!
//! Iteration stops being useful at the first invalid entry (parse error or
//! checksum mismatch): everything after a torn write is untrusted.

use super::entry::WalEntry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when reading WAL entries
#[derive(Debug, Error)]
pub enum WalReadError {
    #[error("corrupted entry at line {line}: {reason}")]
    Corrupted { line: u64, reason: String },
    #[error("checksum mismatch at line {line}")]
    ChecksumMismatch { line: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// WAL reader for iterating over entries
pub struct WalReader {
    path: PathBuf,
}

impl WalReader {
    /// Create a reader; a missing file reads as an empty log
    pub fn open_or_empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Iterate over entries in file order
    pub fn entries(&self) -> Result<WalEntryIter, WalReadError> {
        WalEntryIter::new(&self.path)
    }

    /// Last valid sequence number before any corruption
    pub fn last_sequence(&self) -> Result<Option<u64>, WalReadError> {
        Ok(self
            .entries()?
            .map_while(Result::ok)
            .last()
            .map(|entry| entry.sequence))
    }

    /// Scan the whole file and report where (if anywhere) it stops being valid
    pub fn validate(&self) -> Result<WalValidation, WalReadError> {
        let mut iter = self.entries()?;
        let mut valid_entries = 0u64;
        let mut last_valid_sequence = None;
        let mut corruption = None;

        for result in iter.by_ref() {
            match result {
                Ok(entry) => {
                    valid_entries += 1;
                    last_valid_sequence = Some(entry.sequence);
                }
                Err(WalReadError::Corrupted { line, reason }) => {
                    corruption = Some(WalCorruption { line, reason });
                    break;
                }
                Err(WalReadError::ChecksumMismatch { line }) => {
                    corruption = Some(WalCorruption {
                        line,
                        reason: "checksum mismatch".to_string(),
                    });
                    break;
                }
                Err(WalReadError::Io(e)) => return Err(WalReadError::Io(e)),
            }
        }

        Ok(WalValidation {
            valid_entries,
            last_valid_sequence,
            last_valid_position: iter.last_valid_position(),
            corruption,
        })
    }
}

/// Iterator over WAL entries with byte-position tracking
pub struct WalEntryIter {
    reader: Option<BufReader<File>>,
    line_number: u64,
    position: u64,
    last_valid_position: u64,
}

impl WalEntryIter {
    fn new(path: &Path) -> Result<Self, WalReadError> {
        let reader = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            reader,
            line_number: 0,
            position: 0,
            last_valid_position: 0,
        })
    }

    /// Byte offset just past the last valid entry returned
    pub fn last_valid_position(&self) -> u64 {
        self.last_valid_position
    }
}

impl Iterator for WalEntryIter {
    type Item = Result<WalEntry, WalReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        loop {
            let mut line = String::new();
            let bytes_read = match reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(n) => n as u64,
                Err(e) => return Some(Err(WalReadError::Io(e))),
            };
            self.line_number += 1;
            self.position += bytes_read;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            // A line without its newline is a torn write, even if it happens to parse
            if !line.ends_with('\n') {
                return Some(Err(WalReadError::Corrupted {
                    line: self.line_number,
                    reason: "unterminated entry".to_string(),
                }));
            }

            let entry = match WalEntry::from_line(trimmed) {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(WalReadError::Corrupted {
                        line: self.line_number,
                        reason: e.to_string(),
                    }));
                }
            };

            if !entry.verify() {
                return Some(Err(WalReadError::ChecksumMismatch {
                    line: self.line_number,
                }));
            }

            self.last_valid_position = self.position;
            return Some(Ok(entry));
        }
    }
}

/// Validation result for a WAL file
#[derive(Debug)]
pub struct WalValidation {
    pub valid_entries: u64,
    pub last_valid_sequence: Option<u64>,
    /// Byte offset just past the last valid entry
    pub last_valid_position: u64,
    pub corruption: Option<WalCorruption>,
}

/// Information about corruption found in a WAL file
#[derive(Debug)]
pub struct WalCorruption {
    pub line: u64,
    pub reason: String,
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
