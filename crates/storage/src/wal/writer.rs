// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL writer for durable append operations
//!
//! Every append is fsync'd before it returns, so a record the caller has been
//! told about survives a crash.

use super::entry::WalEntry;
use super::reader::WalReader;
use super::record::Record;
use crate::store::StoreError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// WAL writer for durable append operations
pub struct WalWriter {
    file: File,
    next_sequence: u64,
    machine_id: String,
}

impl WalWriter {
    /// Open or create a WAL file
    ///
    /// If the file exists, scans it to find the next sequence number.
    pub fn open(path: &Path, machine_id: &str) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let next_sequence = WalReader::open_or_empty(path)
            .last_sequence()?
            .map(|s| s + 1)
            .unwrap_or(0);

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file,
            next_sequence,
            machine_id: machine_id.to_string(),
        })
    }

    /// Append a record, returning its sequence number once it is on disk
    pub fn append(&mut self, record: Record) -> Result<u64, StoreError> {
        let sequence = self.next_sequence;
        let entry = WalEntry::new(sequence, &self.machine_id, record);
        self.write_entry(&entry)?;
        self.next_sequence += 1;
        Ok(sequence)
    }

    /// Append many records with a single fsync at the end
    ///
    /// Returns the sequence number the next append will receive.
    pub fn append_all<I>(&mut self, records: I) -> Result<u64, StoreError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut buf = String::new();
        let mut sequence = self.next_sequence;
        for record in records {
            let entry = WalEntry::new(sequence, &self.machine_id, record);
            buf.push_str(&entry.to_line()?);
            buf.push('\n');
            sequence += 1;
        }

        self.file.write_all(buf.as_bytes())?;
        self.file.sync_all()?;

        self.next_sequence = sequence;
        Ok(sequence)
    }

    fn write_entry(&mut self, entry: &WalEntry) -> Result<(), StoreError> {
        let mut line = entry.to_line()?;
        line.push('\n');

        // Single write so a crash leaves at most one torn line at the tail
        self.file.write_all(line.as_bytes())?;
        self.file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
