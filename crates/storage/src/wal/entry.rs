// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL entry structure with checksum verification
//!
//! Each line of the log is one entry: a sequence number, the wall-clock time
//! it was written, the writing machine, the record, and a CRC32 of the
//! serialized record.

use super::record::Record;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single entry in the write-ahead log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Monotonically increasing sequence number
    pub sequence: u64,
    /// Microseconds since Unix epoch
    pub timestamp_micros: i64,
    /// Identifier of the process instance that wrote the entry
    pub machine_id: String,
    pub record: Record,
    /// CRC32 checksum of the serialized record
    pub checksum: u32,
}

impl WalEntry {
    /// Create a new entry stamped with the current time
    pub fn new(sequence: u64, machine_id: &str, record: Record) -> Self {
        Self::new_with_timestamp(sequence, Utc::now().timestamp_micros(), machine_id, record)
    }

    /// Create a new entry with a specific timestamp
    pub fn new_with_timestamp(
        sequence: u64,
        timestamp_micros: i64,
        machine_id: &str,
        record: Record,
    ) -> Self {
        let checksum = Self::calculate_checksum(&record);
        Self {
            sequence,
            timestamp_micros,
            machine_id: machine_id.to_string(),
            record,
            checksum,
        }
    }

    fn calculate_checksum(record: &Record) -> u32 {
        // Records hold only strings, integers, timestamps and JSON values, all of
        // which serialize infallibly.
        let json = serde_json::to_string(record).unwrap_or_default();
        crc32fast::hash(json.as_bytes())
    }

    /// Verify the checksum matches the record
    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(&self.record)
    }

    /// Serialize to a single line of JSON (no trailing newline)
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a single line of JSON
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
