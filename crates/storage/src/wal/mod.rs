// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-Ahead Log (WAL) module
//!
//! The log file is the source of truth; the in-memory index is derived by
//! replaying it.
//!
//! ## Architecture
//!
//! ```text
//! Record → WalEntry → WalWriter → disk (oplog.jsonl)
//!                                      ↓
//!                            WalReader → replay → OperationIndex
//! ```
//!
//! ## Durability Guarantees
//!
//! - Every append is followed by `fsync()` before returning
//! - Checksums detect corruption from bit flips
//! - Truncated writes (crash during append) are detected on read

pub mod entry;
pub mod reader;
pub mod record;
pub mod writer;

pub use entry::WalEntry;
pub use reader::{WalCorruption, WalEntryIter, WalReadError, WalReader, WalValidation};
pub use record::{Record, SCHEMA_VERSION};
pub use writer::WalWriter;
