// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod maintenance;
pub mod operation;
pub mod query;
pub mod replay;
