// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Orchestration of one sync run.
//!
//! [`SyncRunner`] queries the directory, scans the profile directory,
//! reconciles the two and dispatches provisioning and revocation through
//! a bounded worker pool.

pub mod cancel;
pub mod error;
mod pool;
pub mod report;
pub mod runner;

pub use cancel::CancellationToken;
pub use error::{Result, RunError};
pub use report::{ExitStatus, NullReporter, RunReport, RunSummary, SyncReporter};
pub use runner::{RunSettings, SyncRunner};
