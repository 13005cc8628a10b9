//! Test harnesses for restroute.
//!
//! Exposes the shared fixture directory and hosts the CLI regression
//! tests for the `restroute` binary.

use std::path::PathBuf;

#[cfg(test)]
pub mod cli;

/// Absolute path to the shared test fixtures directory.
pub fn fixtures() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/restroute-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
}
