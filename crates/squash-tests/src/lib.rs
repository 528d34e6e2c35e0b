//! squash integration test support
//!
//! Shared fixtures for the cross-crate tests under `tests/`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Asset fixtures, counting algorithms and decoders used by the
/// integration tests.
pub mod test_utils;
