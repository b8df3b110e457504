//! Shared test utilities for facetry integration tests.
//!
//! This module provides:
//! - `TestHarness` with a scratch database, an imported catalog and seeded prompts
//! - Builders for configs and raw generator rows

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
