//! Shared test fixtures for trackforge crates.
//!
//! This crate only depends on `trackforge-core`, so every other crate can
//! take it as a dev-dependency without creating a cycle.
//!
//! - [`state`] - An in-memory [`TrackerState`](trackforge_core::TrackerState)
//! - [`ids`] - Well-known item, dungeon and trick identifiers used in fixtures
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! trackforge-test = { workspace = true }
//! ```
//!
//! ```ignore
//! use trackforge_test::{ids, MemoryState};
//! ```

pub mod ids;
pub mod state;

pub use state::MemoryState;
