//! trackforge Core - Foundation types for accessibility tracking
//!
//! This crate provides the fundamental abstractions shared by every
//! trackforge crate:
//! - The [`AccessibilityLevel`] lattice and its `min`/`max` reducers
//! - Identifiers for items, dungeons, settings and sequence breaks
//! - The read-only [`TrackerState`] interface and [`StateChange`] notifications
//! - The [`TrackerError`] taxonomy

pub mod domain;
pub mod error;
pub mod level;
pub mod state;

pub use domain::{DungeonId, ItemId, SequenceBreakId, Setting};
pub use error::{Result, TrackerError};
pub use level::{AccessibilityLevel, LevelParseError};
pub use state::{StateChange, TrackerState};
