//! Core types and utilities shared across the scenekit crates.
//!
//! This crate provides the foundational pieces used everywhere else:
//! - Asset identifier types (`FullId`)
//! - The typed event bus used by loaders to report progress

pub mod events;
pub mod ids;

pub use events::EventBus;
pub use ids::{parse_level_room, FullId, IdError};
