//! # Survival Gameplay
//!
//! Gameplay systems for Tiny Survival World.
//!
//! This crate provides:
//! - A continuous game clock derived from the wall clock
//! - Time-of-day periods and change notifications
//! - Seasonal daylight and ambient light intensity

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod time;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::time::{TimeManager, TimeOfDay, TimeTransition};
}

pub use prelude::*;
