//! # Survival Common
//!
//! Common types shared by the Tiny Survival World crates:
//! - Coordinate types (world, chunk, local) and their conversions
//! - Canonical chunk keys
//! - Common error types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
}

pub use prelude::*;
