//! Prelude module for retail_calendar crate.
//!
//! Re-exports the derive macros used across the crate.

pub use derive_more::Display;
