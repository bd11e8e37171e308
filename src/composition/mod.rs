//! # Composition Engine
//!
//! Sequences extraction, duration normalization and row composition for one
//! configured run.

pub mod engine;

pub use engine::TriptychEngine;
