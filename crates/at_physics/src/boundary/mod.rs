// crates/at_physics/src/boundary/mod.rs

//! 边界处理

pub mod handler;

pub use handler::{BoundaryHandler, BoundaryOutcome};
