// crates/at_physics/src/turbulence/mod.rs

//! 湍流扩散
//!
//! - [`similarity`]: 边界层相似理论扩散系数
//! - [`model`]: 带显式随机源的扰动模型

pub mod model;
pub mod similarity;

pub use model::{replica_numbers, source_seed, BoundaryLayer, TurbulenceModel};
pub use similarity::{horizontal_diffusivity, stability_function, vertical_diffusivity};
