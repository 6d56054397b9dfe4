// crates/at_physics/src/vertical/mod.rs

//! 垂直运动
//!
//! - [`motion`]: 垂直运动模式与解析器
//! - [`gradient`]: 模式计算所需的标量场偏导数

pub mod gradient;
pub mod motion;

pub use motion::{
    DataVelocity, Damped, DensityFollowing, Isentropic, Isobaric, LatitudeAuto, SpatialAverage,
    VerticalMotion, VerticalMotionResolver,
};
