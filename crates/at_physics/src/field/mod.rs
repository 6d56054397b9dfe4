// crates/at_physics/src/field/mod.rs

//! 气象场
//!
//! 四维结构网格上的风场与标量场，以及四线性插值器。
//!
//! 所有三维数据按 `[time, level, lat, lon]` 展平存储，地面二维数据按
//! `[time, lat, lon]` 展平存储。气象场构造后只读，由各组件共享引用。

pub mod grid;
pub mod interpolation;

pub use grid::{Axis, GriddedField, VerticalCoordinateKind};
pub use interpolation::{AxisBracket, Interpolator, SpatialStencil};

/// 标量场与地面场名称
pub mod names {
    /// 气温 [K]
    pub const TEMPERATURE: &str = "temperature";
    /// 空气密度 [kg/m³]
    pub const DENSITY: &str = "density";
    /// 位温 [K]
    pub const POTENTIAL_TEMPERATURE: &str = "potential_temperature";
    /// 非绝热加热率 [K/s]
    pub const DIABATIC_HEATING: &str = "diabatic_heating";

    /// 地形高度 [m]（地面场）
    pub const TERRAIN_HEIGHT: &str = "terrain_height";
    /// 摩擦速度 [m/s]（地面场）
    pub const FRICTION_VELOCITY: &str = "friction_velocity";
    /// Obukhov 长度 [m]（地面场）
    pub const OBUKHOV_LENGTH: &str = "obukhov_length";
    /// 混合层高度 [m]（地面场）
    pub const MIXING_HEIGHT: &str = "mixing_height";
}
