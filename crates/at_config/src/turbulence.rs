// crates/at_config/src/turbulence.rs

//! 湍流扩散参数
//!
//! 边界层相似理论参数（摩擦速度、Obukhov 长度、混合层高度）在气象场
//! 未提供对应地面场时作为常数使用。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 湍流配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbulenceConfig {
    /// 是否启用随机扰动
    #[serde(default)]
    pub enabled: bool,

    /// 随机数种子
    #[serde(default)]
    pub seed: u64,

    /// 背景垂直扩散系数 [m²/s]
    #[serde(default = "default_kz_background")]
    pub kz_background: f64,

    /// 摩擦速度 u* [m/s]
    #[serde(default = "default_friction_velocity")]
    pub friction_velocity: f64,

    /// Obukhov 长度 L [m]（负值不稳定，正值稳定）
    #[serde(default = "default_obukhov_length")]
    pub obukhov_length: f64,

    /// 混合层高度 [m]
    #[serde(default = "default_mixing_height")]
    pub mixing_height: f64,

    /// 水平扩散系数 Kh = c·dx^(4/3) 中的 c [m^(2/3)/s]
    #[serde(default = "default_kh_coefficient")]
    pub kh_coefficient: f64,

    /// 水平扩散系数上限 [m²/s]
    #[serde(default = "default_kh_max")]
    pub kh_max: f64,
}

fn default_kz_background() -> f64 { 0.01 }
fn default_friction_velocity() -> f64 { 0.3 }
fn default_obukhov_length() -> f64 { 1.0e5 }
fn default_mixing_height() -> f64 { 1000.0 }
fn default_kh_coefficient() -> f64 { 1.0e-4 }
fn default_kh_max() -> f64 { 1.0e4 }

impl Default for TurbulenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            seed: 0,
            kz_background: default_kz_background(),
            friction_velocity: default_friction_velocity(),
            obukhov_length: default_obukhov_length(),
            mixing_height: default_mixing_height(),
            kh_coefficient: default_kh_coefficient(),
            kh_max: default_kh_max(),
        }
    }
}

impl TurbulenceConfig {
    /// 启用湍流并指定种子
    pub fn enabled_with_seed(seed: u64) -> Self {
        Self {
            enabled: true,
            seed,
            ..Default::default()
        }
    }

    /// 验证参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.kz_background > 0.0 && self.kz_background.is_finite()) {
            return Err(ConfigError::invalid(
                "turbulence.kz_background",
                self.kz_background,
                "背景扩散系数必须为正",
            ));
        }
        if !(self.friction_velocity >= 0.0 && self.friction_velocity.is_finite()) {
            return Err(ConfigError::invalid(
                "turbulence.friction_velocity",
                self.friction_velocity,
                "摩擦速度不能为负",
            ));
        }
        if self.obukhov_length == 0.0 || self.obukhov_length.is_nan() {
            return Err(ConfigError::invalid(
                "turbulence.obukhov_length",
                self.obukhov_length,
                "Obukhov 长度不能为 0",
            ));
        }
        if !(self.mixing_height > 0.0 && self.mixing_height.is_finite()) {
            return Err(ConfigError::invalid(
                "turbulence.mixing_height",
                self.mixing_height,
                "混合层高度必须为正",
            ));
        }
        if !(self.kh_coefficient >= 0.0 && self.kh_coefficient.is_finite()) {
            return Err(ConfigError::invalid(
                "turbulence.kh_coefficient",
                self.kh_coefficient,
                "水平扩散系数不能为负",
            ));
        }
        if self.kh_max.is_nan() || self.kh_max < 0.0 {
            return Err(ConfigError::invalid(
                "turbulence.kh_max",
                self.kh_max,
                "水平扩散上限不能为负",
            ));
        }
        Ok(())
    }
}
