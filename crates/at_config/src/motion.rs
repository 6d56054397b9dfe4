// crates/at_config/src/motion.rs

//! 垂直运动模式配置
//!
//! 对应传统的整数模式码：
//!
//! | 码 | 模式 |
//! |----|------|
//! | 0 | 气象数据垂直速度 |
//! | 1 | 等密度面 |
//! | 2 | 等压面 |
//! | 3 | 等熵面 |
//! | 4 | 空间平均 |
//! | 5 | 幅度阻尼 |
//!
//! `Auto` 没有模式码，只能通过配置文件选择。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 空间平均默认半径（格点数）
pub const DEFAULT_AVERAGE_RADIUS: usize = 1;
/// 默认阻尼系数
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.5;
/// 自动模式默认极区纬度阈值 (°)
pub const DEFAULT_POLAR_LATITUDE: f64 = 70.0;

fn default_radius() -> usize { DEFAULT_AVERAGE_RADIUS }
fn default_polar_latitude() -> f64 { DEFAULT_POLAR_LATITUDE }

/// 垂直运动模式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum VerticalMotionConfig {
    /// 直接使用气象场垂直速度
    #[default]
    Data,
    /// 沿等密度面运动
    DensityFollowing,
    /// 等压面（垂直速度恒为 0）
    Isobaric,
    /// 等熵面（位温守恒）
    Isentropic,
    /// 邻近格柱垂直速度的空间平均
    SpatialAverage {
        /// 平均半径（格点数）
        #[serde(default = "default_radius")]
        radius: usize,
    },
    /// 垂直速度乘以阻尼系数
    Damped {
        /// 阻尼系数，取值 [0, 1]
        factor: f64,
    },
    /// 按纬度自动选择：极区使用空间平均，其余使用数据速度
    Auto {
        /// 极区纬度阈值 (°)
        #[serde(default = "default_polar_latitude")]
        polar_latitude: f64,
    },
}

impl VerticalMotionConfig {
    /// 从传统整数模式码创建
    ///
    /// 模式码 5（阻尼）使用 `damping` 作为阻尼系数。
    pub fn from_code(code: u8, damping: f64) -> Result<Self, ConfigError> {
        let config = match code {
            0 => Self::Data,
            1 => Self::DensityFollowing,
            2 => Self::Isobaric,
            3 => Self::Isentropic,
            4 => Self::SpatialAverage { radius: DEFAULT_AVERAGE_RADIUS },
            5 => Self::Damped { factor: damping },
            _ => {
                return Err(ConfigError::invalid(
                    "vertical_motion.mode",
                    code,
                    "未知的垂直运动模式码 (支持 0-5)",
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// 对应的整数模式码（`Auto` 无模式码）
    pub fn code(&self) -> Option<u8> {
        match self {
            Self::Data => Some(0),
            Self::DensityFollowing => Some(1),
            Self::Isobaric => Some(2),
            Self::Isentropic => Some(3),
            Self::SpatialAverage { .. } => Some(4),
            Self::Damped { .. } => Some(5),
            Self::Auto { .. } => None,
        }
    }

    /// 模式名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::DensityFollowing => "density_following",
            Self::Isobaric => "isobaric",
            Self::Isentropic => "isentropic",
            Self::SpatialAverage { .. } => "spatial_average",
            Self::Damped { .. } => "damped",
            Self::Auto { .. } => "auto",
        }
    }

    /// 验证参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Damped { factor } if !(0.0..=1.0).contains(&factor) => Err(
                ConfigError::invalid("vertical_motion.factor", factor, "阻尼系数必须在 [0, 1] 范围内"),
            ),
            Self::SpatialAverage { radius } if radius == 0 => Err(ConfigError::invalid(
                "vertical_motion.radius",
                radius,
                "平均半径至少为 1",
            )),
            Self::Auto { polar_latitude } if !(0.0..=90.0).contains(&polar_latitude) => {
                Err(ConfigError::invalid(
                    "vertical_motion.polar_latitude",
                    polar_latitude,
                    "极区阈值必须在 [0, 90] 范围内",
                ))
            }
            _ => Ok(()),
        }
    }
}
