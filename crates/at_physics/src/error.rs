// crates/at_physics/src/error.rs

//! 轨迹计算错误类型
//!
//! 初始化阶段的错误直接返回给调用者；步进过程中的错误由引擎转换为
//! 轨迹的终止状态，不会影响同一次运行中的其他轨迹。

use at_config::ConfigError;
use at_foundation::AtError;
use thiserror::Error;

/// 轨迹计算错误
#[derive(Debug, Error)]
pub enum TrajectoryError {
    /// 查询点超出气象场范围
    #[error("超出网格范围: {axis} = {value} 不在 [{min}, {max}] 内")]
    Boundary {
        /// 坐标轴名称
        axis: &'static str,
        /// 查询值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },

    /// 起点垂直坐标超出垂直轴范围
    #[error("无效起点坐标: z = {value} 不在垂直轴范围 [{min}, {max}] 内")]
    InvalidCoordinate {
        /// 垂直坐标值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },

    /// 位置或速度出现非有限值
    #[error("数值不稳定: {quantity} = {value}")]
    NumericalInstability {
        /// 出现问题的物理量
        quantity: &'static str,
        /// 数值
        value: f64,
    },

    /// 缺少所需的标量场
    #[error("缺少字段: {name}")]
    MissingField {
        /// 字段名称
        name: String,
    },

    /// 网格构造错误
    #[error("无效网格: {0}")]
    InvalidGrid(String),

    /// 基础层错误
    #[error(transparent)]
    Foundation(#[from] AtError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// 轨迹计算结果类型
pub type TrajectoryResult<T> = Result<T, TrajectoryError>;

impl TrajectoryError {
    /// 创建越界错误
    pub fn boundary(axis: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::Boundary {
            axis,
            value,
            min,
            max,
        }
    }

    /// 创建数值不稳定错误
    pub fn instability(quantity: &'static str, value: f64) -> Self {
        Self::NumericalInstability { quantity, value }
    }

    /// 创建缺失字段错误
    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField { name: name.into() }
    }

    /// 是否为越界错误
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary { .. })
    }
}

/// 检查数值有限，否则返回数值不稳定错误
#[inline]
pub fn ensure_finite_value(quantity: &'static str, value: f64) -> TrajectoryResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TrajectoryError::instability(quantity, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_display() {
        let err = TrajectoryError::boundary("lat", 95.0, -90.0, 90.0);
        let msg = err.to_string();
        assert!(msg.contains("lat"));
        assert!(msg.contains("95"));
        assert!(err.is_boundary());
    }

    #[test]
    fn test_foundation_conversion() {
        let err: TrajectoryError = AtError::invalid_input("坐标轴为空").into();
        assert!(matches!(err, TrajectoryError::Foundation(_)));
        assert!(!err.is_boundary());
    }

    #[test]
    fn test_ensure_finite_value() {
        assert_eq!(ensure_finite_value("u", 1.5).unwrap(), 1.5);
        assert!(matches!(
            ensure_finite_value("u", f64::NAN),
            Err(TrajectoryError::NumericalInstability { quantity: "u", .. })
        ));
    }
}
