// crates/at_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `AtError` 枚举和 `AtResult` 类型别名。轨迹计算相关的错误
//! 在 `at_physics` 中扩展，并可通过 `From` 从本类型转换。
//!
//! # 示例
//!
//! ```
//! use at_foundation::error::{AtError, AtResult};
//!
//! fn read_axis() -> AtResult<()> {
//!     Err(AtError::invalid_input("坐标轴为空"))
//! }
//! assert!(read_axis().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type AtResult<T> = Result<T, AtError>;

/// AtmoTrace 基础错误类型
#[derive(Error, Debug)]
pub enum AtError {
    // ========================================================================
    // 数据验证错误
    // ========================================================================

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: String,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 非单调坐标轴
    #[error("坐标轴 {axis} 非严格递增: 第{index}个值 {value} 不大于前一个值 {previous}")]
    NonMonotonic {
        /// 坐标轴名称
        axis: String,
        /// 出错位置
        index: usize,
        /// 出错值
        value: f64,
        /// 前一个值
        previous: f64,
    },

    /// 非有限值（NaN/Inf）
    #[error("非有限值: {name}[{index}] = {value}")]
    NonFinite {
        /// 数据名称
        name: String,
        /// 出错位置
        index: usize,
        /// 出错值
        value: f64,
    },

    // ========================================================================
    // 内部错误
    // ========================================================================

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl AtError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
