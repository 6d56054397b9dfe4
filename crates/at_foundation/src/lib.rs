// crates/at_foundation/src/lib.rs

//! AtmoTrace Foundation Layer
//!
//! 基础层，为整个工作区提供统一的错误类型与数值工具。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `AtError` / `AtResult`
//! - [`float`]: 浮点插值
//! - [`validation`]: 坐标轴、数组等输入数据的运行时验证
//!
//! # 示例
//!
//! ```
//! use at_foundation::{lerp, validation::ensure_strictly_increasing};
//!
//! assert_eq!(lerp(0.0, 10.0, 0.25), 2.5);
//! assert!(ensure_strictly_increasing("lon", &[0.0, 1.0, 2.5]).is_ok());
//! assert!(ensure_strictly_increasing("lon", &[0.0, 0.0]).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;
pub mod validation;

// 重导出常用类型
pub use error::{AtError, AtResult};
pub use float::lerp;
