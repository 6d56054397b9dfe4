// crates/at_config/src/lib.rs

//! AtmoTrace Config Layer (Layer 3)
//!
//! 配置层，描述一次轨迹计算的全部运行参数。本层只依赖 serde，
//! 不引用物理层类型；`at_physics` 在构建引擎时一次性读取这些配置。
//!
//! # 模块概览
//!
//! - [`run_config`]: `RunConfig` 运行配置（方向、步长、输出、起点等）
//! - [`motion`]: 垂直运动模式配置
//! - [`turbulence`]: 湍流扩散参数
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: at_cli        ─> RunConfig::from_file, TrajectoryEngine
//! Layer 4: at_physics    ─> TrajectoryEngine::new(&field, &RunConfig)
//! Layer 3: at_config     ─> RunConfig (本层)
//! Layer 2: at_geo
//! Layer 1: at_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod motion;
pub mod run_config;
pub mod turbulence;

/// 层级标识
pub const LAYER: u8 = 3;

// 重导出核心类型
pub use error::ConfigError;
pub use motion::VerticalMotionConfig;
pub use run_config::{
    ExecutionMode, IntegrationScheme, MassConfig, RunConfig, StartLocation,
};
pub use turbulence::TurbulenceConfig;
