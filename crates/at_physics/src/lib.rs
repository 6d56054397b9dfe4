// crates/at_physics/src/lib.rs

//! AtmoTrace Physics Layer (Layer 4)
//!
//! 拉格朗日气团轨迹计算，包括：
//! - 规则网格气象场与四维线性插值 (field)
//! - CFL 自适应时间步长与积分格式 (engine)
//! - 垂直运动模式 (vertical)
//! - 边界层湍流扩散 (turbulence)
//! - 地形、模式顶与极点边界处理 (boundary)
//! - 轨迹状态、质量衰减与轨迹引擎 (trajectory)
//!
//! # 执行策略
//!
//! 串行、线程池并行与结构数组批量三种策略对同一输入给出逐位相同的轨迹。
//! 湍流随机数按起点独立播种，与执行顺序无关。
//!
//! # 示例
//!
//! ```
//! use at_config::{RunConfig, StartLocation};
//! use at_physics::prelude::*;
//! use glam::DVec3;
//!
//! let field = GriddedField::uniform(
//!     Axis::regular("lon", -10.0, 1.0, 21).unwrap(),
//!     Axis::regular("lat", -10.0, 1.0, 21).unwrap(),
//!     Axis::regular("level", 0.0, 500.0, 11).unwrap(),
//!     Axis::regular("time", 0.0, 3600.0, 3).unwrap(),
//!     VerticalCoordinateKind::Height,
//!     DVec3::new(10.0, 0.0, 0.0),
//! )
//! .unwrap();
//!
//! let config = RunConfig { total_run_hours: 1.0, ..Default::default() };
//! let engine = TrajectoryEngine::new(&field, &config).unwrap();
//! let traj = engine.run_source(0, &StartLocation::new(0.0, 0.0, 500.0)).unwrap();
//!
//! assert_eq!(traj.status, TrajectoryStatus::CompletedNormally);
//! assert!((traj.current().lon - 0.324).abs() < 1e-3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod engine;
pub mod error;
pub mod field;
pub mod trajectory;
pub mod turbulence;
pub mod vertical;

/// 层级标识
pub const LAYER: u8 = 4;

// 重导出常用类型
pub use boundary::{BoundaryHandler, BoundaryOutcome};
pub use engine::{
    AdaptiveStepController, ExecutionStrategy, ForwardEuler, HeunIntegrator, Integrator, StepSize,
    WindSampler,
};
pub use error::{TrajectoryError, TrajectoryResult};
pub use field::{Axis, GriddedField, Interpolator, VerticalCoordinateKind};
pub use trajectory::{
    EngineSettings, ExtentTracker, MassDecay, NullObserver, ObservedExtent, ParcelPosition,
    StepObserver, StepSample, Trajectory, TrajectoryEngine, TrajectoryPoint, TrajectoryStatus,
};
pub use turbulence::{BoundaryLayer, TurbulenceModel};
pub use vertical::{VerticalMotion, VerticalMotionResolver};

/// 预导入模块
pub mod prelude {
    pub use crate::engine::{ExecutionStrategy, Integrator};
    pub use crate::error::{TrajectoryError, TrajectoryResult};
    pub use crate::field::{names, Axis, GriddedField, Interpolator, VerticalCoordinateKind};
    pub use crate::trajectory::{
        ExtentTracker, ParcelPosition, StepObserver, Trajectory, TrajectoryEngine, TrajectoryStatus,
    };
    pub use crate::turbulence::TurbulenceModel;
    pub use crate::vertical::VerticalMotionResolver;
}
