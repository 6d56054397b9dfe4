// crates/at_physics/src/engine/parallel.rs

//! 执行策略
//!
//! 各起点的轨迹互不依赖。三种策略对同一输入给出相同结果：
//!
//! - `Sequential`: 逐个起点串行
//! - `Parallel`: rayon 线程池按起点并行，结果按提交顺序收集
//! - `Batch`: 所有活动气团按结构数组同步推进（见 `batch` 模块）

use at_config::{ExecutionMode, StartLocation};
use rayon::prelude::*;

use crate::error::TrajectoryResult;
use crate::trajectory::{Trajectory, TrajectoryEngine};

/// `Auto` 策略启用并行的起点数阈值
pub const AUTO_PARALLEL_THRESHOLD: usize = 16;

/// 执行策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// 串行
    #[default]
    Sequential,
    /// 多线程并行
    Parallel,
    /// 结构数组批量推进
    Batch,
    /// 按起点数量自动选择
    Auto,
}

impl ExecutionStrategy {
    /// 按起点数量确定实际策略
    pub fn resolve(self, source_count: usize) -> Self {
        match self {
            Self::Auto if source_count >= AUTO_PARALLEL_THRESHOLD => Self::Parallel,
            Self::Auto => Self::Sequential,
            other => other,
        }
    }

    /// 策略名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Batch => "batch",
            Self::Auto => "auto",
        }
    }
}

impl From<ExecutionMode> for ExecutionStrategy {
    fn from(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Sequential => Self::Sequential,
            ExecutionMode::Parallel => Self::Parallel,
            ExecutionMode::Batch => Self::Batch,
            ExecutionMode::Auto => Self::Auto,
        }
    }
}

/// 按起点并行运行
///
/// `replicas` 为各起点的同坐标副本序号（见 [`crate::turbulence::replica_numbers`]）。
pub fn run_parallel(
    engine: &TrajectoryEngine<'_>,
    sources: &[StartLocation],
    replicas: &[u32],
) -> Vec<TrajectoryResult<Trajectory>> {
    sources
        .par_iter()
        .zip(replicas.par_iter())
        .enumerate()
        .map(|(i, (source, &replica))| engine.run_replica(i, source, replica))
        .collect()
}
