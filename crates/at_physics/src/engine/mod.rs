// crates/at_physics/src/engine/mod.rs

//! 引擎核心
//!
//! - [`timestep`]: CFL 自适应时间步长
//! - [`integrator`]: Heun 预估-校正与前向 Euler
//! - [`parallel`]: 执行策略与线程池并行
//! - [`batch`]: 结构数组批量推进

pub mod batch;
pub mod integrator;
pub mod parallel;
pub mod timestep;

pub use batch::{run_batch, BatchLanes};
pub use integrator::{advance, provisional_lonlat, ForwardEuler, HeunIntegrator, Integrator, WindSampler};
pub use parallel::{run_parallel, ExecutionStrategy, AUTO_PARALLEL_THRESHOLD};
pub use timestep::{AdaptiveStepController, StepSize};
