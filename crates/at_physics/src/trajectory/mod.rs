// crates/at_physics/src/trajectory/mod.rs

//! 轨迹状态与轨迹引擎

pub mod mass;
pub mod observer;
pub mod runner;
pub mod state;

pub use mass::MassDecay;
pub use observer::{ExtentTracker, NullObserver, ObservedExtent, StepObserver, StepSample};
pub use runner::{EngineSettings, Particle, StepPlan, TrajectoryEngine, DEFAULT_MAX_STEPS, TIME_TOLERANCE};
pub use state::{ParcelPosition, Trajectory, TrajectoryPoint, TrajectoryStatus};
