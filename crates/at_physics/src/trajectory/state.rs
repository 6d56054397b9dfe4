// crates/at_physics/src/trajectory/state.rs

//! 轨迹状态
//!
//! 终止状态机：
//!
//! ```text
//! Running ──┬─> Running
//!           ├─> CompletedNormally
//!           ├─> MaxAgeExceeded
//!           ├─> MassDepleted
//!           ├─> NumericalInstability
//!           └─> BoundaryError
//! ```
//!
//! 终止状态是吸收态，进入后不再追加任何点。

use at_config::StartLocation;
use serde::{Deserialize, Serialize};

/// 气团位置 `(time, lon, lat, z)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParcelPosition {
    /// 时间 [s]
    pub time: f64,
    /// 经度 [°]
    pub lon: f64,
    /// 纬度 [°]
    pub lat: f64,
    /// 垂直坐标（单位由气象场决定）
    pub z: f64,
}

/// 轨迹输出点
pub type TrajectoryPoint = ParcelPosition;

impl ParcelPosition {
    /// 创建位置
    #[inline]
    pub const fn new(time: f64, lon: f64, lat: f64, z: f64) -> Self {
        Self { time, lon, lat, z }
    }

    /// 所有分量是否有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.time.is_finite() && self.lon.is_finite() && self.lat.is_finite() && self.z.is_finite()
    }
}

/// 轨迹状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryStatus {
    /// 正在积分
    Running,
    /// 完成全部运行时长
    CompletedNormally,
    /// 超过最大年龄
    MaxAgeExceeded,
    /// 质量耗尽
    MassDepleted,
    /// 出现非有限值
    NumericalInstability,
    /// 离开数据范围
    BoundaryError,
}

impl TrajectoryStatus {
    /// 是否为终止状态
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// 是否为正常终止（非错误）
    #[inline]
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            Self::CompletedNormally | Self::MaxAgeExceeded | Self::MassDepleted
        )
    }

    /// 状态名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::CompletedNormally => "completed_normally",
            Self::MaxAgeExceeded => "max_age_exceeded",
            Self::MassDepleted => "mass_depleted",
            Self::NumericalInstability => "numerical_instability",
            Self::BoundaryError => "boundary_error",
        }
    }
}

/// 单个起点的轨迹
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// 起点在提交列表中的序号
    pub source_index: usize,
    /// 起点
    pub source: StartLocation,
    /// 状态
    pub status: TrajectoryStatus,
    /// 每个接受步的位置（含起点）
    pub path: Vec<ParcelPosition>,
    /// 按输出间隔采样的位置（含起点与正常终止时的终点）
    pub points: Vec<TrajectoryPoint>,
    /// 已接受的步数
    pub steps: usize,
    /// 在地面、模式顶或极点处被反射的步数
    #[serde(default)]
    pub reflections: usize,
    /// 当前质量
    pub mass: f64,
    /// 异常终止原因
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Trajectory {
    /// 以起点位置创建轨迹
    pub fn start(source_index: usize, source: StartLocation, origin: ParcelPosition, mass: f64) -> Self {
        Self {
            source_index,
            source,
            status: TrajectoryStatus::Running,
            path: vec![origin],
            points: vec![origin],
            steps: 0,
            reflections: 0,
            mass,
            reason: None,
        }
    }

    /// 当前位置
    pub fn current(&self) -> ParcelPosition {
        // path 至少包含起点
        self.path[self.path.len() - 1]
    }

    /// 是否仍在积分
    #[inline]
    pub fn is_running(&self) -> bool {
        self.status == TrajectoryStatus::Running
    }

    /// 追加一个接受步
    pub(crate) fn push_step(&mut self, position: ParcelPosition) {
        debug_assert!(self.is_running());
        self.path.push(position);
        self.steps += 1;
    }

    /// 记录输出点（同一时刻不重复记录）
    pub(crate) fn record_output(&mut self, position: ParcelPosition) {
        if self.points.last().map(|p| p.time) != Some(position.time) {
            self.points.push(position);
        }
    }

    /// 转入终止状态
    pub(crate) fn terminate(&mut self, status: TrajectoryStatus, reason: Option<String>) {
        debug_assert!(status.is_terminal());
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.reason = reason;
        if status.is_clean() {
            let last = self.current();
            self.record_output(last);
        }
    }

    /// 已运行时长 [s]（绝对值）
    pub fn elapsed(&self) -> f64 {
        (self.current().time - self.path[0].time).abs()
    }
}
