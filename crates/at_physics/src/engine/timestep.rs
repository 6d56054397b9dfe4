// crates/at_physics/src/engine/timestep.rs

//! 自适应时间步长控制
//!
//! 单个气团的步长受 CFL 条件约束：
//!
//! $$ \Delta t = \min\left(
//!     \frac{r\,\Delta x}{\max(|u|,\varepsilon)},
//!     \frac{r\,\Delta y}{\max(|v|,\varepsilon)},
//!     \frac{r\,\Delta z}{\max(|w|,\varepsilon)},
//!     \Delta t_{max},\ t_{node} - t \right) $$
//!
//! 其中 `Δx`, `Δy` 为气团所在位置的局部经纬度间距换算成的米数，
//! `Δz` 为局部垂直间距（垂直坐标单位），`r` 为 CFL 安全系数。
//! 步长不会越过下一个气象时间节点，保证预估与校正使用同一时间区间。

use at_config::RunConfig;
use at_geo::Sphere;
use glam::DVec3;

use crate::field::GriddedField;
use crate::trajectory::ParcelPosition;

/// 步长计算结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSize {
    /// 带符号步长 [s]（后向为负）
    pub dt: f64,
    /// 步长由时间节点限定时，需要精确落到的节点时刻
    pub target: Option<f64>,
}

/// 自适应步长控制器
#[derive(Debug, Clone)]
pub struct AdaptiveStepController {
    /// CFL 安全系数 (0, 1]
    cfl_ratio: f64,
    /// 最大步长 [s]
    dt_max: f64,
    /// 静风下限
    calm_wind_floor: f64,
    /// 球面模型
    sphere: Sphere,
}

impl Default for AdaptiveStepController {
    fn default() -> Self {
        Self::new(0.75, 3600.0, 1e-3)
    }
}

impl AdaptiveStepController {
    /// 创建控制器
    pub fn new(cfl_ratio: f64, dt_max: f64, calm_wind_floor: f64) -> Self {
        Self {
            cfl_ratio,
            dt_max,
            calm_wind_floor,
            sphere: Sphere::EARTH,
        }
    }

    /// 从运行配置创建
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.cfl_ratio, config.dt_max_seconds, config.calm_wind_floor)
    }

    /// 设置 CFL 系数
    pub fn with_cfl_ratio(mut self, cfl_ratio: f64) -> Self {
        self.cfl_ratio = cfl_ratio;
        self
    }

    /// 设置最大步长
    pub fn with_dt_max(mut self, dt_max: f64) -> Self {
        self.dt_max = dt_max;
        self
    }

    /// CFL 系数
    #[inline]
    pub fn cfl_ratio(&self) -> f64 {
        self.cfl_ratio
    }

    /// 最大步长
    #[inline]
    pub fn dt_max(&self) -> f64 {
        self.dt_max
    }

    /// 气团位置处的局部网格间距 `(dx [m], dy [m], dz [垂直单位])`
    ///
    /// 单节点轴没有间距，对应分量为 `None`。
    pub fn local_spacing(
        &self,
        field: &GriddedField,
        position: &ParcelPosition,
    ) -> (Option<f64>, Option<f64>, Option<f64>) {
        let lon = field.normalize_longitude(position.lon);
        let dx = field
            .lon_axis()
            .spacing_at(lon)
            .map(|d| d * self.sphere.meters_per_degree_lon(position.lat));
        let dy = field
            .lat_axis()
            .spacing_at(position.lat)
            .map(|d| d * self.sphere.meters_per_degree_lat());
        let dz = field.level_axis().spacing_at(position.z);
        (dx, dy, dz)
    }

    /// 计算步长
    ///
    /// `direction` 为 +1（前向）或 -1（后向）；返回值始终有限且非零，
    /// 符号与 `direction` 一致。
    pub fn compute_dt(
        &self,
        field: &GriddedField,
        wind: DVec3,
        position: &ParcelPosition,
        direction: f64,
    ) -> StepSize {
        let (dx, dy, dz) = self.local_spacing(field, position);
        let sign = if direction < 0.0 { -1.0 } else { 1.0 };

        let mut dt = self.dt_max;
        for (spacing, speed) in [(dx, wind.x), (dy, wind.y), (dz, wind.z)] {
            let Some(spacing) = spacing else { continue };
            let bound = self.cfl_ratio * spacing / speed.abs().max(self.calm_wind_floor);
            if bound.is_finite() && bound > 0.0 {
                dt = dt.min(bound);
            }
        }

        if !(dt.is_finite() && dt > 0.0) {
            dt = self.dt_max;
        }

        let mut target = None;
        if let Some(node) = field.next_time_node(position.time, sign) {
            let to_node = (node - position.time).abs();
            if to_node <= dt {
                dt = to_node;
                target = Some(node);
            }
        }

        StepSize { dt: sign * dt, target }
    }
}
