// crates/at_physics/src/engine/integrator.rs

//! 轨迹积分格式
//!
//! Heun 预估-校正：
//!
//! 1. 预估：在 `(x, t)` 取风 `V1`，以 `V1` 平流得到临时终点 `x*`
//! 2. 校正：在 `(x*, t + dt)` 取风 `V2`
//! 3. 以平均风 `(V1 + V2) / 2` 从原始位置重新平流得到终点
//!
//! 均匀风场中 `V1 == V2`，Heun 与前向 Euler 结果完全一致。
//!
//! 水平位移使用球面公式（见 [`at_geo::advect_lonlat`]），
//! 垂直位移 `Δz = w·dt`，单位与气象场垂直坐标一致。

use at_geo::{advect_lonlat, normalize_lonlat};
use glam::DVec3;

use crate::error::TrajectoryResult;
use crate::trajectory::ParcelPosition;

/// 风场采样接口
pub trait WindSampler {
    /// 在给定位置与时刻采样风矢量（已应用垂直运动模式）
    fn sample(&self, lon: f64, lat: f64, z: f64, t: f64) -> TrajectoryResult<DVec3>;

    /// 校正步查询前整理临时终点（如夹取垂直坐标、换算经度约定）
    fn settle(&self, lon: f64, lat: f64, z: f64) -> (f64, f64, f64) {
        (lon, lat, z)
    }
}

/// 从起点以给定风平流 `dt`，返回 `(lon, lat, z)`（未规范化）
#[inline]
pub fn advance(start: &ParcelPosition, wind: DVec3, dt: f64) -> (f64, f64, f64) {
    let (lon, lat) = advect_lonlat(start.lon, start.lat, wind.x, wind.y, dt);
    (lon, lat, start.z + wind.z * dt)
}

/// 预估终点的水平规范化（纬度跨极折返、经度回绕）
#[inline]
pub fn provisional_lonlat(lon: f64, lat: f64) -> (f64, f64) {
    let (lon, lat, _) = normalize_lonlat(lon, lat);
    (lon, lat)
}

/// 积分格式
pub trait Integrator: Send + Sync {
    /// 格式名称
    fn name(&self) -> &'static str;

    /// 是否需要校正步风场
    fn needs_corrector(&self) -> bool;

    /// 由预估风与校正风得到实际使用的风
    fn effective_wind(&self, predictor: DVec3, corrector: Option<DVec3>) -> DVec3;

    /// 推进一步
    ///
    /// `wind` 为起点处已采样的风，`end_time` 为本步终点时刻。
    fn step(
        &self,
        sampler: &dyn WindSampler,
        start: &ParcelPosition,
        wind: DVec3,
        dt: f64,
        end_time: f64,
    ) -> TrajectoryResult<(f64, f64, f64)> {
        let corrector = if self.needs_corrector() {
            let (lon, lat, z) = advance(start, wind, dt);
            let (lon, lat) = provisional_lonlat(lon, lat);
            let (lon, lat, z) = sampler.settle(lon, lat, z);
            Some(sampler.sample(lon, lat, z, end_time)?)
        } else {
            None
        };
        Ok(advance(start, self.effective_wind(wind, corrector), dt))
    }
}

/// Heun 预估-校正格式（二阶）
#[derive(Debug, Clone, Copy, Default)]
pub struct HeunIntegrator;

impl Integrator for HeunIntegrator {
    fn name(&self) -> &'static str {
        "heun"
    }

    fn needs_corrector(&self) -> bool {
        true
    }

    #[inline]
    fn effective_wind(&self, predictor: DVec3, corrector: Option<DVec3>) -> DVec3 {
        match corrector {
            Some(c) => (predictor + c) * 0.5,
            None => predictor,
        }
    }
}

/// 前向 Euler 格式（一阶）
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn name(&self) -> &'static str {
        "euler"
    }

    fn needs_corrector(&self) -> bool {
        false
    }

    #[inline]
    fn effective_wind(&self, predictor: DVec3, _corrector: Option<DVec3>) -> DVec3 {
        predictor
    }
}
