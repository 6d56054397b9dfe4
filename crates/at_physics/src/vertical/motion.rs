// crates/at_physics/src/vertical/motion.rs

//! 垂直运动模式
//!
//! 每种模式实现 [`VerticalMotion`]，由 [`VerticalMotionResolver`] 在构建时
//! 根据配置选定，步进循环只通过 `get_vertical_velocity` / `resolve` 调用。
//!
//! | 模式 | 垂直速度 |
//! |------|----------|
//! | 数据 | `w` 原值 |
//! | 等密度 | `-(∂ρ/∂t + u∂ρ/∂x + v∂ρ/∂y) / (∂ρ/∂z)` |
//! | 等压 | `0` |
//! | 等熵 | `(Q - ∂θ/∂t - u∂θ/∂x - v∂θ/∂y) / (∂θ/∂z)` |
//! | 空间平均 | 邻近格柱 `w` 的算术平均 |
//! | 阻尼 | `factor · w` |

use std::fmt;

use at_config::VerticalMotionConfig;
use glam::DVec3;

use super::gradient::Gradient4;
use crate::error::{TrajectoryError, TrajectoryResult};
use crate::field::{names, GriddedField, Interpolator, VerticalCoordinateKind};
use crate::trajectory::ParcelPosition;

/// 干空气气体常数 [J/(kg·K)]
pub const GAS_CONSTANT_DRY_AIR: f64 = 287.05;

/// 垂直梯度视为零的阈值
const MIN_VERTICAL_GRADIENT: f64 = 1e-12;

/// 垂直运动模式
pub trait VerticalMotion: Send + Sync + fmt::Debug {
    /// 模式名称
    fn name(&self) -> &'static str;

    /// 该模式在给定垂直坐标下需要的标量场
    fn required_fields(&self, _kind: VerticalCoordinateKind) -> Vec<&'static str> {
        Vec::new()
    }

    /// 由原始风计算垂直速度
    fn vertical_velocity(
        &self,
        interp: &Interpolator<'_>,
        pos: &ParcelPosition,
        raw: DVec3,
    ) -> TrajectoryResult<f64>;
}

// ============================================================
// 各模式
// ============================================================

/// 气象数据垂直速度
#[derive(Debug, Clone, Copy, Default)]
pub struct DataVelocity;

impl VerticalMotion for DataVelocity {
    fn name(&self) -> &'static str {
        "data"
    }

    fn vertical_velocity(&self, _: &Interpolator<'_>, _: &ParcelPosition, raw: DVec3) -> TrajectoryResult<f64> {
        Ok(raw.z)
    }
}

/// 等压面运动
#[derive(Debug, Clone, Copy, Default)]
pub struct Isobaric;

impl VerticalMotion for Isobaric {
    fn name(&self) -> &'static str {
        "isobaric"
    }

    fn vertical_velocity(&self, _: &Interpolator<'_>, _: &ParcelPosition, _: DVec3) -> TrajectoryResult<f64> {
        Ok(0.0)
    }
}

/// 沿等密度面运动
#[derive(Debug, Clone, Copy, Default)]
pub struct DensityFollowing;

impl DensityFollowing {
    /// 位置处的空气密度
    ///
    /// 优先使用 `density` 标量场；气压坐标下可由气温推算 `ρ = p / (R_d T)`。
    fn density(interp: &Interpolator<'_>, p: &ParcelPosition) -> TrajectoryResult<f64> {
        let field = interp.field();
        if field.has_scalar(names::DENSITY) {
            return interp.scalar(names::DENSITY, p.lon, p.lat, p.z, p.time);
        }
        let temperature = interp.scalar(names::TEMPERATURE, p.lon, p.lat, p.z, p.time)?;
        // hPa → Pa
        Ok(100.0 * p.z / (GAS_CONSTANT_DRY_AIR * temperature))
    }
}

impl VerticalMotion for DensityFollowing {
    fn name(&self) -> &'static str {
        "density_following"
    }

    fn required_fields(&self, kind: VerticalCoordinateKind) -> Vec<&'static str> {
        match kind {
            VerticalCoordinateKind::Pressure => Vec::new(),
            _ => vec![names::DENSITY],
        }
    }

    fn vertical_velocity(
        &self,
        interp: &Interpolator<'_>,
        pos: &ParcelPosition,
        raw: DVec3,
    ) -> TrajectoryResult<f64> {
        let grad = Gradient4::compute(interp.field(), pos, |p| Self::density(interp, p))?;
        if grad.dz.abs() < MIN_VERTICAL_GRADIENT {
            return Ok(raw.z);
        }
        Ok(-grad.horizontal_tendency(raw.x, raw.y) / grad.dz)
    }
}

/// 沿等熵面运动（位温守恒，可含非绝热加热）
#[derive(Debug, Clone, Copy, Default)]
pub struct Isentropic;

impl Isentropic {
    fn heating(interp: &Interpolator<'_>, p: &ParcelPosition) -> TrajectoryResult<f64> {
        if interp.field().has_scalar(names::DIABATIC_HEATING) {
            interp.scalar(names::DIABATIC_HEATING, p.lon, p.lat, p.z, p.time)
        } else {
            Ok(0.0)
        }
    }
}

impl VerticalMotion for Isentropic {
    fn name(&self) -> &'static str {
        "isentropic"
    }

    fn required_fields(&self, kind: VerticalCoordinateKind) -> Vec<&'static str> {
        match kind {
            VerticalCoordinateKind::Isentropic => Vec::new(),
            _ => vec![names::POTENTIAL_TEMPERATURE],
        }
    }

    fn vertical_velocity(
        &self,
        interp: &Interpolator<'_>,
        pos: &ParcelPosition,
        raw: DVec3,
    ) -> TrajectoryResult<f64> {
        let heating = Self::heating(interp, pos)?;
        // 位温坐标下 dθ/dt 即垂直速度
        if interp.field().vertical_kind() == VerticalCoordinateKind::Isentropic {
            return Ok(heating);
        }
        let grad = Gradient4::compute(interp.field(), pos, |p| {
            interp.scalar(names::POTENTIAL_TEMPERATURE, p.lon, p.lat, p.z, p.time)
        })?;
        if grad.dz.abs() < MIN_VERTICAL_GRADIENT {
            return Ok(0.0);
        }
        Ok((heating - grad.horizontal_tendency(raw.x, raw.y)) / grad.dz)
    }
}

/// 邻近格柱垂直速度的空间平均
#[derive(Debug, Clone, Copy)]
pub struct SpatialAverage {
    /// 平均半径（格点数）
    pub radius: usize,
}

impl SpatialAverage {
    /// 以 `(2r+1)²` 个格柱求平均，跳过数据范围外的格柱
    pub fn average(&self, interp: &Interpolator<'_>, pos: &ParcelPosition, raw: DVec3) -> TrajectoryResult<f64> {
        let field = interp.field();
        let lon = field.normalize_longitude(pos.lon);
        let (Some(dlon), Some(dlat)) = (
            field.lon_axis().spacing_at(lon),
            field.lat_axis().spacing_at(pos.lat),
        ) else {
            return Ok(raw.z);
        };

        let r = self.radius as i64;
        let mut sum = 0.0;
        let mut count = 0usize;
        for j in -r..=r {
            for i in -r..=r {
                let x = lon + i as f64 * dlon;
                let y = pos.lat + j as f64 * dlat;
                if !field.contains_horizontal(x, y) {
                    continue;
                }
                match interp.interpolate_4d(field.w(), x, y, pos.z, pos.time) {
                    Ok(w) => {
                        sum += w;
                        count += 1;
                    }
                    Err(e) if e.is_boundary() => continue,
                    Err(e) => return Err(e),
                }
            }
        }
        if count == 0 {
            return Ok(raw.z);
        }
        Ok(sum / count as f64)
    }
}

impl VerticalMotion for SpatialAverage {
    fn name(&self) -> &'static str {
        "spatial_average"
    }

    fn vertical_velocity(
        &self,
        interp: &Interpolator<'_>,
        pos: &ParcelPosition,
        raw: DVec3,
    ) -> TrajectoryResult<f64> {
        self.average(interp, pos, raw)
    }
}

/// 垂直速度乘以阻尼系数
#[derive(Debug, Clone, Copy)]
pub struct Damped {
    /// 阻尼系数 [0, 1]
    pub factor: f64,
}

impl VerticalMotion for Damped {
    fn name(&self) -> &'static str {
        "damped"
    }

    fn vertical_velocity(&self, _: &Interpolator<'_>, _: &ParcelPosition, raw: DVec3) -> TrajectoryResult<f64> {
        Ok(self.factor * raw.z)
    }
}

/// 按纬度自动选择：极区空间平均，其余使用数据速度
#[derive(Debug, Clone, Copy)]
pub struct LatitudeAuto {
    /// 极区纬度阈值 [°]
    pub polar_latitude: f64,
    /// 极区使用的平均核
    pub average: SpatialAverage,
}

impl VerticalMotion for LatitudeAuto {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn vertical_velocity(
        &self,
        interp: &Interpolator<'_>,
        pos: &ParcelPosition,
        raw: DVec3,
    ) -> TrajectoryResult<f64> {
        if pos.lat.abs() >= self.polar_latitude {
            self.average.average(interp, pos, raw)
        } else {
            Ok(raw.z)
        }
    }
}

// ============================================================
// 解析器
// ============================================================

/// 垂直运动解析器
#[derive(Debug)]
pub struct VerticalMotionResolver {
    config: VerticalMotionConfig,
    strategy: Box<dyn VerticalMotion>,
}

impl Default for VerticalMotionResolver {
    fn default() -> Self {
        Self::from_config(&VerticalMotionConfig::Data)
    }
}

impl VerticalMotionResolver {
    /// 根据配置构建
    pub fn from_config(config: &VerticalMotionConfig) -> Self {
        let strategy: Box<dyn VerticalMotion> = match *config {
            VerticalMotionConfig::Data => Box::new(DataVelocity),
            VerticalMotionConfig::DensityFollowing => Box::new(DensityFollowing),
            VerticalMotionConfig::Isobaric => Box::new(Isobaric),
            VerticalMotionConfig::Isentropic => Box::new(Isentropic),
            VerticalMotionConfig::SpatialAverage { radius } => Box::new(SpatialAverage { radius }),
            VerticalMotionConfig::Damped { factor } => Box::new(Damped { factor }),
            VerticalMotionConfig::Auto { polar_latitude } => Box::new(LatitudeAuto {
                polar_latitude,
                average: SpatialAverage {
                    radius: at_config::motion::DEFAULT_AVERAGE_RADIUS,
                },
            }),
        };
        Self {
            config: *config,
            strategy,
        }
    }

    /// 使用自定义模式
    pub fn with_strategy(config: VerticalMotionConfig, strategy: Box<dyn VerticalMotion>) -> Self {
        Self { config, strategy }
    }

    /// 模式配置
    pub fn config(&self) -> &VerticalMotionConfig {
        &self.config
    }

    /// 模式名称
    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    /// 检查气象场提供了该模式需要的标量场
    pub fn validate(&self, field: &GriddedField) -> TrajectoryResult<()> {
        for name in self.strategy.required_fields(field.vertical_kind()) {
            if !field.has_scalar(name) {
                return Err(TrajectoryError::missing_field(name));
            }
        }
        // 气压坐标下的等密度模式至少需要密度或气温
        if matches!(self.config, VerticalMotionConfig::DensityFollowing)
            && field.vertical_kind() == VerticalCoordinateKind::Pressure
            && !field.has_scalar(names::DENSITY)
            && !field.has_scalar(names::TEMPERATURE)
        {
            return Err(TrajectoryError::missing_field(names::TEMPERATURE));
        }
        Ok(())
    }

    /// 在给定位置计算垂直速度
    pub fn get_vertical_velocity(
        &self,
        interp: &Interpolator<'_>,
        lon: f64,
        lat: f64,
        z: f64,
        t: f64,
    ) -> TrajectoryResult<f64> {
        let raw = interp.wind(lon, lat, z, t)?;
        let pos = ParcelPosition::new(t, lon, lat, z);
        self.strategy.vertical_velocity(interp, &pos, raw)
    }

    /// 用模式垂直速度替换原始风的垂直分量
    pub fn resolve(&self, interp: &Interpolator<'_>, pos: &ParcelPosition, raw: DVec3) -> TrajectoryResult<DVec3> {
        let w = self.strategy.vertical_velocity(interp, pos, raw)?;
        Ok(DVec3::new(raw.x, raw.y, w))
    }
}
