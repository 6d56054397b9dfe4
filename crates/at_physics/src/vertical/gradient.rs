// crates/at_physics/src/vertical/gradient.rs

//! 标量场偏导数
//!
//! 以局部网格间距的一半为步长做中心差分；靠近数据边界时差分点夹到
//! 轴范围内，退化为单侧差分。水平导数换算为每米，垂直导数为每垂直单位，
//! 时间导数为每秒。

use at_geo::Sphere;

use crate::error::TrajectoryResult;
use crate::field::{Axis, GriddedField};
use crate::trajectory::ParcelPosition;

/// 求导方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// 经向（东向）
    Lon,
    /// 纬向（北向）
    Lat,
    /// 垂直
    Vertical,
    /// 时间
    Time,
}

impl Dimension {
    fn axis(self, field: &GriddedField) -> &Axis {
        match self {
            Self::Lon => field.lon_axis(),
            Self::Lat => field.lat_axis(),
            Self::Vertical => field.level_axis(),
            Self::Time => field.time_axis(),
        }
    }

    fn coordinate(self, field: &GriddedField, pos: &ParcelPosition) -> f64 {
        match self {
            Self::Lon => field.normalize_longitude(pos.lon),
            Self::Lat => pos.lat,
            Self::Vertical => pos.z,
            Self::Time => pos.time,
        }
    }

    fn moved(self, pos: &ParcelPosition, value: f64) -> ParcelPosition {
        let mut p = *pos;
        match self {
            Self::Lon => p.lon = value,
            Self::Lat => p.lat = value,
            Self::Vertical => p.z = value,
            Self::Time => p.time = value,
        }
        p
    }

    /// 坐标单位到物理长度的换算系数
    fn metric(self, lat: f64) -> f64 {
        match self {
            Self::Lon => Sphere::EARTH.meters_per_degree_lon(lat),
            Self::Lat => Sphere::EARTH.meters_per_degree_lat(),
            Self::Vertical | Self::Time => 1.0,
        }
    }
}

/// 计算 `f` 在 `pos` 处沿 `dim` 的偏导数
///
/// 单节点轴上导数为 0。
pub fn partial<F>(field: &GriddedField, pos: &ParcelPosition, dim: Dimension, f: F) -> TrajectoryResult<f64>
where
    F: Fn(&ParcelPosition) -> TrajectoryResult<f64>,
{
    let axis = dim.axis(field);
    let x = dim.coordinate(field, pos);
    let Some(spacing) = axis.spacing_at(x) else {
        return Ok(0.0);
    };
    let half = 0.5 * spacing;
    let lo = axis.clamp(x - half);
    let hi = axis.clamp(x + half);
    if hi <= lo {
        return Ok(0.0);
    }
    let f_hi = f(&dim.moved(pos, hi))?;
    let f_lo = f(&dim.moved(pos, lo))?;
    Ok((f_hi - f_lo) / ((hi - lo) * dim.metric(pos.lat)))
}

/// 物质导数所需的四个偏导数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient4 {
    /// ∂/∂t
    pub dt: f64,
    /// ∂/∂x
    pub dx: f64,
    /// ∂/∂y
    pub dy: f64,
    /// ∂/∂z
    pub dz: f64,
}

impl Gradient4 {
    /// 计算全部偏导数
    pub fn compute<F>(field: &GriddedField, pos: &ParcelPosition, f: F) -> TrajectoryResult<Self>
    where
        F: Fn(&ParcelPosition) -> TrajectoryResult<f64>,
    {
        Ok(Self {
            dt: partial(field, pos, Dimension::Time, &f)?,
            dx: partial(field, pos, Dimension::Lon, &f)?,
            dy: partial(field, pos, Dimension::Lat, &f)?,
            dz: partial(field, pos, Dimension::Vertical, &f)?,
        })
    }

    /// 局地变化与水平平流项 `∂/∂t + u ∂/∂x + v ∂/∂y`
    #[inline]
    pub fn horizontal_tendency(&self, u: f64, v: f64) -> f64 {
        self.dt + u * self.dx + v * self.dy
    }
}
