// crates/at_physics/src/field/interpolation.rs

//! 四线性插值
//!
//! 固定按 x → y → z → t 的顺序逐维线性插值。四维查询先确定两个相邻
//! 时间层，在各层内完成三维空间插值，再按时间线性混合。
//!
//! 线性插值统一采用 `a + f (b - a)` 形式，查询点落在网格节点上时
//! `f == 0`，返回存储值本身。
//!
//! 任一坐标严格落在 `[axis[0], axis[-1]]` 之外时返回
//! [`TrajectoryError::Boundary`]；插值器本身从不截断坐标。

use at_foundation::float::lerp;
use at_foundation::validation::ensure_len;
use glam::DVec3;

use super::grid::{Axis, GriddedField};
use crate::error::{TrajectoryError, TrajectoryResult};

/// 单轴插值区间
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBracket {
    /// 左端节点
    pub i0: usize,
    /// 右端节点（落在节点上时与 `i0` 相同）
    pub i1: usize,
    /// 区间内的相对位置 [0, 1]
    pub frac: f64,
}

impl AxisBracket {
    /// 在坐标轴上定位 `x`
    pub fn locate(axis: &Axis, x: f64) -> TrajectoryResult<Self> {
        if !axis.contains(x) {
            return Err(axis.out_of_range(x));
        }
        let values = axis.values();
        let i0 = axis.interval_index(x);
        if x == values[i0] {
            return Ok(Self { i0, i1: i0, frac: 0.0 });
        }
        let i1 = i0 + 1;
        if x == values[i1] {
            return Ok(Self { i0: i1, i1, frac: 0.0 });
        }
        let frac = (x - values[i0]) / (values[i1] - values[i0]);
        Ok(Self { i0, i1, frac })
    }
}

/// 三维空间插值模板
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialStencil {
    /// 经向区间
    pub x: AxisBracket,
    /// 纬向区间
    pub y: AxisBracket,
    /// 垂直区间
    pub z: AxisBracket,
}

/// 气象场插值器
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    field: &'a GriddedField,
}

impl<'a> Interpolator<'a> {
    /// 创建插值器
    pub fn new(field: &'a GriddedField) -> Self {
        Self { field }
    }

    /// 所插值的气象场
    #[inline]
    pub fn field(&self) -> &'a GriddedField {
        self.field
    }

    /// 计算空间插值模板（经度先换算到场的约定）
    pub fn stencil(&self, lon: f64, lat: f64, z: f64) -> TrajectoryResult<SpatialStencil> {
        let lon = self.field.normalize_longitude(lon);
        Ok(SpatialStencil {
            x: AxisBracket::locate(self.field.lon_axis(), lon)?,
            y: AxisBracket::locate(self.field.lat_axis(), lat)?,
            z: AxisBracket::locate(self.field.level_axis(), z)?,
        })
    }

    /// 时间区间
    #[inline]
    pub fn time_bracket(&self, t: f64) -> TrajectoryResult<AxisBracket> {
        AxisBracket::locate(self.field.time_axis(), t)
    }

    /// 在单个时间层上按模板做三线性插值（x → y → z）
    pub fn sample_3d(&self, data: &[f64], time_index: usize, s: &SpatialStencil) -> f64 {
        let f = self.field;
        let along_x = |k: usize, j: usize| {
            lerp(
                data[f.index(time_index, k, j, s.x.i0)],
                data[f.index(time_index, k, j, s.x.i1)],
                s.x.frac,
            )
        };
        let along_y = |k: usize| lerp(along_x(k, s.y.i0), along_x(k, s.y.i1), s.y.frac);
        lerp(along_y(s.z.i0), along_y(s.z.i1), s.z.frac)
    }

    /// 按模板与时间区间做四线性插值
    pub fn sample_4d(&self, data: &[f64], s: &SpatialStencil, t: &AxisBracket) -> f64 {
        let a = self.sample_3d(data, t.i0, s);
        if t.frac == 0.0 {
            return a;
        }
        let b = self.sample_3d(data, t.i1, s);
        lerp(a, b, t.frac)
    }

    /// 单一时间层上的三维插值
    pub fn interpolate_3d(
        &self,
        data: &[f64],
        time_index: usize,
        lon: f64,
        lat: f64,
        z: f64,
    ) -> TrajectoryResult<f64> {
        ensure_len("data", data, self.field.node_count())?;
        if time_index >= self.field.time_axis().len() {
            return Err(TrajectoryError::InvalidGrid(format!(
                "时间层索引 {} 超出范围 (共 {} 层)",
                time_index,
                self.field.time_axis().len()
            )));
        }
        let stencil = self.stencil(lon, lat, z)?;
        Ok(self.sample_3d(data, time_index, &stencil))
    }

    /// 四维插值
    pub fn interpolate_4d(&self, data: &[f64], lon: f64, lat: f64, z: f64, t: f64) -> TrajectoryResult<f64> {
        ensure_len("data", data, self.field.node_count())?;
        let stencil = self.stencil(lon, lat, z)?;
        let bracket = self.time_bracket(t)?;
        Ok(self.sample_4d(data, &stencil, &bracket))
    }

    /// 风矢量 `(u, v, w)`，三个分量共用同一模板
    pub fn wind(&self, lon: f64, lat: f64, z: f64, t: f64) -> TrajectoryResult<DVec3> {
        let stencil = self.stencil(lon, lat, z)?;
        let bracket = self.time_bracket(t)?;
        Ok(DVec3::new(
            self.sample_4d(self.field.u(), &stencil, &bracket),
            self.sample_4d(self.field.v(), &stencil, &bracket),
            self.sample_4d(self.field.w(), &stencil, &bracket),
        ))
    }

    /// 命名标量场的四维插值
    pub fn scalar(&self, name: &str, lon: f64, lat: f64, z: f64, t: f64) -> TrajectoryResult<f64> {
        let data = self
            .field
            .scalar(name)
            .ok_or_else(|| TrajectoryError::missing_field(name))?;
        self.interpolate_4d(data, lon, lat, z, t)
    }

    /// 命名地面场的插值（x → y → t）
    pub fn surface(&self, name: &str, lon: f64, lat: f64, t: f64) -> TrajectoryResult<f64> {
        let data = self
            .field
            .surface(name)
            .ok_or_else(|| TrajectoryError::missing_field(name))?;
        let f = self.field;
        let lon = f.normalize_longitude(lon);
        let x = AxisBracket::locate(f.lon_axis(), lon)?;
        let y = AxisBracket::locate(f.lat_axis(), lat)?;
        let tb = self.time_bracket(t)?;

        let layer = |ti: usize| {
            let along_x =
                |j: usize| lerp(data[f.surface_index(ti, j, x.i0)], data[f.surface_index(ti, j, x.i1)], x.frac);
            lerp(along_x(y.i0), along_x(y.i1), y.frac)
        };
        let a = layer(tb.i0);
        if tb.frac == 0.0 {
            return Ok(a);
        }
        Ok(lerp(a, layer(tb.i1), tb.frac))
    }

    /// 地面场存在时插值，否则返回 `None`
    pub fn try_surface(&self, name: &str, lon: f64, lat: f64, t: f64) -> TrajectoryResult<Option<f64>> {
        if !self.field.has_surface(name) {
            return Ok(None);
        }
        self.surface(name, lon, lat, t).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::grid::VerticalCoordinateKind;

    /// 非等间距网格，数据取 `u = 3x + 2y + z/100 + t/3600`
    fn linear_field() -> GriddedField {
        let lon = Axis::new("lon", vec![0.0, 1.0, 3.0]).unwrap();
        let lat = Axis::new("lat", vec![10.0, 12.0]).unwrap();
        let level = Axis::new("level", vec![0.0, 200.0, 1000.0]).unwrap();
        let time = Axis::new("time", vec![0.0, 3600.0]).unwrap();
        let n = 3 * 2 * 3 * 2;
        let mut u = vec![0.0; n];
        let mut idx = 0;
        for &t in time.values() {
            for &z in level.values() {
                for &y in lat.values() {
                    for &x in lon.values() {
                        u[idx] = 3.0 * x + 2.0 * y + z / 100.0 + t / 3600.0;
                        idx += 1;
                    }
                }
            }
        }
        let v = u.iter().map(|a| -a).collect();
        GriddedField::new(lon, lat, level, time, VerticalCoordinateKind::Height, u, v, vec![0.0; n]).unwrap()
    }

    #[test]
    fn test_node_exactness() {
        let field = linear_field();
        let interp = Interpolator::new(&field);
        for (ti, &t) in field.time_axis().values().iter().enumerate() {
            for (k, &z) in field.level_axis().values().iter().enumerate() {
                for (j, &y) in field.lat_axis().values().iter().enumerate() {
                    for (i, &x) in field.lon_axis().values().iter().enumerate() {
                        let stored = field.u()[field.index(ti, k, j, i)];
                        assert_eq!(interp.interpolate_4d(field.u(), x, y, z, t).unwrap(), stored);
                        assert_eq!(interp.interpolate_3d(field.u(), ti, x, y, z).unwrap(), stored);
                    }
                }
            }
        }
    }

    #[test]
    fn test_linear_reproduction() {
        let field = linear_field();
        let interp = Interpolator::new(&field);
        let (x, y, z, t) = (2.2, 11.5, 640.0, 900.0);
        let expected = 3.0 * x + 2.0 * y + z / 100.0 + t / 3600.0;
        let value = interp.interpolate_4d(field.u(), x, y, z, t).unwrap();
        assert!((value - expected).abs() < 1e-10);

        let wind = interp.wind(x, y, z, t).unwrap();
        assert!((wind.x - expected).abs() < 1e-10);
        assert!((wind.y + expected).abs() < 1e-10);
        assert_eq!(wind.z, 0.0);
    }

    #[test]
    fn test_out_of_bounds() {
        let field = linear_field();
        let interp = Interpolator::new(&field);
        let err = interp.interpolate_4d(field.u(), 1.0, 12.5, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, TrajectoryError::Boundary { axis: "lat", .. }));
        assert!(interp.wind(1.0, 11.0, 1000.1, 0.0).is_err());
        assert!(interp.wind(1.0, 11.0, 0.0, -1.0).is_err());
        // 边界上仍可查询
        assert!(interp.wind(3.0, 12.0, 1000.0, 3600.0).is_ok());
    }

    #[test]
    fn test_single_node_axis() {
        let field = GriddedField::uniform(
            Axis::regular("lon", 0.0, 1.0, 2).unwrap(),
            Axis::regular("lat", 0.0, 1.0, 2).unwrap(),
            Axis::new("level", vec![850.0]).unwrap(),
            Axis::new("time", vec![0.0]).unwrap(),
            VerticalCoordinateKind::Pressure,
            DVec3::new(5.0, 0.0, 0.0),
        )
        .unwrap();
        let interp = Interpolator::new(&field);
        assert_eq!(interp.wind(0.5, 0.5, 850.0, 0.0).unwrap().x, 5.0);
        assert!(interp.wind(0.5, 0.5, 849.0, 0.0).is_err());
    }

    #[test]
    fn test_missing_scalar() {
        let field = linear_field();
        let interp = Interpolator::new(&field);
        assert!(matches!(
            interp.scalar("temperature", 1.0, 11.0, 0.0, 0.0),
            Err(TrajectoryError::MissingField { .. })
        ));
        assert_eq!(interp.try_surface("terrain_height", 1.0, 11.0, 0.0).unwrap(), None);
    }

    #[test]
    fn test_surface_bilinear() {
        let field = linear_field();
        let n = field.surface_node_count();
        let terrain: Vec<f64> = (0..n).map(|i| (i % 3) as f64 * 100.0).collect();
        let field = field.with_surface("terrain_height", terrain).unwrap();
        let interp = Interpolator::new(&field);
        // 经度节点 0, 1, 3 对应 0, 100, 200 m
        let h = interp.surface("terrain_height", 2.0, 11.0, 1800.0).unwrap();
        assert!((h - 150.0).abs() < 1e-12);
    }
}
