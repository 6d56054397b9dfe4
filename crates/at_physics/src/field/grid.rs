// crates/at_physics/src/field/grid.rs

//! 四维结构网格
//!
//! 坐标轴只要求严格递增，不要求等间距。

use std::collections::BTreeMap;

use at_foundation::validation::{ensure_len, ensure_strictly_increasing};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{TrajectoryError, TrajectoryResult};

/// 到达时间节点的容差 [s]
pub const TIME_NODE_TOLERANCE: f64 = 1e-6;

/// 垂直坐标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerticalCoordinateKind {
    /// 几何高度 [m]
    #[default]
    Height,
    /// 气压 [hPa]
    Pressure,
    /// sigma 坐标（无量纲）
    Sigma,
    /// 位温 [K]
    Isentropic,
}

impl VerticalCoordinateKind {
    /// 垂直坐标单位
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Height => "m",
            Self::Pressure => "hPa",
            Self::Sigma => "1",
            Self::Isentropic => "K",
        }
    }
}

// ============================================================
// 坐标轴
// ============================================================

/// 坐标轴（严格递增的有限值序列）
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    name: &'static str,
    values: Vec<f64>,
}

impl Axis {
    /// 创建坐标轴，验证非空、有限、严格递增
    pub fn new(name: &'static str, values: Vec<f64>) -> TrajectoryResult<Self> {
        ensure_strictly_increasing(name, &values)?;
        Ok(Self { name, values })
    }

    /// 等间距坐标轴
    pub fn regular(name: &'static str, start: f64, step: f64, count: usize) -> TrajectoryResult<Self> {
        let values = (0..count).map(|i| start + step * i as f64).collect();
        Self::new(name, values)
    }

    /// 轴名称
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 坐标值
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 节点数
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空（构造保证非空）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 首个节点
    #[inline]
    pub fn first(&self) -> f64 {
        self.values[0]
    }

    /// 末个节点
    #[inline]
    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// 是否在 `[first, last]` 内
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.first() && x <= self.last()
    }

    /// 将值夹到轴范围内
    #[inline]
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.first(), self.last())
    }

    /// 越界错误
    pub fn out_of_range(&self, x: f64) -> TrajectoryError {
        TrajectoryError::boundary(self.name, x, self.first(), self.last())
    }

    /// 包含 `x` 的区间左端索引（范围外时取最近的区间）
    ///
    /// 单节点轴返回 0。
    pub fn interval_index(&self, x: f64) -> usize {
        let n = self.values.len();
        if n < 2 {
            return 0;
        }
        let count = self.values.partition_point(|&v| v <= x);
        count.saturating_sub(1).min(n - 2)
    }

    /// `x` 处的局部网格间距；单节点轴返回 `None`
    pub fn spacing_at(&self, x: f64) -> Option<f64> {
        if self.values.len() < 2 {
            return None;
        }
        let i = self.interval_index(x);
        Some(self.values[i + 1] - self.values[i])
    }
}

// ============================================================
// 气象场
// ============================================================

/// 四维网格气象场
///
/// 风场 `u`, `v`（m/s）与 `w`（垂直坐标单位/s）必需，
/// 其余标量场与地面场按名称可选。
#[derive(Debug, Clone)]
pub struct GriddedField {
    lon: Axis,
    lat: Axis,
    level: Axis,
    time: Axis,
    vertical_kind: VerticalCoordinateKind,
    u: Vec<f64>,
    v: Vec<f64>,
    w: Vec<f64>,
    scalars: BTreeMap<String, Vec<f64>>,
    surfaces: BTreeMap<String, Vec<f64>>,
}

impl GriddedField {
    /// 创建气象场，验证各数组尺寸为 `nt * nz * ny * nx`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lon: Axis,
        lat: Axis,
        level: Axis,
        time: Axis,
        vertical_kind: VerticalCoordinateKind,
        u: Vec<f64>,
        v: Vec<f64>,
        w: Vec<f64>,
    ) -> TrajectoryResult<Self> {
        if lat.first() < -90.0 || lat.last() > 90.0 {
            return Err(TrajectoryError::InvalidGrid(format!(
                "纬度轴超出 [-90, 90]: [{}, {}]",
                lat.first(),
                lat.last()
            )));
        }
        let n = time.len() * level.len() * lat.len() * lon.len();
        ensure_len("u", &u, n)?;
        ensure_len("v", &v, n)?;
        ensure_len("w", &w, n)?;
        Ok(Self {
            lon,
            lat,
            level,
            time,
            vertical_kind,
            u,
            v,
            w,
            scalars: BTreeMap::new(),
            surfaces: BTreeMap::new(),
        })
    }

    /// 时空均匀风场
    pub fn uniform(
        lon: Axis,
        lat: Axis,
        level: Axis,
        time: Axis,
        vertical_kind: VerticalCoordinateKind,
        wind: DVec3,
    ) -> TrajectoryResult<Self> {
        let n = time.len() * level.len() * lat.len() * lon.len();
        Self::new(
            lon,
            lat,
            level,
            time,
            vertical_kind,
            vec![wind.x; n],
            vec![wind.y; n],
            vec![wind.z; n],
        )
    }

    /// 添加三维标量场
    pub fn with_scalar(mut self, name: impl Into<String>, data: Vec<f64>) -> TrajectoryResult<Self> {
        let name = name.into();
        ensure_len(&name, &data, self.node_count())?;
        self.scalars.insert(name, data);
        Ok(self)
    }

    /// 添加二维地面场
    pub fn with_surface(mut self, name: impl Into<String>, data: Vec<f64>) -> TrajectoryResult<Self> {
        let name = name.into();
        ensure_len(&name, &data, self.surface_node_count())?;
        self.surfaces.insert(name, data);
        Ok(self)
    }

    /// 形状 `(nt, nz, ny, nx)`
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.time.len(), self.level.len(), self.lat.len(), self.lon.len())
    }

    /// 三维场节点总数
    #[inline]
    pub fn node_count(&self) -> usize {
        self.time.len() * self.level.len() * self.lat.len() * self.lon.len()
    }

    /// 地面场节点总数
    #[inline]
    pub fn surface_node_count(&self) -> usize {
        self.time.len() * self.lat.len() * self.lon.len()
    }

    /// 展平索引 `[time, level, lat, lon]`
    #[inline]
    pub fn index(&self, t: usize, k: usize, j: usize, i: usize) -> usize {
        ((t * self.level.len() + k) * self.lat.len() + j) * self.lon.len() + i
    }

    /// 地面场展平索引 `[time, lat, lon]`
    #[inline]
    pub fn surface_index(&self, t: usize, j: usize, i: usize) -> usize {
        (t * self.lat.len() + j) * self.lon.len() + i
    }

    /// 经度轴
    #[inline]
    pub fn lon_axis(&self) -> &Axis {
        &self.lon
    }

    /// 纬度轴
    #[inline]
    pub fn lat_axis(&self) -> &Axis {
        &self.lat
    }

    /// 垂直轴
    #[inline]
    pub fn level_axis(&self) -> &Axis {
        &self.level
    }

    /// 时间轴 [s]
    #[inline]
    pub fn time_axis(&self) -> &Axis {
        &self.time
    }

    /// 垂直坐标类型
    #[inline]
    pub fn vertical_kind(&self) -> VerticalCoordinateKind {
        self.vertical_kind
    }

    /// 东向风
    #[inline]
    pub fn u(&self) -> &[f64] {
        &self.u
    }

    /// 北向风
    #[inline]
    pub fn v(&self) -> &[f64] {
        &self.v
    }

    /// 垂直速度
    #[inline]
    pub fn w(&self) -> &[f64] {
        &self.w
    }

    /// 按名称取标量场
    pub fn scalar(&self, name: &str) -> Option<&[f64]> {
        self.scalars.get(name).map(Vec::as_slice)
    }

    /// 按名称取地面场
    pub fn surface(&self, name: &str) -> Option<&[f64]> {
        self.surfaces.get(name).map(Vec::as_slice)
    }

    /// 是否存在标量场
    pub fn has_scalar(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    /// 是否存在地面场
    pub fn has_surface(&self, name: &str) -> bool {
        self.surfaces.contains_key(name)
    }

    /// 将经度换算到本场的经度约定（如 0–360 网格）
    ///
    /// 依次尝试原值、+360、-360，都不在经度轴内时原样返回。
    pub fn normalize_longitude(&self, lon: f64) -> f64 {
        if self.lon.contains(lon) {
            return lon;
        }
        for shift in [360.0, -360.0] {
            let shifted = lon + shift;
            if self.lon.contains(shifted) {
                return shifted;
            }
        }
        lon
    }

    /// 水平位置是否在数据范围内
    pub fn contains_horizontal(&self, lon: f64, lat: f64) -> bool {
        self.lat.contains(lat) && self.lon.contains(self.normalize_longitude(lon))
    }

    /// 沿积分方向的下一个时间节点
    ///
    /// 与 `t` 相差不超过 [`TIME_NODE_TOLERANCE`] 的节点视为已到达。
    pub fn next_time_node(&self, t: f64, direction: f64) -> Option<f64> {
        let values = self.time.values();
        if direction >= 0.0 {
            values.iter().copied().find(|&node| node > t + TIME_NODE_TOLERANCE)
        } else {
            values.iter().rev().copied().find(|&node| node < t - TIME_NODE_TOLERANCE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_field() -> GriddedField {
        GriddedField::uniform(
            Axis::regular("lon", 0.0, 1.0, 4).unwrap(),
            Axis::regular("lat", -1.0, 1.0, 3).unwrap(),
            Axis::regular("level", 0.0, 500.0, 2).unwrap(),
            Axis::new("time", vec![0.0, 3600.0]).unwrap(),
            VerticalCoordinateKind::Height,
            DVec3::new(1.0, 2.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn test_axis_rejects_non_monotonic() {
        assert!(Axis::new("lon", vec![0.0, 1.0, 1.0]).is_err());
        assert!(Axis::new("lon", vec![0.0, f64::NAN]).is_err());
        assert!(Axis::new("lon", vec![]).is_err());
        assert!(Axis::new("lon", vec![5.0]).is_ok());
    }

    #[test]
    fn test_interval_index() {
        let axis = Axis::new("z", vec![0.0, 100.0, 300.0, 700.0]).unwrap();
        assert_eq!(axis.interval_index(0.0), 0);
        assert_eq!(axis.interval_index(150.0), 1);
        assert_eq!(axis.interval_index(300.0), 2);
        assert_eq!(axis.interval_index(700.0), 2);
        assert_eq!(axis.spacing_at(150.0), Some(200.0));
        assert_eq!(Axis::new("z", vec![1.0]).unwrap().spacing_at(1.0), None);
    }

    #[test]
    fn test_size_mismatch() {
        let result = GriddedField::new(
            Axis::regular("lon", 0.0, 1.0, 2).unwrap(),
            Axis::regular("lat", 0.0, 1.0, 2).unwrap(),
            Axis::regular("level", 0.0, 1.0, 2).unwrap(),
            Axis::regular("time", 0.0, 1.0, 2).unwrap(),
            VerticalCoordinateKind::Height,
            vec![0.0; 16],
            vec![0.0; 16],
            vec![0.0; 15],
        );
        assert!(matches!(result, Err(TrajectoryError::Foundation(_))));
    }

    #[test]
    fn test_index_layout() {
        let field = small_field();
        assert_eq!(field.shape(), (2, 2, 3, 4));
        assert_eq!(field.index(0, 0, 0, 1), 1);
        assert_eq!(field.index(0, 0, 1, 0), 4);
        assert_eq!(field.index(0, 1, 0, 0), 12);
        assert_eq!(field.index(1, 0, 0, 0), 24);
        assert_eq!(field.surface_index(1, 2, 3), 23);
    }

    #[test]
    fn test_normalize_longitude() {
        let field = GriddedField::uniform(
            Axis::regular("lon", 0.0, 10.0, 36).unwrap(),
            Axis::regular("lat", -10.0, 10.0, 3).unwrap(),
            Axis::new("level", vec![0.0]).unwrap(),
            Axis::new("time", vec![0.0]).unwrap(),
            VerticalCoordinateKind::Height,
            DVec3::ZERO,
        )
        .unwrap();
        assert_eq!(field.normalize_longitude(-10.0), 350.0);
        assert_eq!(field.normalize_longitude(20.0), 20.0);
        assert!(field.contains_horizontal(-10.0, 5.0));
        assert!(!field.contains_horizontal(-10.0, 15.0));
    }

    #[test]
    fn test_next_time_node() {
        let field = small_field();
        assert_eq!(field.next_time_node(0.0, 1.0), Some(3600.0));
        assert_eq!(field.next_time_node(3600.0 - 1e-9, 1.0), None);
        assert_eq!(field.next_time_node(3600.0, -1.0), Some(0.0));
        assert_eq!(field.next_time_node(0.0, -1.0), None);
    }

    #[test]
    fn test_scalar_size_checked() {
        let field = small_field();
        let n = field.node_count();
        let field = field.with_scalar("temperature", vec![280.0; n]).unwrap();
        assert!(field.has_scalar("temperature"));
        assert!(field.clone().with_scalar("density", vec![1.0; n - 1]).is_err());
        assert!(field.with_surface("terrain_height", vec![0.0; 24]).is_ok());
    }
}
