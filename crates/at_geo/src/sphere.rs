// crates/at_geo/src/sphere.rs
//! 球体地球模型
//!
//! 轨迹平流使用等效球体（半径 6 371 km），把速度 (m/s) 与时间步长换算为
//! 经纬度增量：
//!
//! $$ \Delta\varphi = \frac{v\,\Delta t}{R}, \qquad
//!    \Delta\lambda = \frac{u\,\Delta t}{R\cos\varphi} $$
//!
//! 极点附近 `cos φ` 截断为 [`MIN_COS_LAT`]，避免除零。

use serde::{Deserialize, Serialize};

/// 地球平均半径 (m)
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// `cos(lat)` 的下限
pub const MIN_COS_LAT: f64 = 1e-8;

/// 球体
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// 半径 (m)
    pub radius: f64,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::EARTH
    }
}

impl Sphere {
    /// 平均地球
    pub const EARTH: Self = Self {
        radius: EARTH_RADIUS,
    };

    /// 从半径创建
    #[must_use]
    pub const fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// 纬度处的 `cos φ`（带下限）
    #[inline]
    #[must_use]
    pub fn cos_lat(lat_deg: f64) -> f64 {
        lat_deg.to_radians().cos().abs().max(MIN_COS_LAT)
    }

    /// 每度纬度对应的弧长 (m)
    #[inline]
    #[must_use]
    pub fn meters_per_degree_lat(&self) -> f64 {
        self.radius.to_radians()
    }

    /// 纬度 `lat_deg` 处每度经度对应的弧长 (m)
    #[inline]
    #[must_use]
    pub fn meters_per_degree_lon(&self, lat_deg: f64) -> f64 {
        self.radius.to_radians() * Self::cos_lat(lat_deg)
    }

    /// 速度与时间步长对应的经纬度增量 `(Δlon, Δlat)`，单位度
    ///
    /// `dt` 可为负（后向轨迹），位移随之反号。
    #[inline]
    #[must_use]
    pub fn displacement_deg(&self, lat_deg: f64, u: f64, v: f64, dt: f64) -> (f64, f64) {
        let dlat = (v * dt / self.radius).to_degrees();
        let dlon = (u * dt / (self.radius * Self::cos_lat(lat_deg))).to_degrees();
        (dlon, dlat)
    }

    /// 从 `(lon, lat)` 出发平流一步，返回新位置（未做规范化）
    #[inline]
    #[must_use]
    pub fn advect(&self, lon: f64, lat: f64, u: f64, v: f64, dt: f64) -> (f64, f64) {
        let (dlon, dlat) = self.displacement_deg(lat, u, v, dt);
        (lon + dlon, lat + dlat)
    }
}

/// 在平均地球上平流一步
///
/// 等价于 `Sphere::EARTH.advect(..)`。
#[inline]
#[must_use]
pub fn advect_lonlat(lon: f64, lat: f64, u: f64, v: f64, dt: f64) -> (f64, f64) {
    Sphere::EARTH.advect(lon, lat, u, v, dt)
}

/// 批量平流（结构化数组布局）
///
/// 逐元素调用 [`advect_lonlat`]，结果与标量路径逐位一致。
///
/// # Panics
///
/// 各切片长度不一致时 panic。
pub fn advect_lonlat_batch(lon: &mut [f64], lat: &mut [f64], u: &[f64], v: &[f64], dt: &[f64]) {
    let n = lon.len();
    assert!(
        lat.len() == n && u.len() == n && v.len() == n && dt.len() == n,
        "批量平流数组长度不一致"
    );
    for i in 0..n {
        let (x, y) = advect_lonlat(lon[i], lat[i], u[i], v[i], dt[i]);
        lon[i] = x;
        lat[i] = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_displacement() {
        let (lon, lat) = advect_lonlat(0.0, 0.0, 10.0, 0.0, 3600.0);
        let expected = (10.0_f64 * 3600.0 / EARTH_RADIUS).to_degrees();
        assert!((lon - expected).abs() < 1e-12);
        assert!((lon - 0.324).abs() < 1e-3);
        assert_eq!(lat, 0.0);
    }

    #[test]
    fn test_meridional_displacement() {
        let (dlon, dlat) = Sphere::EARTH.displacement_deg(45.0, 0.0, 5.0, 600.0);
        assert_eq!(dlon, 0.0);
        assert!((dlat - (5.0_f64 * 600.0 / EARTH_RADIUS).to_degrees()).abs() < 1e-14);
    }

    #[test]
    fn test_higher_latitude_larger_dlon() {
        let (d10, _) = Sphere::EARTH.displacement_deg(10.0, 10.0, 0.0, 3600.0);
        let (d60, _) = Sphere::EARTH.displacement_deg(60.0, 10.0, 0.0, 3600.0);
        assert!(d60.abs() > d10.abs());
        // cos 60° = 0.5
        let (d0, _) = Sphere::EARTH.displacement_deg(0.0, 10.0, 0.0, 3600.0);
        assert!((d60 - 2.0 * d0).abs() < 1e-9);
    }

    #[test]
    fn test_pole_is_finite() {
        let (dlon, _) = Sphere::EARTH.displacement_deg(90.0, 10.0, 0.0, 3600.0);
        assert!(dlon.is_finite());
    }

    #[test]
    fn test_backward_is_antisymmetric() {
        let (f_lon, f_lat) = Sphere::EARTH.displacement_deg(30.0, 7.0, -3.0, 900.0);
        let (b_lon, b_lat) = Sphere::EARTH.displacement_deg(30.0, 7.0, -3.0, -900.0);
        assert_eq!(f_lon, -b_lon);
        assert_eq!(f_lat, -b_lat);
    }

    #[test]
    fn test_batch_matches_scalar() {
        let mut lon = vec![0.0, 10.0, -50.0];
        let mut lat = vec![0.0, 45.0, -70.0];
        let u = vec![10.0, -4.0, 25.0];
        let v = vec![1.0, 2.0, -3.0];
        let dt = vec![600.0, -600.0, 1200.0];

        let expected: Vec<(f64, f64)> = (0..3)
            .map(|i| advect_lonlat(lon[i], lat[i], u[i], v[i], dt[i]))
            .collect();
        advect_lonlat_batch(&mut lon, &mut lat, &u, &v, &dt);
        for i in 0..3 {
            assert_eq!((lon[i], lat[i]), expected[i]);
        }
    }

    #[test]
    fn test_meters_per_degree() {
        let m = Sphere::EARTH.meters_per_degree_lat();
        assert!((m - 111_194.9).abs() < 1.0);
        assert!((Sphere::EARTH.meters_per_degree_lon(60.0) - 0.5 * m).abs() < 1e-6);
    }
}
