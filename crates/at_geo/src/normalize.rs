// crates/at_geo/src/normalize.rs
//! 经纬度规范化
//!
//! - 经度回绕到 `[-180, 180]`
//! - 纬度越过极点时折返，同时经度平移 180°
//!
//! 对任意有限输入都成立，不限于"略微越界"的情况。

/// 经度回绕到 `[-180, 180]`
#[inline]
#[must_use]
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid 的舍入可能给出 360.0
    wrapped.clamp(-180.0, 180.0)
}

/// 纬度折返到 `[-90, 90]`
///
/// 返回 `(lon, lat, crossed_pole)`；跨极时经度平移 180°（未回绕）。
#[must_use]
pub fn fold_latitude(lon: f64, lat: f64) -> (f64, f64, bool) {
    if (-90.0..=90.0).contains(&lat) {
        return (lon, lat, false);
    }
    // 先按 360° 周期约化到 [-180, 180)
    let mut l = (lat + 180.0).rem_euclid(360.0) - 180.0;
    let mut lon = lon;
    let mut crossed = false;
    if l > 90.0 {
        l = 180.0 - l;
        lon += 180.0;
        crossed = true;
    } else if l < -90.0 {
        l = -180.0 - l;
        lon += 180.0;
        crossed = true;
    }
    (lon, l.clamp(-90.0, 90.0), crossed)
}

/// 同时规范化经纬度，返回 `(lon, lat, crossed_pole)`
#[must_use]
pub fn normalize_lonlat(lon: f64, lat: f64) -> (f64, f64, bool) {
    let (lon, lat, crossed) = fold_latitude(lon, lat);
    (wrap_longitude(lon), lat, crossed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(540.0), -180.0);
        let w = wrap_longitude(1.0e9 + 0.25);
        assert!((-180.0..=180.0).contains(&w));
    }

    #[test]
    fn test_fold_latitude_north() {
        let (lon, lat, crossed) = fold_latitude(10.0, 95.0);
        assert!(crossed);
        assert!((lat - 85.0).abs() < 1e-12);
        assert!((lon - 190.0).abs() < 1e-12);
    }

    #[test]
    fn test_fold_latitude_south() {
        let (_, lat, crossed) = fold_latitude(0.0, -100.0);
        assert!(crossed);
        assert!((lat + 80.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_revolution_does_not_cross() {
        // 整圈 360° 回到原纬度
        let (lon, lat, crossed) = fold_latitude(0.0, 370.0);
        assert!(!crossed);
        assert!((lat - 10.0).abs() < 1e-9);
        assert_eq!(lon, 0.0);
    }

    #[test]
    fn test_normalize_any_magnitude() {
        for &(lon, lat) in &[(1e7, -1e7), (-725.3, 271.0), (0.0, 180.0), (359.9, -90.0)] {
            let (x, y, _) = normalize_lonlat(lon, lat);
            assert!((-180.0..=180.0).contains(&x), "lon={}", x);
            assert!((-90.0..=90.0).contains(&y), "lat={}", y);
        }
    }
}
